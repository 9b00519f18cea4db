/// Camera session state machine.
///
/// State transitions:
/// ```text
/// uninitialized → connecting → preview-running ⇄ (capturing-photo | recording)
///       any state → disconnected
/// ```
///
/// Transitions are sequential and non-reentrant: one in-flight transition at
/// a time per coordinator instance, serialized by the caller awaiting each
/// operation to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Connecting,
    PreviewRunning,
    CapturingPhoto,
    Recording,
    Disconnected,
}

impl SessionState {
    /// Whether the session has a bound, running preview. Photo capture and
    /// recording are nested operations that keep the preview alive.
    pub fn is_initialized(&self) -> bool {
        matches!(
            self,
            Self::PreviewRunning | Self::CapturingPhoto | Self::Recording
        )
    }

    pub fn is_preview_running(&self) -> bool {
        matches!(self, Self::PreviewRunning)
    }

    pub fn is_disconnected(&self) -> bool {
        matches!(self, Self::Disconnected)
    }
}

/// Video recording sub-lifecycle, owned by `VideoRecordingSession`.
///
/// ```text
/// idle → preparing → recording → finalizing → idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    Preparing,
    Recording,
    Finalizing,
}

impl RecordingState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_active(&self) -> bool {
        !self.is_idle()
    }
}
