use std::path::Path;
use std::sync::Arc;

use crate::models::camera_models::{CameraDescriptor, CameraFormat, FlashSetting};
use crate::models::error::CameraError;
use crate::models::frame::FrameBuffer;
use crate::sync::CancellationToken;

/// Callback invoked when a raw frame buffer is available.
///
/// Fires on the backend's dedicated delivery thread; the buffer is only
/// valid for the duration of the call. Keep processing minimal or hand off.
pub type FrameSink = Arc<dyn for<'a> Fn(&FrameBuffer<'a>) + Send + Sync + 'static>;

/// A camera pipeline stage bound to the native session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UseCase {
    Preview,
    PhotoCapture,
    VideoCapture,
    FrameAnalysis,
}

/// Interface for platform-specific camera session backends.
///
/// Implemented by:
/// - `MediaCaptureBackend` (Windows, `camera-capture-windows`)
/// - Future: CameraX (Android), AVFoundation (iOS/macOS) backends
///
/// The native capture session, its inputs/outputs, and the preview surface
/// are exclusively owned by the backend; the coordinator drives it through
/// this trait and nothing else mutates them.
pub trait CaptureBackend: Send {
    /// Bind every requested use case against `camera` at `format` in one
    /// configuration transaction.
    ///
    /// Implementations must treat the whole call as atomic: either all use
    /// cases end up bound or the previous configuration is left fully
    /// unbound, never a partial mix. `frames` is provided exactly when
    /// `use_cases` contains `FrameAnalysis`.
    fn bind(
        &mut self,
        camera: &CameraDescriptor,
        format: &CameraFormat,
        use_cases: &[UseCase],
        frames: Option<FrameSink>,
    ) -> Result<(), CameraError>;

    /// Unbind all use cases and stop the preview. Safe to call when nothing
    /// is bound.
    fn unbind_all(&mut self);

    /// Apply a flash setting. Called only for devices reporting flash
    /// support.
    fn set_flash(&mut self, setting: FlashSetting) -> Result<(), CameraError>;

    /// Apply a zoom ratio already clamped to the device range.
    fn set_zoom(&mut self, ratio: f32) -> Result<(), CameraError>;

    /// Capture one still frame, returning encoded image bytes.
    ///
    /// Blocks on the native capture completion; cancellation aborts the wait
    /// (best effort on the native side).
    fn capture_photo(&mut self, token: &CancellationToken) -> Result<Vec<u8>, CameraError>;

    /// Start recording video into the container file at `path`. The
    /// `VideoCapture` use case must already be bound.
    fn start_recording(&mut self, path: &Path) -> Result<(), CameraError>;

    /// Signal native stop and wait for exactly one finalize event, after
    /// which the container file is fully written and safe to read.
    fn stop_recording(&mut self, token: &CancellationToken) -> Result<(), CameraError>;

    /// Release every acquired native resource. Idempotent; never fails.
    fn release(&mut self);
}
