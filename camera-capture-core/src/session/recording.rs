use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::models::error::CameraError;
use crate::models::recording_info::RecordingInfo;
use crate::models::state::RecordingState;
use crate::sync::CancellationToken;
use crate::traits::capture_backend::CaptureBackend;

/// Container extension of the relay file. Native recorders write a
/// platform container (MP4/MOV); the file is purely a relay to the
/// caller-supplied stream.
const CONTAINER: &str = "mp4";

/// Temporary recording target, deleted when dropped.
///
/// Native recorders write to a file path, not an arbitrary stream, so the
/// recording is relayed through this file. Deletion-on-drop guarantees the
/// cleanup runs on every exit path, including copy failures.
struct TempRecordingFile {
    path: PathBuf,
}

impl TempRecordingFile {
    fn allocate() -> Self {
        let path = std::env::temp_dir().join(format!("{}.{}", uuid::Uuid::new_v4(), CONTAINER));
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempRecordingFile {
    fn drop(&mut self) {
        if self.path.exists() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                log::warn!("failed to delete temp recording file {:?}: {}", self.path, e);
            }
        }
    }
}

/// Record-to-stream lifecycle manager.
///
/// At most one recording is active per coordinator; a second `start` while
/// one is in flight is rejected without touching the active recording.
pub struct VideoRecordingSession {
    state: RecordingState,
    temp: Option<TempRecordingFile>,
    destination: Option<Box<dyn Write + Send>>,
}

impl VideoRecordingSession {
    pub fn new() -> Self {
        Self {
            state: RecordingState::Idle,
            temp: None,
            destination: None,
        }
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Allocate a temp target and start the native recorder.
    ///
    /// The destination stream is held, unwritten, for the recording's
    /// lifetime; the copy happens at `stop`.
    pub fn start(
        &mut self,
        backend: &mut dyn CaptureBackend,
        destination: Box<dyn Write + Send>,
    ) -> Result<(), CameraError> {
        if !self.state.is_idle() {
            return Err(CameraError::AlreadyRecording);
        }

        self.state = RecordingState::Preparing;
        let temp = TempRecordingFile::allocate();

        if let Err(e) = backend.start_recording(temp.path()) {
            // temp dropped here, nothing to clean on disk yet
            self.state = RecordingState::Idle;
            return Err(e);
        }

        self.temp = Some(temp);
        self.destination = Some(destination);
        self.state = RecordingState::Recording;
        Ok(())
    }

    /// Stop the native recorder, await its finalize signal, and relay the
    /// container file into the destination stream.
    ///
    /// Returns `Ok(None)` without any native calls when no recording is
    /// active. Cleanup (temp file deletion, destination release, return to
    /// idle) runs on every exit path.
    pub fn stop(
        &mut self,
        backend: &mut dyn CaptureBackend,
        token: &CancellationToken,
    ) -> Result<Option<RecordingInfo>, CameraError> {
        if self.state != RecordingState::Recording {
            log::debug!("stop requested with no active recording");
            return Ok(None);
        }

        self.state = RecordingState::Finalizing;
        let temp = self.temp.take();
        let destination = self.destination.take();

        let result = Self::finalize(backend, token, temp.as_ref(), destination);

        // temp drops (and deletes the file) when this frame unwinds,
        // success or not
        self.state = RecordingState::Idle;
        result.map(Some)
    }

    fn finalize(
        backend: &mut dyn CaptureBackend,
        token: &CancellationToken,
        temp: Option<&TempRecordingFile>,
        destination: Option<Box<dyn Write + Send>>,
    ) -> Result<RecordingInfo, CameraError> {
        backend.stop_recording(token)?;

        let temp = temp.ok_or_else(|| {
            CameraError::CaptureFailed("recording finished without a temp file".into())
        })?;
        let mut destination = destination.ok_or_else(|| {
            CameraError::CaptureFailed("recording finished without a destination stream".into())
        })?;

        let mut input = File::open(temp.path()).map_err(|e| {
            CameraError::CaptureFailed(format!("unable to open recorded file: {}", e))
        })?;
        let byte_count = io::copy(&mut input, &mut destination)
            .map_err(|e| CameraError::CaptureFailed(format!("copy to destination failed: {}", e)))?;
        destination
            .flush()
            .map_err(|e| CameraError::CaptureFailed(format!("destination flush failed: {}", e)))?;

        Ok(RecordingInfo::new(byte_count, CONTAINER))
    }

    /// Drop any held resources without native calls. Used on teardown paths
    /// where the backend is being released wholesale. Idempotent.
    pub fn cleanup(&mut self) {
        self.temp = None;
        self.destination = None;
        self.state = RecordingState::Idle;
    }
}

impl Default for VideoRecordingSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_file_deleted_on_drop() {
        let temp = TempRecordingFile::allocate();
        let path = temp.path().to_path_buf();
        std::fs::write(&path, b"container bytes").unwrap();
        assert!(path.exists());

        drop(temp);
        assert!(!path.exists());
    }

    #[test]
    fn drop_tolerates_missing_file() {
        let temp = TempRecordingFile::allocate();
        let path = temp.path().to_path_buf();
        drop(temp);
        assert!(!path.exists());
    }
}
