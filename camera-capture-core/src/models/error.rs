use thiserror::Error;

/// Errors that can occur during camera capture operations.
///
/// Setup-time failures (connect, device selection, bind) are returned to the
/// caller. Per-capture failures are additionally surfaced through the
/// delegate's failure callback so the running preview is unaffected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CameraError {
    #[error("no camera available on device")]
    NoCameraAvailable,

    #[error("unable to initialize: {0}")]
    UnableToInitialize(String),

    #[error("operation not supported: {0}")]
    OperationNotSupported(String),

    #[error("capture failed: {0}")]
    CaptureFailed(String),

    #[error("a video recording is already in progress")]
    AlreadyRecording,

    #[error("operation cancelled")]
    Cancelled,
}
