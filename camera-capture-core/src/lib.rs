//! # camera-capture-core
//!
//! Platform-agnostic camera capture core library.
//!
//! Provides the session lifecycle state machine, device/format selection,
//! the throttled frame-delivery pipeline, record-to-stream handling, and a
//! barcode decode/encode wrapper. Platform-specific backends (Windows
//! MediaCapture, Android CameraX, iOS AVFoundation) implement the
//! `CaptureBackend` and `CameraProvider` traits and plug into the generic
//! `CaptureCoordinator`.
//!
//! ## Architecture
//!
//! ```text
//! camera-capture-core (this crate)
//! ├── traits/       ← CaptureBackend, CameraProvider, CameraDelegate
//! ├── models/       ← CameraError, SessionState, CameraDescriptor, FrameBuffer, etc.
//! ├── selector      ← device pick + filter→fallback→max-area format selection
//! ├── pipeline/     ← FrameThrottle, pixel normalization, FrameDeliveryPipeline
//! ├── session/      ← CaptureCoordinator, VideoRecordingSession
//! ├── barcode/      ← decoder/encoder traits, rqrr-backed QR decoder, scanner
//! └── sync          ← CompletionSignal, CancellationToken
//! ```

pub mod barcode;
pub mod models;
pub mod pipeline;
pub mod selector;
pub mod session;
pub mod sync;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use barcode::scanner::BarcodeScanner;
pub use barcode::{BarcodeDecoder, BarcodeEncoder, BarcodeFormat, BarcodeResult, DecodeOptions};
pub use models::camera_models::{
    CameraCapabilities, CameraDescriptor, CameraFormat, CameraPosition, DeviceKind, FlashMode,
    FlashSetting, PixelFormat, ResolutionRequest,
};
pub use models::config::CaptureConfiguration;
pub use models::error::CameraError;
pub use models::frame::FrameBuffer;
pub use models::recording_info::RecordingInfo;
pub use models::state::{RecordingState, SessionState};
pub use pipeline::delivery::FrameDeliveryPipeline;
pub use pipeline::throttle::FrameThrottle;
pub use selector::DeviceSelector;
pub use session::coordinator::CaptureCoordinator;
pub use session::recording::VideoRecordingSession;
pub use sync::{CancellationToken, CompletionSignal};
pub use traits::camera_delegate::CameraDelegate;
pub use traits::camera_provider::CameraProvider;
pub use traits::capture_backend::{CaptureBackend, FrameSink, UseCase};
