//! # camera-capture-windows
//!
//! Windows MediaCapture backend for camera-capture-kit.
//!
//! Provides:
//! - `MediaCaptureBackend` — `CaptureBackend` over WinRT `MediaCapture`
//! - `VideoDeviceEnumerator` — Camera enumeration via `DeviceInformation`
//!
//! ## Platform Requirements
//! - Windows 10 1809+ (build 17763) for the MediaFrameReader subtype API
//!
//! ## Usage
//! ```ignore
//! use camera_capture_core::{CaptureConfiguration, CaptureCoordinator};
//! use camera_capture_windows::{MediaCaptureBackend, VideoDeviceEnumerator};
//!
//! let backend = MediaCaptureBackend::new();
//! let provider = Box::new(VideoDeviceEnumerator::new());
//! let mut session =
//!     CaptureCoordinator::new(backend, provider, CaptureConfiguration::default()).unwrap();
//! ```

#[cfg(target_os = "windows")]
pub mod device_enumerator;
#[cfg(target_os = "windows")]
pub mod media_capture_backend;

#[cfg(target_os = "windows")]
pub use device_enumerator::VideoDeviceEnumerator;
#[cfg(target_os = "windows")]
pub use media_capture_backend::MediaCaptureBackend;
