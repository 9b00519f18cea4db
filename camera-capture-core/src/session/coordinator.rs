use std::io::Write;
use std::sync::Arc;

use crate::models::camera_models::{CameraDescriptor, CameraFormat, FlashMode, ResolutionRequest};
use crate::models::config::CaptureConfiguration;
use crate::models::error::CameraError;
use crate::models::recording_info::RecordingInfo;
use crate::models::state::SessionState;
use crate::pipeline::delivery::FrameDeliveryPipeline;
use crate::selector::DeviceSelector;
use crate::session::recording::VideoRecordingSession;
use crate::sync::CancellationToken;
use crate::traits::camera_delegate::CameraDelegate;
use crate::traits::camera_provider::CameraProvider;
use crate::traits::capture_backend::{CaptureBackend, FrameSink, UseCase};

/// Orchestrates connect/start/stop/take-picture/recording against a platform
/// camera backend.
///
/// Generic over the backend via `CaptureBackend` (strategy pattern); the
/// same coordination logic drives CameraX, AVFoundation, and MediaCapture
/// implementations.
///
/// All mutating operations are expected to run sequentially relative to one
/// another: the design assumes at most one in-flight high-level operation at
/// a time, enforced by the caller awaiting each operation to completion.
/// Frame delivery runs concurrently on the backend's thread and never blocks
/// command processing.
pub struct CaptureCoordinator<B: CaptureBackend> {
    backend: B,
    provider: Box<dyn CameraProvider>,
    delegate: Option<Arc<dyn CameraDelegate>>,
    pipeline: Option<Arc<FrameDeliveryPipeline>>,

    state: SessionState,
    selected_camera: Option<CameraDescriptor>,
    active_format: Option<CameraFormat>,
    target_resolution: ResolutionRequest,
    flash_mode: FlashMode,
    zoom: f32,

    bound_use_cases: Vec<UseCase>,
    pending_rebind: bool,
    recording: VideoRecordingSession,
}

impl<B: CaptureBackend> CaptureCoordinator<B> {
    pub fn new(
        backend: B,
        provider: Box<dyn CameraProvider>,
        config: CaptureConfiguration,
    ) -> Result<Self, CameraError> {
        config
            .validate()
            .map_err(CameraError::UnableToInitialize)?;

        let pipeline = config
            .enable_frame_analysis
            .then(|| Arc::new(FrameDeliveryPipeline::new(config.frame_divisor)));

        Ok(Self {
            backend,
            provider,
            delegate: None,
            pipeline,
            state: SessionState::Uninitialized,
            selected_camera: None,
            active_format: None,
            target_resolution: config.resolution,
            flash_mode: config.flash_mode,
            zoom: config.zoom,
            bound_use_cases: Vec::new(),
            pending_rebind: false,
            recording: VideoRecordingSession::new(),
        })
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn CameraDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn selected_camera(&self) -> Option<&CameraDescriptor> {
        self.selected_camera.as_ref()
    }

    pub fn active_format(&self) -> Option<CameraFormat> {
        self.active_format
    }

    /// The frame pipeline, present when frame analysis was enabled in the
    /// configuration. Subscribe barcode scanners or UI overlays here.
    pub fn pipeline(&self) -> Option<&Arc<FrameDeliveryPipeline>> {
        self.pipeline.as_ref()
    }

    /// Connect the camera and start the preview. Idempotent: a second call
    /// on a running session is a no-op.
    ///
    /// Refreshes the device list when it is empty, selects a camera and
    /// format, and binds preview + photo (+ analysis when enabled) in one
    /// transaction. Fails with `NoCameraAvailable` when enumeration yields
    /// nothing.
    pub fn connect_camera(&mut self, token: &CancellationToken) -> Result<(), CameraError> {
        token.check()?;

        if self.state.is_initialized() {
            return Ok(());
        }

        self.set_state(SessionState::Connecting);

        if let Err(e) = self.bind_initial(token) {
            // error unwind: leave no native resources half-acquired
            self.backend.unbind_all();
            self.set_state(SessionState::Uninitialized);
            return Err(e);
        }

        self.set_state(SessionState::PreviewRunning);
        if let Some(delegate) = &self.delegate {
            delegate.on_loaded();
        }

        // Apply initial control state now that the session is bound; both
        // are guarded no-ops when unsupported.
        self.apply_flash();
        self.apply_zoom(self.zoom);

        Ok(())
    }

    /// Change the target still-capture resolution.
    ///
    /// No-op when the request matches the current target (epsilon-compared).
    /// When the preview is running, performs an internal rebind; from the
    /// caller's perspective the session never leaves `PreviewRunning`.
    /// During an in-flight recording or capture the rebind is deferred so the
    /// active operation is never torn down; it runs once the session returns
    /// to `PreviewRunning`.
    pub fn update_resolution(
        &mut self,
        request: ResolutionRequest,
        token: &CancellationToken,
    ) -> Result<(), CameraError> {
        token.check()?;

        if request.approx_eq(&self.target_resolution) {
            return Ok(());
        }

        self.target_resolution = request;

        if let Some(camera) = &self.selected_camera {
            self.active_format = DeviceSelector::select_format(camera, &request);
        }

        if self.state.is_preview_running() {
            let use_cases = self.bound_use_cases.clone();
            self.rebind(use_cases)?;
        } else if self.state.is_initialized() {
            self.pending_rebind = true;
        }

        Ok(())
    }

    /// Set the zoom ratio, silently clamped to the device-supported range.
    /// No-op outside the initialized state.
    pub fn update_zoom(&mut self, ratio: f32) {
        if !self.state.is_initialized() {
            return;
        }
        self.apply_zoom(ratio);
    }

    /// Set the flash mode. No-op when not initialized or when the selected
    /// device has no flash.
    pub fn update_flash_mode(&mut self, mode: FlashMode) {
        self.flash_mode = mode;
        if !self.state.is_initialized() {
            return;
        }
        self.apply_flash();
    }

    /// Capture one still frame to in-memory bytes.
    ///
    /// Success is delivered via `on_media_captured`, failure via
    /// `on_media_captured_failed`; either way the preview continues and the
    /// session returns to `PreviewRunning`. Issued before connect, this is a
    /// safe no-op.
    pub fn take_picture(&mut self, token: &CancellationToken) -> Result<(), CameraError> {
        token.check()?;

        if !self.state.is_preview_running() {
            log::warn!("take_picture ignored: preview not running");
            return Ok(());
        }

        self.set_state(SessionState::CapturingPhoto);
        let result = self.backend.capture_photo(token);
        self.set_state(SessionState::PreviewRunning);

        match result {
            Ok(image) => {
                if let Some(delegate) = &self.delegate {
                    delegate.on_media_captured(image);
                }
                Ok(())
            }
            Err(CameraError::Cancelled) => Err(CameraError::Cancelled),
            Err(e) => {
                log::error!("photo capture failed: {}", e);
                if let Some(delegate) = &self.delegate {
                    delegate.on_media_captured_failed(&e.to_string());
                }
                Ok(())
            }
        }
    }

    /// Start recording video into `destination`.
    ///
    /// The destination stream is borrowed for the recording's lifetime and
    /// written at stop. Rejects a second concurrent recording with
    /// `AlreadyRecording`. Lazily binds the video use case (triggering a
    /// rebind) when it was not part of the running configuration.
    pub fn start_video_recording(
        &mut self,
        destination: Box<dyn Write + Send>,
        token: &CancellationToken,
    ) -> Result<(), CameraError> {
        token.check()?;

        if self.recording.is_active() {
            return Err(CameraError::AlreadyRecording);
        }
        if !self.state.is_initialized() {
            return Err(CameraError::UnableToInitialize(
                "camera is not connected".into(),
            ));
        }

        if !self.bound_use_cases.contains(&UseCase::VideoCapture) {
            let mut use_cases = self.bound_use_cases.clone();
            use_cases.push(UseCase::VideoCapture);
            self.rebind(use_cases)?;
        }

        self.recording.start(&mut self.backend, destination)?;
        self.set_state(SessionState::Recording);
        Ok(())
    }

    /// Stop the active recording, await its finalize signal, and relay the
    /// recorded container into the destination stream.
    ///
    /// With no active recording this returns `Ok(None)` and performs no
    /// native calls. Finalize/copy failures are reported through the failure
    /// callback and returned; the session returns to `PreviewRunning` either
    /// way.
    pub fn stop_video_recording(
        &mut self,
        token: &CancellationToken,
    ) -> Result<Option<RecordingInfo>, CameraError> {
        let result = self.recording.stop(&mut self.backend, token);

        if self.state == SessionState::Recording {
            self.set_state(SessionState::PreviewRunning);
        }

        // Apply a resolution change that arrived while the recording was in
        // flight, now that rebinding no longer tears down an active take.
        if self.pending_rebind && self.state.is_preview_running() {
            self.pending_rebind = false;
            let use_cases = self.bound_use_cases.clone();
            if let Err(e) = self.rebind(use_cases) {
                log::error!("deferred resolution rebind failed: {}", e);
            }
        }

        if let Err(e) = &result {
            log::error!("video recording finalize failed: {}", e);
            // Cancellation is the caller's own doing, not a device failure.
            if !matches!(e, CameraError::Cancelled) {
                if let Some(delegate) = &self.delegate {
                    delegate.on_media_captured_failed(&e.to_string());
                }
            }
        }

        result
    }

    /// Tear down the session and release all native resources.
    ///
    /// Safe to call from any state and idempotent; every release in the
    /// teardown list is individually guarded.
    pub fn disconnect(&mut self) {
        // Ordered teardown, front to back: recording relay resources, then
        // session bindings, then the backend itself.
        self.recording.cleanup();
        self.backend.unbind_all();
        self.backend.release();

        self.bound_use_cases.clear();
        self.pending_rebind = false;
        self.selected_camera = None;
        self.active_format = None;

        if self.state != SessionState::Disconnected {
            self.set_state(SessionState::Disconnected);
        }
    }

    // --- Internal helpers ---

    fn set_state(&mut self, state: SessionState) {
        self.state = state;
        if let Some(delegate) = &self.delegate {
            delegate.on_state_changed(state);
        }
    }

    fn bind_initial(&mut self, token: &CancellationToken) -> Result<(), CameraError> {
        if self.provider.available_cameras().is_empty() {
            self.provider.refresh_available_cameras(token)?;
        }

        let camera = DeviceSelector::pick_camera(self.provider.available_cameras())?.clone();
        let format = DeviceSelector::select_format(&camera, &self.target_resolution)
            .ok_or_else(|| {
                CameraError::UnableToInitialize(format!(
                    "camera {} reports no supported formats",
                    camera.id
                ))
            })?;

        log::debug!(
            "selected camera {} at {}x{}",
            camera.id,
            format.width,
            format.height
        );

        self.selected_camera = Some(camera);
        self.active_format = Some(format);

        let mut use_cases = vec![UseCase::Preview, UseCase::PhotoCapture];
        if self.pipeline.is_some() {
            use_cases.push(UseCase::FrameAnalysis);
        }
        self.rebind(use_cases)
    }

    /// The shared rebind protocol: unbind everything, then bind all required
    /// use cases in one atomic configuration transaction.
    ///
    /// Unbinding first also stops frame delivery before the configuration
    /// changes, so no frame is delivered against a stale configuration.
    fn rebind(&mut self, use_cases: Vec<UseCase>) -> Result<(), CameraError> {
        let camera = self
            .selected_camera
            .as_ref()
            .ok_or(CameraError::NoCameraAvailable)?
            .clone();
        let format = self.active_format.ok_or_else(|| {
            CameraError::UnableToInitialize("no capture format selected".into())
        })?;

        let frames = if use_cases.contains(&UseCase::FrameAnalysis) {
            self.frame_sink()
        } else {
            None
        };

        self.backend.unbind_all();
        self.backend.bind(&camera, &format, &use_cases, frames)?;
        self.bound_use_cases = use_cases;
        Ok(())
    }

    fn frame_sink(&self) -> Option<FrameSink> {
        self.pipeline.as_ref().map(|pipeline| {
            let pipeline = Arc::clone(pipeline);
            Arc::new(move |frame: &crate::models::frame::FrameBuffer<'_>| {
                pipeline.handle_frame(frame)
            }) as FrameSink
        })
    }

    fn apply_zoom(&mut self, ratio: f32) {
        let Some(camera) = &self.selected_camera else {
            return;
        };
        let (min, max) = camera.zoom_range();
        let clamped = ratio.clamp(min, max);
        if let Err(e) = self.backend.set_zoom(clamped) {
            log::warn!("zoom update failed: {}", e);
            return;
        }
        self.zoom = clamped;
    }

    fn apply_flash(&mut self) {
        let Some(camera) = &self.selected_camera else {
            return;
        };
        if !camera.supports_flash() {
            log::debug!("flash mode ignored: device has no flash");
            return;
        }
        if let Err(e) = self.backend.set_flash(self.flash_mode.to_setting()) {
            log::warn!("flash update failed: {}", e);
        }
    }
}

impl<B: CaptureBackend> Drop for CaptureCoordinator<B> {
    fn drop(&mut self) {
        self.disconnect();
    }
}
