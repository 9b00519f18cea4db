//! WinRT `MediaCapture` session backend.
//!
//! Drives photo capture, video recording, camera controls, and frame
//! analysis over one `MediaCapture` instance. Binding is transactional:
//! any failure mid-bind tears the partially configured session back down
//! before the error is returned.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use windows::Foundation::TypedEventHandler;
use windows::Graphics::Imaging::{BitmapBufferAccessMode, BitmapPixelFormat, SoftwareBitmap};
use windows::Media::Capture::Frames::{
    MediaFrameArrivedEventArgs, MediaFrameReader, MediaFrameSource, MediaFrameSourceKind,
};
use windows::Media::Capture::{
    LowLagMediaRecording, MediaCapture, MediaCaptureInitializationSettings, MediaStreamType,
    PhotoCaptureSource,
};
use windows::Media::MediaProperties::{
    ImageEncodingProperties, MediaEncodingProfile, MediaEncodingSubtypes, VideoEncodingProperties,
    VideoEncodingQuality,
};
use windows::Storage::StorageFile;
use windows::Storage::Streams::{DataReader, InMemoryRandomAccessStream};
use windows::Win32::System::WinRT::IMemoryBufferByteAccess;
use windows::core::{HSTRING, Interface};

use camera_capture_core::models::camera_models::{
    CameraDescriptor, CameraFormat, FlashSetting, PixelFormat,
};
use camera_capture_core::models::error::CameraError;
use camera_capture_core::models::frame::FrameBuffer;
use camera_capture_core::sync::CancellationToken;
use camera_capture_core::traits::capture_backend::{CaptureBackend, FrameSink, UseCase};

/// Camera backend over WinRT `MediaCapture`.
///
/// Owns the `MediaCapture` instance, the optional frame reader, and the
/// in-flight low-lag recording. All methods run on the coordinator's
/// command thread; frame delivery arrives on a WinRT worker thread through
/// the `FrameArrived` handler.
pub struct MediaCaptureBackend {
    capture: Option<MediaCapture>,
    frame_reader: Option<MediaFrameReader>,
    frame_arrived_token: Option<i64>,
    recording: Option<LowLagMediaRecording>,
}

// SAFETY: the WinRT objects are agile (MediaCapture and friends are
// registered free-threaded); the struct adds no thread-affine state.
unsafe impl Send for MediaCaptureBackend {}

impl MediaCaptureBackend {
    pub fn new() -> Self {
        Self {
            capture: None,
            frame_reader: None,
            frame_arrived_token: None,
            recording: None,
        }
    }

    fn capture(&self) -> Result<&MediaCapture, CameraError> {
        self.capture.as_ref().ok_or_else(|| {
            CameraError::UnableToInitialize("no camera session is bound".into())
        })
    }

    fn initialize(&mut self, camera: &CameraDescriptor) -> Result<(), CameraError> {
        let settings = MediaCaptureInitializationSettings::new()
            .map_err(|e| init_err("initialization settings", e))?;
        settings
            .SetVideoDeviceId(&HSTRING::from(camera.id.as_str()))
            .map_err(|e| init_err("video device id", e))?;
        settings
            .SetPhotoCaptureSource(PhotoCaptureSource::Auto)
            .map_err(|e| init_err("photo capture source", e))?;

        let capture = MediaCapture::new().map_err(|e| init_err("media capture", e))?;
        capture
            .InitializeWithSettingsAsync(&settings)
            .and_then(|op| op.get())
            .map_err(|e| init_err("media capture initialize", e))?;

        self.capture = Some(capture);
        Ok(())
    }

    /// Select the photo stream properties matching `format`.
    ///
    /// A missing match is not fatal; the device keeps its current photo
    /// stream configuration.
    fn apply_format(&self, format: &CameraFormat) -> Result<(), CameraError> {
        let controller = self
            .capture()?
            .VideoDeviceController()
            .map_err(|e| init_err("video device controller", e))?;

        let properties = controller
            .GetAvailableMediaStreamProperties(MediaStreamType::Photo)
            .map_err(|e| init_err("photo stream properties", e))?;

        for entry in &properties {
            let Ok(video) = entry.cast::<VideoEncodingProperties>() else {
                continue;
            };
            if video.Width().ok() == Some(format.width)
                && video.Height().ok() == Some(format.height)
            {
                controller
                    .SetMediaStreamPropertiesAsync(MediaStreamType::Photo, &video)
                    .and_then(|op| op.get())
                    .map_err(|e| init_err("set photo stream properties", e))?;
                return Ok(());
            }
        }

        log::warn!(
            "no photo stream properties at {}x{}; keeping device defaults",
            format.width,
            format.height
        );
        Ok(())
    }

    fn start_frame_reader(&mut self, sink: FrameSink) -> Result<(), CameraError> {
        let capture = self.capture()?;

        let source = Self::color_frame_source(capture)?;
        let reader = capture
            .CreateFrameReaderWithSubtypeAsync(
                &source,
                &MediaEncodingSubtypes::Bgra8().map_err(|e| init_err("bgra8 subtype", e))?,
            )
            .and_then(|op| op.get())
            .map_err(|e| init_err("frame reader", e))?;

        // Scratch for de-striding driver buffers; reused across frames.
        let scratch: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
        let handler = TypedEventHandler::<MediaFrameReader, MediaFrameArrivedEventArgs>::new(
            move |reader, _args| {
                if let Some(reader) = reader.as_ref() {
                    if let Err(e) = deliver_frame(reader, &sink, &scratch) {
                        log::debug!("frame delivery skipped: {}", e);
                    }
                }
                Ok(())
            },
        );
        let token = reader
            .FrameArrived(&handler)
            .map_err(|e| init_err("frame arrived handler", e))?;

        reader
            .StartAsync()
            .and_then(|op| op.get())
            .map_err(|e| init_err("frame reader start", e))?;

        self.frame_reader = Some(reader);
        self.frame_arrived_token = Some(token);
        Ok(())
    }

    /// The color video-record frame source, the same stream the preview
    /// and recorder consume.
    fn color_frame_source(capture: &MediaCapture) -> Result<MediaFrameSource, CameraError> {
        let sources = capture
            .FrameSources()
            .map_err(|e| init_err("frame sources", e))?;

        for entry in &sources {
            let source = entry.Value().map_err(|e| init_err("frame source", e))?;
            let info = source.Info().map_err(|e| init_err("frame source info", e))?;
            let is_color_record = info.MediaStreamType().ok()
                == Some(MediaStreamType::VideoRecord)
                && info.SourceKind().ok() == Some(MediaFrameSourceKind::Color);
            if is_color_record {
                return Ok(source);
            }
        }

        Err(CameraError::OperationNotSupported(
            "device exposes no color video frame source".into(),
        ))
    }

    fn stop_frame_reader(&mut self) {
        if let Some(reader) = self.frame_reader.take() {
            if let Some(token) = self.frame_arrived_token.take() {
                let _ = reader.RemoveFrameArrived(token);
            }
            if let Err(e) = reader.StopAsync().and_then(|op| op.get()) {
                log::warn!("frame reader stop failed: {}", e);
            }
        }
    }

    fn abort_recording(&mut self) {
        if let Some(recording) = self.recording.take() {
            if let Err(e) = recording.StopAsync().and_then(|op| op.get()) {
                log::warn!("recording stop during teardown failed: {}", e);
            }
            let _ = recording.FinishAsync().and_then(|op| op.get());
        }
    }
}

impl Default for MediaCaptureBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureBackend for MediaCaptureBackend {
    fn bind(
        &mut self,
        camera: &CameraDescriptor,
        format: &CameraFormat,
        use_cases: &[UseCase],
        frames: Option<FrameSink>,
    ) -> Result<(), CameraError> {
        let result = (|| {
            self.initialize(camera)?;
            self.apply_format(format)?;
            if use_cases.contains(&UseCase::FrameAnalysis) {
                let sink = frames.ok_or_else(|| {
                    CameraError::UnableToInitialize(
                        "frame analysis requested without a frame sink".into(),
                    )
                })?;
                self.start_frame_reader(sink)?;
            }
            Ok(())
        })();

        if result.is_err() {
            // transactional bind: leave nothing half-configured
            self.unbind_all();
        }
        result
    }

    fn unbind_all(&mut self) {
        self.abort_recording();
        self.stop_frame_reader();
        if let Some(capture) = self.capture.take() {
            if let Err(e) = capture.Close() {
                log::warn!("media capture close failed: {}", e);
            }
        }
    }

    fn set_flash(&mut self, setting: FlashSetting) -> Result<(), CameraError> {
        let flash = self
            .capture()?
            .VideoDeviceController()
            .and_then(|c| c.FlashControl())
            .map_err(|e| control_err("flash control", e))?;

        if !flash.Supported().unwrap_or(false) {
            return Err(CameraError::OperationNotSupported(
                "device has no flash control".into(),
            ));
        }

        flash
            .SetEnabled(setting.enabled)
            .map_err(|e| control_err("flash enabled", e))?;
        if let Some(auto) = setting.auto {
            flash
                .SetAuto(auto)
                .map_err(|e| control_err("flash auto", e))?;
        }
        Ok(())
    }

    fn set_zoom(&mut self, ratio: f32) -> Result<(), CameraError> {
        let zoom = self
            .capture()?
            .VideoDeviceController()
            .and_then(|c| c.ZoomControl())
            .map_err(|e| control_err("zoom control", e))?;

        if !zoom.Supported().unwrap_or(false) {
            return Err(CameraError::OperationNotSupported(
                "device has no zoom control".into(),
            ));
        }

        // The control only accepts multiples of its step; round up.
        let step = zoom.Step().map_err(|e| control_err("zoom step", e))?;
        let value = if step > 0.0 && ratio % step != 0.0 {
            (ratio / step).ceil() * step
        } else {
            ratio
        };

        zoom.SetValue(value).map_err(|e| control_err("zoom value", e))
    }

    fn capture_photo(&mut self, token: &CancellationToken) -> Result<Vec<u8>, CameraError> {
        token.check()?;
        let capture = self.capture()?;

        let jpeg = ImageEncodingProperties::CreateJpeg()
            .map_err(|e| capture_err("jpeg properties", e))?;
        let stream =
            InMemoryRandomAccessStream::new().map_err(|e| capture_err("memory stream", e))?;

        capture
            .CapturePhotoToStreamAsync(&jpeg, &stream)
            .and_then(|op| op.get())
            .map_err(|e| capture_err("photo capture", e))?;
        token.check()?;

        let size = stream.Size().map_err(|e| capture_err("stream size", e))?;
        let input = stream
            .GetInputStreamAt(0)
            .map_err(|e| capture_err("stream rewind", e))?;
        let reader =
            DataReader::CreateDataReader(&input).map_err(|e| capture_err("data reader", e))?;
        reader
            .LoadAsync(size as u32)
            .and_then(|op| op.get())
            .map_err(|e| capture_err("stream load", e))?;

        let mut bytes = vec![0u8; size as usize];
        reader
            .ReadBytes(&mut bytes)
            .map_err(|e| capture_err("stream read", e))?;
        Ok(bytes)
    }

    fn start_recording(&mut self, path: &Path) -> Result<(), CameraError> {
        if self.recording.is_some() {
            return Err(CameraError::AlreadyRecording);
        }
        let capture = self.capture()?;

        // StorageFile needs the relay file to exist before it can wrap it.
        std::fs::File::create(path).map_err(|e| {
            CameraError::CaptureFailed(format!("unable to create recording file: {}", e))
        })?;
        let file = StorageFile::GetFileFromPathAsync(&HSTRING::from(path.as_os_str()))
            .and_then(|op| op.get())
            .map_err(|e| capture_err("recording file", e))?;

        let profile = MediaEncodingProfile::CreateMp4(VideoEncodingQuality::Auto)
            .map_err(|e| capture_err("mp4 profile", e))?;

        let recording = capture
            .PrepareLowLagRecordToStorageFileAsync(&profile, &file)
            .and_then(|op| op.get())
            .map_err(|e| capture_err("recording prepare", e))?;
        recording
            .StartAsync()
            .and_then(|op| op.get())
            .map_err(|e| capture_err("recording start", e))?;

        self.recording = Some(recording);
        Ok(())
    }

    fn stop_recording(&mut self, token: &CancellationToken) -> Result<(), CameraError> {
        token.check()?;
        let recording = self.recording.take().ok_or_else(|| {
            CameraError::CaptureFailed("no recording is in progress".into())
        })?;

        recording
            .StopAsync()
            .and_then(|op| op.get())
            .map_err(|e| capture_err("recording stop", e))?;
        // FinishAsync completion is the finalize signal: once it returns,
        // the container file is fully written and safe to read.
        recording
            .FinishAsync()
            .and_then(|op| op.get())
            .map_err(|e| capture_err("recording finalize", e))?;
        Ok(())
    }

    fn release(&mut self) {
        self.unbind_all();
    }
}

/// Pull the latest frame off the reader and hand it to the sink as BGRA.
///
/// Driver buffers may carry row-stride padding; those rows are repacked
/// through `scratch` so the sink always sees tightly packed pixels.
fn deliver_frame(
    reader: &MediaFrameReader,
    sink: &FrameSink,
    scratch: &Mutex<Vec<u8>>,
) -> windows::core::Result<()> {
    let frame = reader.TryAcquireLatestFrame()?;
    let bitmap = frame.VideoMediaFrame()?.SoftwareBitmap()?;

    // The reader is created with a Bgra8 subtype but some drivers still
    // deliver their native layout.
    let bitmap = if bitmap.BitmapPixelFormat()? == BitmapPixelFormat::Bgra8 {
        bitmap
    } else {
        SoftwareBitmap::Convert(&bitmap, BitmapPixelFormat::Bgra8)?
    };

    let width = bitmap.PixelWidth()? as u32;
    let height = bitmap.PixelHeight()? as u32;
    let row_bytes = width as usize * 4;

    let buffer = bitmap.LockBuffer(BitmapBufferAccessMode::Read)?;
    let plane = buffer.GetPlaneDescription(0)?;
    let start = plane.StartIndex as usize;
    let stride = plane.Stride as usize;

    let reference = buffer.CreateReference()?;
    let byte_access: IMemoryBufferByteAccess = reference.cast()?;

    unsafe {
        let mut data: *mut u8 = std::ptr::null_mut();
        let mut len: u32 = 0;
        byte_access.GetBuffer(&mut data, &mut len)?;
        let raw = std::slice::from_raw_parts(data, len as usize);

        if start == 0 && stride == row_bytes && raw.len() == row_bytes * height as usize {
            if let Some(frame) = FrameBuffer::new(raw, width, height, PixelFormat::Bgra32) {
                sink(&frame);
            }
            return Ok(());
        }

        if height == 0 {
            return Ok(());
        }
        let last_row_end = start + (height as usize - 1) * stride + row_bytes;
        if stride < row_bytes || last_row_end > raw.len() {
            log::debug!(
                "dropping frame with inconsistent plane layout: start {} stride {} len {} for {}x{}",
                start,
                stride,
                raw.len(),
                width,
                height
            );
            return Ok(());
        }

        let mut packed = scratch.lock();
        packed.resize(row_bytes * height as usize, 0);
        for row in 0..height as usize {
            let src = start + row * stride;
            packed[row * row_bytes..(row + 1) * row_bytes]
                .copy_from_slice(&raw[src..src + row_bytes]);
        }
        if let Some(frame) = FrameBuffer::new(&packed, width, height, PixelFormat::Bgra32) {
            sink(&frame);
        }
    }
    Ok(())
}

fn init_err(context: &str, e: windows::core::Error) -> CameraError {
    CameraError::UnableToInitialize(format!("{} failed: {}", context, e))
}

fn control_err(context: &str, e: windows::core::Error) -> CameraError {
    CameraError::OperationNotSupported(format!("{} failed: {}", context, e))
}

fn capture_err(context: &str, e: windows::core::Error) -> CameraError {
    CameraError::CaptureFailed(format!("{} failed: {}", context, e))
}
