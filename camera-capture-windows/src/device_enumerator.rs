//! Windows camera enumeration via `DeviceInformation`.
//!
//! Lists video capture devices with friendly names, enclosure panel
//! mapping, and the photo stream formats each device supports.

use windows::Devices::Enumeration::{DeviceClass, DeviceInformation, Panel};
use windows::Media::Capture::{
    MediaCapture, MediaCaptureInitializationSettings, MediaStreamType, PhotoCaptureSource,
};
use windows::Media::MediaProperties::VideoEncodingProperties;
use windows::core::{HSTRING, Interface};

use camera_capture_core::models::camera_models::{
    CameraCapabilities, CameraDescriptor, CameraFormat, CameraPosition, DeviceKind, PixelFormat,
};
use camera_capture_core::models::error::CameraError;
use camera_capture_core::sync::CancellationToken;
use camera_capture_core::traits::camera_provider::CameraProvider;

/// Camera device enumerator using `DeviceInformation::FindAllAsync`.
///
/// Format and capability probing initializes a throwaway `MediaCapture`
/// per device, so a refresh is not cheap; the coordinator only refreshes
/// when its cached list is empty.
pub struct VideoDeviceEnumerator {
    cameras: Vec<CameraDescriptor>,
}

// SAFETY: WinRT enumeration objects are not held across calls; the cached
// descriptor list is plain data.
unsafe impl Send for VideoDeviceEnumerator {}

impl VideoDeviceEnumerator {
    pub fn new() -> Self {
        Self {
            cameras: Vec::new(),
        }
    }

    fn describe_device(device: &DeviceInformation) -> Result<CameraDescriptor, CameraError> {
        let id = device
            .Id()
            .map_err(|e| enum_err("device id", e))?
            .to_string_lossy();
        let name = device
            .Name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|_| "Camera".into());

        let position = device
            .EnclosureLocation()
            .ok()
            .and_then(|location| location.Panel().ok())
            .map(|panel| match panel {
                Panel::Front => CameraPosition::Front,
                Panel::Back => CameraPosition::Back,
                _ => CameraPosition::External,
            })
            .unwrap_or(CameraPosition::External);

        let is_default = device.IsDefault().unwrap_or(false);

        let (supported_formats, capabilities) = Self::probe_device(&id)?;

        Ok(CameraDescriptor {
            id,
            name,
            position,
            // Windows exposes no lens-system metadata; everything is a
            // generic video capture device.
            kind: DeviceKind::Generic,
            supported_formats,
            capabilities,
            is_default,
        })
    }

    /// Initialize a short-lived `MediaCapture` to read the photo stream
    /// properties and control capabilities.
    fn probe_device(id: &str) -> Result<(Vec<CameraFormat>, CameraCapabilities), CameraError> {
        let settings = MediaCaptureInitializationSettings::new()
            .map_err(|e| enum_err("initialization settings", e))?;
        settings
            .SetVideoDeviceId(&HSTRING::from(id))
            .map_err(|e| enum_err("video device id", e))?;
        settings
            .SetPhotoCaptureSource(PhotoCaptureSource::Auto)
            .map_err(|e| enum_err("photo capture source", e))?;

        let capture = MediaCapture::new().map_err(|e| enum_err("media capture", e))?;
        capture
            .InitializeWithSettingsAsync(&settings)
            .and_then(|op| op.get())
            .map_err(|e| enum_err("media capture initialize", e))?;

        let controller = capture
            .VideoDeviceController()
            .map_err(|e| enum_err("video device controller", e))?;

        let mut formats = Vec::new();
        if let Ok(properties) =
            controller.GetAvailableMediaStreamProperties(MediaStreamType::Photo)
        {
            for entry in &properties {
                let Ok(video) = entry.cast::<VideoEncodingProperties>() else {
                    continue;
                };
                let (Ok(width), Ok(height)) = (video.Width(), video.Height()) else {
                    continue;
                };
                if width == 0 || height == 0 {
                    continue;
                }
                let pixel_format = video
                    .Subtype()
                    .map(|s| subtype_to_pixel_format(&s.to_string_lossy()))
                    .unwrap_or(PixelFormat::Nv12);
                formats.push(CameraFormat::new(width, height, pixel_format));
            }
        }

        let has_flash = controller
            .FlashControl()
            .and_then(|flash| flash.Supported())
            .unwrap_or(false);

        let (min_zoom, max_zoom) = controller
            .ZoomControl()
            .ok()
            .filter(|zoom| zoom.Supported().unwrap_or(false))
            .and_then(|zoom| Some((zoom.Min().ok()?, zoom.Max().ok()?)))
            .unwrap_or((1.0, 1.0));

        let _ = capture.Close();

        Ok((
            formats,
            CameraCapabilities {
                has_flash,
                min_zoom,
                max_zoom,
            },
        ))
    }
}

impl Default for VideoDeviceEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraProvider for VideoDeviceEnumerator {
    fn refresh_available_cameras(
        &mut self,
        token: &CancellationToken,
    ) -> Result<(), CameraError> {
        token.check()?;

        let devices = DeviceInformation::FindAllAsyncDeviceClass(DeviceClass::VideoCapture)
            .and_then(|op| op.get())
            .map_err(|e| enum_err("FindAllAsync", e))?;

        let mut cameras = Vec::new();
        for device in &devices {
            token.check()?;
            match Self::describe_device(&device) {
                Ok(descriptor) => cameras.push(descriptor),
                Err(e) => log::warn!("skipping video capture device: {}", e),
            }
        }

        log::debug!("enumerated {} video capture devices", cameras.len());
        self.cameras = cameras;
        Ok(())
    }

    fn available_cameras(&self) -> &[CameraDescriptor] {
        &self.cameras
    }
}

fn subtype_to_pixel_format(subtype: &str) -> PixelFormat {
    match subtype.to_ascii_uppercase().as_str() {
        "ARGB32" | "RGB32" | "BGRA8" => PixelFormat::Bgra32,
        "L8" => PixelFormat::Gray8,
        _ => PixelFormat::Nv12,
    }
}

fn enum_err(context: &str, e: windows::core::Error) -> CameraError {
    CameraError::UnableToInitialize(format!("{} failed: {}", context, e))
}
