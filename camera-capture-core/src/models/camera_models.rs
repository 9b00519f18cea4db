use serde::{Deserialize, Serialize};

/// Physical mounting position of a camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraPosition {
    Front,
    Back,
    External,
}

/// Lens system backing a camera device.
///
/// Multi-lens systems (dual/triple/dual-wide) are the main cameras on modern
/// phones and the best pick for barcode scanning. Depth sensors (TrueDepth,
/// LiDAR) deliver depth maps, not usable color frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceKind {
    MultiLens,
    WideAngle,
    UltraWide,
    Telephoto,
    Depth,
    Generic,
}

/// Pixel layout of a frame buffer.
///
/// `Bgra32` is the canonical layout the frame pipeline normalizes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    Bgra32,
    Rgba32,
    Nv12,
    Gray8,
}

impl PixelFormat {
    /// Total byte length of one frame in this format.
    pub fn frame_len(&self, width: u32, height: u32) -> usize {
        let pixels = width as usize * height as usize;
        match self {
            Self::Bgra32 | Self::Rgba32 => pixels * 4,
            // Full-resolution Y plane plus interleaved half-resolution UV
            Self::Nv12 => pixels + pixels / 2,
            Self::Gray8 => pixels,
        }
    }
}

/// One capture format supported by a camera: dimensions plus pixel layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraFormat {
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
}

impl CameraFormat {
    pub fn new(width: u32, height: u32, pixel_format: PixelFormat) -> Self {
        Self {
            width,
            height,
            pixel_format,
        }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Requested capture resolution.
///
/// Dimensions are floating because they typically originate from UI layout
/// sizes. A zero/unset request means "highest available".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolutionRequest {
    pub width: f64,
    pub height: f64,
}

impl ResolutionRequest {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The "highest available" request.
    pub const fn unset() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
        }
    }

    pub fn is_unset(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }

    /// Epsilon comparison; exact-equality semantics for resolution updates.
    pub fn approx_eq(&self, other: &Self) -> bool {
        (self.width - other.width).abs() < f64::EPSILON
            && (self.height - other.height).abs() < f64::EPSILON
    }
}

impl Default for ResolutionRequest {
    fn default() -> Self {
        Self::unset()
    }
}

/// Capability flags reported by a camera device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraCapabilities {
    pub has_flash: bool,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for CameraCapabilities {
    fn default() -> Self {
        Self {
            has_flash: false,
            min_zoom: 1.0,
            max_zoom: 1.0,
        }
    }
}

/// Immutable snapshot of a physical camera, produced by a `CameraProvider`.
///
/// The format list preserves the backend's enumeration order; the selector's
/// tie-break rules depend on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDescriptor {
    pub id: String,
    pub name: String,
    pub position: CameraPosition,
    pub kind: DeviceKind,
    pub supported_formats: Vec<CameraFormat>,
    pub capabilities: CameraCapabilities,
    pub is_default: bool,
}

impl CameraDescriptor {
    pub fn supports_flash(&self) -> bool {
        self.capabilities.has_flash
    }

    pub fn zoom_range(&self) -> (f32, f32) {
        (self.capabilities.min_zoom, self.capabilities.max_zoom)
    }
}

/// Flash mode requested by the host control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashMode {
    Off,
    On,
    Auto,
}

impl FlashMode {
    /// Map to the dual-boolean representation used by platform flash
    /// controls: an enabled flag plus an optional auto flag. `None` for
    /// auto means "leave the device's auto flag untouched".
    pub fn to_setting(self) -> FlashSetting {
        match self {
            Self::Off => FlashSetting {
                enabled: false,
                auto: None,
            },
            Self::On => FlashSetting {
                enabled: true,
                auto: Some(false),
            },
            Self::Auto => FlashSetting {
                enabled: true,
                auto: Some(true),
            },
        }
    }
}

impl Default for FlashMode {
    fn default() -> Self {
        Self::Off
    }
}

/// Platform-facing flash control state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashSetting {
    pub enabled: bool,
    pub auto: Option<bool>,
}
