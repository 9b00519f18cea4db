use super::camera_models::{FlashMode, ResolutionRequest};

/// Configuration for a capture session.
///
/// Values map to the host control's bindable properties; the coordinator
/// applies them at connect time and on subsequent update calls.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfiguration {
    /// Target still-capture resolution. Unset means "highest available".
    pub resolution: ResolutionRequest,

    /// Forward every Nth frame to analysis subscribers (default: 20).
    pub frame_divisor: u32,

    /// Whether the frame-analysis use case is bound at all.
    pub enable_frame_analysis: bool,

    /// Initial flash mode (default: off).
    pub flash_mode: FlashMode,

    /// Initial zoom ratio (default: 1.0). Clamped to the device range.
    pub zoom: f32,
}

impl CaptureConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.frame_divisor == 0 {
            return Err("frame divisor must be at least 1".into());
        }
        if !self.zoom.is_finite() || self.zoom <= 0.0 {
            return Err(format!("invalid zoom ratio: {}", self.zoom));
        }
        if self.resolution.width < 0.0 || self.resolution.height < 0.0 {
            return Err("resolution dimensions must be non-negative".into());
        }
        Ok(())
    }
}

impl Default for CaptureConfiguration {
    fn default() -> Self {
        Self {
            resolution: ResolutionRequest::unset(),
            frame_divisor: 20,
            enable_frame_analysis: false,
            flash_mode: FlashMode::Off,
            zoom: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_is_valid() {
        assert!(CaptureConfiguration::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_divisor() {
        let config = CaptureConfiguration {
            frame_divisor: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_zoom() {
        let config = CaptureConfiguration {
            zoom: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
