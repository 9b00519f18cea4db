//! Device and format selection.
//!
//! The format selection algorithm is the compatibility contract shared by
//! every platform backend: filter to formats that fit inside the requested
//! resolution, fall back to the full supported set when nothing fits, then
//! take the largest area with ties broken by enumeration order.

use crate::models::camera_models::{CameraDescriptor, CameraFormat, DeviceKind, ResolutionRequest};
use crate::models::error::CameraError;

pub struct DeviceSelector;

impl DeviceSelector {
    /// Select the capture format for `camera` that best satisfies `request`.
    ///
    /// An unset request treats every supported format as a candidate and
    /// picks the maximum area. Returns `None` only when the descriptor
    /// advertises no formats at all.
    pub fn select_format(
        camera: &CameraDescriptor,
        request: &ResolutionRequest,
    ) -> Option<CameraFormat> {
        let formats = &camera.supported_formats;
        if formats.is_empty() {
            return None;
        }

        let candidates: Vec<&CameraFormat> = if request.is_unset() {
            formats.iter().collect()
        } else {
            let fitting: Vec<&CameraFormat> = formats
                .iter()
                .filter(|f| f.width as f64 <= request.width && f.height as f64 <= request.height)
                .collect();
            if fitting.is_empty() {
                formats.iter().collect()
            } else {
                fitting
            }
        };

        // max_by_key keeps the last maximum; iterate in reverse so ties
        // resolve to the first-encountered format in enumeration order.
        candidates
            .into_iter()
            .rev()
            .max_by_key(|f| f.area())
            .copied()
    }

    /// Pick the still camera when none was explicitly selected.
    ///
    /// Preference order: a front/back multi-lens system, then a front/back
    /// wide-angle, then any front/back device that is not depth-only, and
    /// finally the first enumerated device.
    pub fn pick_camera(cameras: &[CameraDescriptor]) -> Result<&CameraDescriptor, CameraError> {
        if cameras.is_empty() {
            return Err(CameraError::NoCameraAvailable);
        }

        let mut wide: Option<&CameraDescriptor> = None;
        let mut fallback: Option<&CameraDescriptor> = None;

        for camera in cameras {
            if camera.kind == DeviceKind::Depth {
                continue;
            }
            if !matches!(
                camera.position,
                crate::models::camera_models::CameraPosition::Front
                    | crate::models::camera_models::CameraPosition::Back
            ) {
                continue;
            }

            match camera.kind {
                DeviceKind::MultiLens => return Ok(camera),
                DeviceKind::WideAngle => {
                    if wide.is_none() {
                        wide = Some(camera);
                    }
                }
                _ => {
                    if fallback.is_none() {
                        fallback = Some(camera);
                    }
                }
            }
        }

        Ok(wide.or(fallback).unwrap_or(&cameras[0]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::camera_models::{
        CameraCapabilities, CameraPosition, PixelFormat,
    };

    fn descriptor(formats: &[(u32, u32)]) -> CameraDescriptor {
        CameraDescriptor {
            id: "cam0".into(),
            name: "Test Camera".into(),
            position: CameraPosition::Back,
            kind: DeviceKind::WideAngle,
            supported_formats: formats
                .iter()
                .map(|&(w, h)| CameraFormat::new(w, h, PixelFormat::Nv12))
                .collect(),
            capabilities: CameraCapabilities::default(),
            is_default: true,
        }
    }

    fn named(id: &str, position: CameraPosition, kind: DeviceKind) -> CameraDescriptor {
        CameraDescriptor {
            id: id.into(),
            name: id.into(),
            position,
            kind,
            supported_formats: vec![CameraFormat::new(640, 480, PixelFormat::Nv12)],
            capabilities: CameraCapabilities::default(),
            is_default: false,
        }
    }

    #[test]
    fn picks_max_area_within_request() {
        let camera = descriptor(&[(640, 480), (1280, 720), (1920, 1080)]);
        let selected =
            DeviceSelector::select_format(&camera, &ResolutionRequest::new(1000.0, 1000.0))
                .unwrap();
        assert_eq!((selected.width, selected.height), (640, 480));
    }

    #[test]
    fn falls_back_to_full_set_when_nothing_fits() {
        let camera = descriptor(&[(640, 480), (1280, 720), (1920, 1080)]);
        let selected =
            DeviceSelector::select_format(&camera, &ResolutionRequest::new(100.0, 100.0)).unwrap();
        assert_eq!((selected.width, selected.height), (1920, 1080));
    }

    #[test]
    fn unset_request_picks_overall_max_area() {
        let camera = descriptor(&[(1280, 720), (1920, 1080), (640, 480)]);
        let selected = DeviceSelector::select_format(&camera, &ResolutionRequest::unset()).unwrap();
        assert_eq!((selected.width, selected.height), (1920, 1080));
    }

    #[test]
    fn ties_resolve_to_first_enumerated() {
        // 1280x720 and 960x960 have the same area; enumeration order decides.
        let camera = descriptor(&[(1280, 720), (960, 960)]);
        let selected = DeviceSelector::select_format(&camera, &ResolutionRequest::unset()).unwrap();
        assert_eq!((selected.width, selected.height), (1280, 720));
    }

    #[test]
    fn no_formats_yields_none() {
        let camera = descriptor(&[]);
        assert!(DeviceSelector::select_format(&camera, &ResolutionRequest::unset()).is_none());
    }

    #[test]
    fn empty_device_list_is_no_camera() {
        assert_eq!(
            DeviceSelector::pick_camera(&[]).unwrap_err(),
            CameraError::NoCameraAvailable
        );
    }

    #[test]
    fn prefers_multi_lens_over_wide_angle() {
        let cameras = vec![
            named("wide", CameraPosition::Back, DeviceKind::WideAngle),
            named("multi", CameraPosition::Back, DeviceKind::MultiLens),
        ];
        assert_eq!(DeviceSelector::pick_camera(&cameras).unwrap().id, "multi");
    }

    #[test]
    fn skips_depth_sensors() {
        let cameras = vec![
            named("depth", CameraPosition::Front, DeviceKind::Depth),
            named("wide", CameraPosition::Back, DeviceKind::WideAngle),
        ];
        assert_eq!(DeviceSelector::pick_camera(&cameras).unwrap().id, "wide");
    }

    #[test]
    fn telephoto_is_last_resort_before_first_enumerated() {
        let cameras = vec![
            named("tele", CameraPosition::Back, DeviceKind::Telephoto),
            named("wide", CameraPosition::Back, DeviceKind::WideAngle),
        ];
        assert_eq!(DeviceSelector::pick_camera(&cameras).unwrap().id, "wide");

        let only_tele = vec![named("tele", CameraPosition::Back, DeviceKind::Telephoto)];
        assert_eq!(DeviceSelector::pick_camera(&only_tele).unwrap().id, "tele");
    }

    #[test]
    fn depth_only_list_falls_back_to_first_enumerated() {
        let cameras = vec![named("depth", CameraPosition::Front, DeviceKind::Depth)];
        assert_eq!(DeviceSelector::pick_camera(&cameras).unwrap().id, "depth");
    }
}
