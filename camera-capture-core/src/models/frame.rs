use super::camera_models::PixelFormat;

/// A borrowed camera frame.
///
/// The backing memory belongs to the platform capture callback and is only
/// valid for the duration of one dispatch. Subscribers that want to retain
/// pixel data must copy it before returning.
///
/// For `Nv12`, `data` is the full-resolution Y plane followed immediately by
/// the interleaved half-resolution UV plane (no stride padding).
#[derive(Debug, Clone, Copy)]
pub struct FrameBuffer<'a> {
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl<'a> FrameBuffer<'a> {
    /// Wrap raw pixel data, checking that the slice length matches the
    /// declared dimensions and format.
    pub fn new(data: &'a [u8], width: u32, height: u32, format: PixelFormat) -> Option<Self> {
        if data.len() != format.frame_len(width, height) {
            return None;
        }
        Some(Self {
            data,
            width,
            height,
            format,
        })
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}
