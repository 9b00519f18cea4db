//! QR decoding via `rqrr`.

use image::GrayImage;

use super::{BarcodeDecoder, BarcodeFormat, BarcodeResult, DecodeOptions};
use crate::models::camera_models::PixelFormat;
use crate::models::frame::FrameBuffer;
use crate::pipeline::convert;

const FORMATS: [BarcodeFormat; 1] = [BarcodeFormat::QrCode];

/// QR code decoder backed by the `rqrr` crate.
///
/// `auto_rotate` and `try_harder` are accepted but have no effect: rqrr's
/// grid detection is orientation-independent and has no effort knob.
#[derive(Debug, Default)]
pub struct QrDecoder;

impl QrDecoder {
    pub fn new() -> Self {
        Self
    }

    fn decode_gray(image: GrayImage, multiple: bool) -> Vec<BarcodeResult> {
        let mut prepared = rqrr::PreparedImage::prepare(image);
        let grids = prepared.detect_grids();

        let mut results = Vec::new();
        for grid in grids {
            match grid.decode() {
                Ok((_meta, content)) => {
                    results.push(BarcodeResult {
                        text: content,
                        format: BarcodeFormat::QrCode,
                    });
                    if !multiple {
                        break;
                    }
                }
                Err(e) => {
                    log::debug!("qr grid rejected: {:?}", e);
                }
            }
        }
        results
    }
}

impl BarcodeDecoder for QrDecoder {
    fn decode(&self, frame: &FrameBuffer<'_>, options: &DecodeOptions) -> Vec<BarcodeResult> {
        let luma = match frame.format {
            PixelFormat::Gray8 => frame.data.to_vec(),
            PixelFormat::Bgra32 => {
                let mut luma = Vec::new();
                convert::bgra_to_gray(frame.data, &mut luma);
                luma
            }
            // The delivery pipeline normalizes to BGRA before dispatch;
            // other formats only show up when the decoder is fed directly.
            _ => {
                let mut bgra = Vec::new();
                convert::normalize_to_bgra(frame, &mut bgra);
                let mut luma = Vec::new();
                convert::bgra_to_gray(&bgra, &mut luma);
                luma
            }
        };

        let Some(image) = GrayImage::from_raw(frame.width, frame.height, luma) else {
            return Vec::new();
        };

        let results = Self::decode_gray(image.clone(), options.multiple);
        if !results.is_empty() || !options.try_inverted {
            return results;
        }

        // Light-on-dark retry
        let mut inverted = image;
        for pixel in inverted.pixels_mut() {
            pixel.0[0] = 255 - pixel.0[0];
        }
        Self::decode_gray(inverted, options.multiple)
    }

    fn supported_formats(&self) -> &[BarcodeFormat] {
        &FORMATS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_frame_finds_nothing() {
        let data = vec![255u8; 64 * 64];
        let frame = FrameBuffer::new(&data, 64, 64, PixelFormat::Gray8).unwrap();
        let results = QrDecoder::new().decode(&frame, &DecodeOptions::default());
        assert!(results.is_empty());
    }

    #[test]
    fn noise_frame_finds_nothing() {
        // Deterministic speckle; nothing resembling a finder pattern
        let data: Vec<u8> = (0..64u32 * 64)
            .map(|i| (i.wrapping_mul(2654435761).rotate_left(13) >> 16) as u8)
            .collect();
        let frame = FrameBuffer::new(&data, 64, 64, PixelFormat::Gray8).unwrap();
        let results = QrDecoder::new().decode(&frame, &DecodeOptions::default());
        assert!(results.is_empty());
    }

    #[test]
    fn reports_qr_support_only() {
        assert_eq!(QrDecoder::new().supported_formats(), &[BarcodeFormat::QrCode]);
    }
}
