//! Pixel-format normalization to the canonical 32-bit BGRA layout.
//!
//! Conversions run on the frame delivery thread and must stay cheap; all of
//! them write into a caller-provided scratch buffer to avoid per-frame
//! allocation.

use crate::models::camera_models::PixelFormat;
use crate::models::frame::FrameBuffer;

/// Normalize `frame` into `out` as tightly packed BGRA32.
///
/// `out` is resized to exactly `width * height * 4` bytes. Callers should
/// skip this for frames already in `Bgra32` and dispatch the source buffer
/// directly.
pub fn normalize_to_bgra(frame: &FrameBuffer<'_>, out: &mut Vec<u8>) {
    let len = PixelFormat::Bgra32.frame_len(frame.width, frame.height);
    out.resize(len, 0);

    match frame.format {
        PixelFormat::Bgra32 => out.copy_from_slice(frame.data),
        PixelFormat::Rgba32 => rgba_to_bgra(frame.data, out),
        PixelFormat::Gray8 => gray_to_bgra(frame.data, out),
        PixelFormat::Nv12 => nv12_to_bgra(
            frame.data,
            frame.width as usize,
            frame.height as usize,
            out,
        ),
    }
}

fn rgba_to_bgra(src: &[u8], out: &mut [u8]) {
    for (rgba, bgra) in src.chunks_exact(4).zip(out.chunks_exact_mut(4)) {
        bgra[0] = rgba[2];
        bgra[1] = rgba[1];
        bgra[2] = rgba[0];
        bgra[3] = rgba[3];
    }
}

fn gray_to_bgra(src: &[u8], out: &mut [u8]) {
    for (&luma, bgra) in src.iter().zip(out.chunks_exact_mut(4)) {
        bgra[0] = luma;
        bgra[1] = luma;
        bgra[2] = luma;
        bgra[3] = 255;
    }
}

/// NV12 (full-resolution Y plane, interleaved half-resolution UV plane) to
/// BGRA using BT.601 integer arithmetic.
fn nv12_to_bgra(src: &[u8], width: usize, height: usize, out: &mut [u8]) {
    let (y_plane, uv_plane) = src.split_at(width * height);

    for row in 0..height {
        let uv_row = row / 2;
        for col in 0..width {
            let y = y_plane[row * width + col] as i32;
            let uv_index = uv_row * width + (col / 2) * 2;
            let u = uv_plane[uv_index] as i32 - 128;
            let v = uv_plane[uv_index + 1] as i32 - 128;

            let c = (y - 16).max(0) * 298;
            let r = (c + 409 * v + 128) >> 8;
            let g = (c - 100 * u - 208 * v + 128) >> 8;
            let b = (c + 516 * u + 128) >> 8;

            let offset = (row * width + col) * 4;
            out[offset] = b.clamp(0, 255) as u8;
            out[offset + 1] = g.clamp(0, 255) as u8;
            out[offset + 2] = r.clamp(0, 255) as u8;
            out[offset + 3] = 255;
        }
    }
}

/// Luma extraction from BGRA (BT.601 weights), used by barcode decoding.
pub fn bgra_to_gray(src: &[u8], out: &mut Vec<u8>) {
    out.clear();
    out.reserve(src.len() / 4);
    for bgra in src.chunks_exact(4) {
        let b = bgra[0] as u32;
        let g = bgra[1] as u32;
        let r = bgra[2] as u32;
        out.push(((r * 77 + g * 150 + b * 29) >> 8) as u8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame<'a>(data: &'a [u8], w: u32, h: u32, format: PixelFormat) -> FrameBuffer<'a> {
        FrameBuffer::new(data, w, h, format).unwrap()
    }

    #[test]
    fn rgba_swizzles_channels() {
        let src = [10, 20, 30, 40];
        let mut out = Vec::new();
        normalize_to_bgra(&frame(&src, 1, 1, PixelFormat::Rgba32), &mut out);
        assert_eq!(out, vec![30, 20, 10, 40]);
    }

    #[test]
    fn gray_expands_to_opaque_bgra() {
        let src = [100, 200];
        let mut out = Vec::new();
        normalize_to_bgra(&frame(&src, 2, 1, PixelFormat::Gray8), &mut out);
        assert_eq!(out, vec![100, 100, 100, 255, 200, 200, 200, 255]);
    }

    #[test]
    fn nv12_neutral_chroma_is_grayscale() {
        // 2x2 frame, Y = 128 everywhere, U = V = 128 (neutral chroma)
        let src = [128, 128, 128, 128, 128, 128];
        let mut out = Vec::new();
        normalize_to_bgra(&frame(&src, 2, 2, PixelFormat::Nv12), &mut out);

        for bgra in out.chunks_exact(4) {
            assert_eq!(bgra[0], bgra[1]);
            assert_eq!(bgra[1], bgra[2]);
            assert_eq!(bgra[3], 255);
            // Y=128 maps near mid-gray after the BT.601 range expansion
            assert!((bgra[0] as i32 - 130).abs() <= 2);
        }
    }

    #[test]
    fn nv12_black_and_white_extremes() {
        // 2x2: Y = [16, 235, 16, 235] (video black / white), neutral chroma
        let src = [16, 235, 16, 235, 128, 128];
        let mut out = Vec::new();
        normalize_to_bgra(&frame(&src, 2, 2, PixelFormat::Nv12), &mut out);

        assert_eq!(&out[0..4], &[0, 0, 0, 255]);
        assert_eq!(&out[4..8], &[255, 255, 255, 255]);
    }

    #[test]
    fn bgra_passthrough_copies() {
        let src = [1, 2, 3, 4];
        let mut out = Vec::new();
        normalize_to_bgra(&frame(&src, 1, 1, PixelFormat::Bgra32), &mut out);
        assert_eq!(out, src);
    }

    #[test]
    fn gray_round_trip_through_bgra() {
        let src = [0u8, 64, 128, 255];
        let mut bgra = Vec::new();
        normalize_to_bgra(&frame(&src, 4, 1, PixelFormat::Gray8), &mut bgra);

        let mut gray = Vec::new();
        bgra_to_gray(&bgra, &mut gray);
        assert_eq!(gray, src);
    }
}
