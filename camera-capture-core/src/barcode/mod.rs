//! Barcode encode/decode wrapper.
//!
//! Symbol algorithms are external: decoders and encoders plug in behind the
//! `BarcodeDecoder`/`BarcodeEncoder` traits. The crate ships a QR decoder
//! backed by `rqrr` (`qr::QrDecoder`); other symbologies come from whatever
//! library the host wires in.

pub mod qr;
pub mod scanner;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::frame::FrameBuffer;

/// Barcode symbology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BarcodeFormat {
    QrCode,
    DataMatrix,
    Aztec,
    Pdf417,
    Ean8,
    Ean13,
    UpcA,
    UpcE,
    Code39,
    Code128,
}

/// One decoded symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarcodeResult {
    pub text: String,
    pub format: BarcodeFormat,
}

/// Reader options applied per decode attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Spend more time per frame for difficult symbols. Decoder-dependent.
    pub try_harder: bool,

    /// Retry on an inverted (light-on-dark) image when nothing is found.
    pub try_inverted: bool,

    /// Attempt rotated orientations. Decoder-dependent; 2D decoders handle
    /// orientation inherently.
    pub auto_rotate: bool,

    /// Report all symbols found in a frame rather than just the first.
    pub multiple: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            try_harder: true,
            try_inverted: false,
            auto_rotate: false,
            multiple: false,
        }
    }
}

/// Rendering options for barcode generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    pub width: u32,
    pub height: u32,
    /// Quiet-zone margin in modules.
    pub margin: u32,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            margin: 4,
        }
    }
}

/// Errors from barcode generation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BarcodeError {
    #[error("barcode format {0:?} is not supported by this encoder")]
    UnsupportedFormat(BarcodeFormat),

    #[error("encoding failed: {0}")]
    EncodeFailed(String),
}

/// Decodes symbols from a camera frame. Empty result means "no symbol
/// found", never an error.
pub trait BarcodeDecoder: Send + Sync {
    fn decode(&self, frame: &FrameBuffer<'_>, options: &DecodeOptions) -> Vec<BarcodeResult>;

    /// Symbologies this decoder can report.
    fn supported_formats(&self) -> &[BarcodeFormat];
}

/// Renders barcode symbols to a grayscale image.
pub trait BarcodeEncoder: Send + Sync {
    fn encode(
        &self,
        contents: &str,
        format: BarcodeFormat,
        options: &EncodeOptions,
    ) -> Result<image::GrayImage, BarcodeError>;
}
