//! Pure image transform pipeline.
//!
//! Everything in here operates on an in-memory RGB8 [`Raster`] and has no
//! side effects: the compositor and the column splitter take a decoded
//! source and return freshly allocated outputs. Decoding and encoding go
//! through the `image` crate; persisted payloads travel as base64 data URLs.

pub mod compose;
pub mod split;

pub use compose::{CropRegion, compose};
pub use split::split_columns;

use base64::{Engine as _, engine::general_purpose};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use std::io::Cursor;
use thiserror::Error;

/// JPEG quality used for every re-encoded output.
pub const JPEG_QUALITY: u8 = 90;

const DATA_URL_PREFIX: &str = "data:";

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("could not decode source image: {0}")]
    Decode(String),
    #[error("could not encode output image: {0}")]
    Encode(String),
    #[error("malformed data URL")]
    MalformedDataUrl,
    #[error("invalid transform input: {0}")]
    InvalidInput(String),
}

/// A decoded RGB8 image: 3 bytes per pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Raster {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize * 3);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Allocate a raster filled with a single color.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 3);
        for _ in 0..(width as usize * height as usize) {
            pixels.extend_from_slice(&rgb);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    #[inline]
    pub(crate) fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        [self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]]
    }
}

/// Decode raster bytes (PNG/JPEG) into an RGB8 buffer.
pub fn decode_image(bytes: &[u8]) -> Result<Raster, TransformError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|err| TransformError::Decode(err.to_string()))?
        .to_rgb8();
    let (width, height) = decoded.dimensions();
    Ok(Raster::new(width, height, decoded.into_raw()))
}

/// Encode a raster as JPEG bytes.
pub fn encode_jpeg(raster: &Raster, quality: u8) -> Result<Vec<u8>, TransformError> {
    if raster.width == 0 || raster.height == 0 {
        return Err(TransformError::Encode("zero-sized raster".into()));
    }
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
    encoder
        .write_image(
            &raster.pixels,
            raster.width,
            raster.height,
            ExtendedColorType::Rgb8,
        )
        .map_err(|err| TransformError::Encode(err.to_string()))?;
    Ok(buffer.into_inner())
}

/// Split a `data:<mime>;base64,<payload>` URL into its MIME type and bytes.
pub fn decode_data_url(data_url: &str) -> Result<(String, Vec<u8>), TransformError> {
    let rest = data_url
        .strip_prefix(DATA_URL_PREFIX)
        .ok_or(TransformError::MalformedDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(TransformError::MalformedDataUrl)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(TransformError::MalformedDataUrl)?;
    let bytes = general_purpose::STANDARD
        .decode(payload)
        .map_err(|_| TransformError::MalformedDataUrl)?;
    Ok((mime.to_string(), bytes))
}

/// Wrap raw bytes into a data URL.
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!(
        "{DATA_URL_PREFIX}{mime};base64,{}",
        general_purpose::STANDARD.encode(bytes)
    )
}

/// Encode a raster as a JPEG data URL at the default quality.
pub fn encode_jpeg_data_url(raster: &Raster) -> Result<String, TransformError> {
    let bytes = encode_jpeg(raster, JPEG_QUALITY)?;
    Ok(encode_data_url("image/jpeg", &bytes))
}
