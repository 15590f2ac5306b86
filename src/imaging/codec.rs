//! Codec adapter over the pure-Rust `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader`, format sniffed from content |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (configurable quality) |
//! | Encode → AVIF | `image::codecs::avif::AvifEncoder` (rav1e, speed 6) |
//! | Encode → PNG, TIFF, WebP | `DynamicImage::write_to` (lossless) |
//!
//! Sources only ever talk to [`Codec`]: `load` a file as 8-bit RGB, `save` a
//! pixel buffer to a path whose extension selects the encoder.

use super::params::Quality;
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, ImageFormat, ImageReader};
use std::borrow::Cow;
use std::io::Cursor;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error("Unsupported image extension: {0:?}")]
    UnsupportedFormat(String),
}

/// rav1e speed preset; 6 keeps encoding time reasonable for dataset batches.
const AVIF_SPEED: u8 = 6;

/// Extensions whose decoders are compiled in.
///
/// AVIF is absent on purpose: the `"avif"` feature only enables the encoder,
/// yet `ImageFormat::reading_enabled()` reports `true` for it.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Normalize an output extension to its dotted form (`jpg` → `.jpg`).
pub fn normalize_extension(ext: &str) -> String {
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{ext}")
    }
}

/// Resolve the encoder for an extension (with or without the leading dot).
///
/// Returns `None` when the format is unknown or its encoder is not compiled in.
pub fn format_for_extension(ext: &str) -> Option<ImageFormat> {
    ImageFormat::from_extension(ext.trim_start_matches('.')).filter(|f| f.writing_enabled())
}

/// Convert to a color layout the target encoder accepts.
fn encodable_for(format: ImageFormat, img: &DynamicImage) -> Cow<'_, DynamicImage> {
    let color = img.color();
    let accepted = match format {
        ImageFormat::Jpeg => matches!(color, ColorType::L8 | ColorType::Rgb8),
        ImageFormat::WebP | ImageFormat::Avif => {
            matches!(color, ColorType::Rgb8 | ColorType::Rgba8)
        }
        _ => true,
    };
    if accepted {
        Cow::Borrowed(img)
    } else if color.has_alpha() && format != ImageFormat::Jpeg {
        Cow::Owned(DynamicImage::ImageRgba8(img.to_rgba8()))
    } else {
        Cow::Owned(DynamicImage::ImageRgb8(img.to_rgb8()))
    }
}

/// Encoder settings plus the decode/encode entry points used by image sources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Codec {
    quality: Quality,
}

impl Codec {
    pub fn new(quality: Quality) -> Self {
        Self { quality }
    }

    pub fn quality(self) -> Quality {
        self.quality
    }

    /// Decode raw bytes into a pixel buffer.
    ///
    /// The format is sniffed from the bytes; `ext_hint` is only used when
    /// sniffing fails. The color layout of the file is preserved.
    pub fn decode(&self, bytes: &[u8], ext_hint: Option<&str>) -> Result<DynamicImage, CodecError> {
        let mut reader = ImageReader::new(Cursor::new(bytes));
        if let Some(format) =
            ext_hint.and_then(|ext| ImageFormat::from_extension(ext.trim_start_matches('.')))
        {
            reader.set_format(format);
        }
        reader
            .with_guessed_format()?
            .decode()
            .map_err(|e| CodecError::Decode(e.to_string()))
    }

    /// Encode a pixel buffer for the given extension.
    pub fn encode(&self, img: &DynamicImage, ext: &str) -> Result<Vec<u8>, CodecError> {
        let format = format_for_extension(ext)
            .ok_or_else(|| CodecError::UnsupportedFormat(ext.to_string()))?;
        let img = encodable_for(format, img);
        let quality = self.quality.as_u8();

        let mut buf = Cursor::new(Vec::new());
        let written = match format {
            ImageFormat::Jpeg => {
                img.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))
            }
            ImageFormat::Avif => img.write_with_encoder(AvifEncoder::new_with_speed_quality(
                &mut buf, AVIF_SPEED, quality,
            )),
            other => img.write_to(&mut buf, other),
        };
        written.map_err(|e| CodecError::Encode(format!("{format:?}: {e}")))?;
        Ok(buf.into_inner())
    }

    /// Read and decode a file as an 8-bit, 3-channel color image.
    pub fn load(&self, path: &Path) -> Result<DynamicImage, CodecError> {
        let bytes = std::fs::read(path)?;
        let ext = path.extension().and_then(|e| e.to_str());
        let img = self.decode(&bytes, ext)?;
        Ok(DynamicImage::ImageRgb8(img.to_rgb8()))
    }

    /// Encode for the extension of `path` and write the bytes there.
    pub fn save(&self, img: &DynamicImage, path: &Path) -> Result<(), CodecError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let bytes = self.encode(img, ext)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}
