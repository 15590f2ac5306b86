//! Stock preprocessing steps and croppers.
//!
//! Everything here returns a shared closure ([`Preprocess`] or [`Cropper`]),
//! ready to be placed in a chain or handed to a
//! [`CropImageSource`](crate::CropImageSource). Callers are free to build
//! their own with [`preprocess`] and [`cropper`].
//!
//! | Function | Effect |
//! |---|---|
//! | [`resize_to`] | exact resize, Lanczos3, aspect ratio not preserved |
//! | [`resize_to_fill`] | fill-resize then center crop to exact size |
//! | [`grayscale`] | luma conversion, kept as 3-channel RGB |
//! | [`sharpen`] | unsharp mask |
//! | [`grid_cropper`] | `cols × rows` tiles in row-major order |

use crate::imaging::{Sharpening, grid_regions};
use crate::source::{Cropper, Preprocess, Preprocessing, SourceError};
use image::DynamicImage;
use image::imageops::FilterType;
use std::sync::Arc;

/// Wrap a closure as a shareable preprocessing step.
pub fn preprocess<F>(f: F) -> Preprocess
where
    F: Fn(DynamicImage) -> Result<DynamicImage, SourceError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wrap a closure as a shareable cropper.
pub fn cropper<F>(f: F) -> Cropper
where
    F: Fn(&DynamicImage) -> Result<Vec<DynamicImage>, SourceError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Build a preprocessing chain; steps run in the given order.
pub fn chain(steps: Vec<Preprocess>) -> Preprocessing {
    Arc::from(steps)
}

/// An empty chain: reading yields the raw decode.
pub fn no_preprocessing() -> Preprocessing {
    chain(Vec::new())
}

fn check_size(op: &str, width: u32, height: u32) -> Result<(), SourceError> {
    if width == 0 || height == 0 {
        return Err(SourceError::Transform(format!(
            "{op}: target size {width}x{height} must be non-zero"
        )));
    }
    Ok(())
}

/// Resize to exactly `width` × `height`.
pub fn resize_to(width: u32, height: u32) -> Preprocess {
    preprocess(move |img| {
        check_size("resize_to", width, height)?;
        Ok(img.resize_exact(width, height, FilterType::Lanczos3))
    })
}

/// Cover `width` × `height` keeping the aspect ratio, then center crop.
pub fn resize_to_fill(width: u32, height: u32) -> Preprocess {
    preprocess(move |img| {
        check_size("resize_to_fill", width, height)?;
        Ok(img.resize_to_fill(width, height, FilterType::Lanczos3))
    })
}

pub fn grayscale() -> Preprocess {
    preprocess(|img| Ok(DynamicImage::ImageRgb8(img.grayscale().to_rgb8())))
}

pub fn sharpen(sharpening: Sharpening) -> Preprocess {
    preprocess(move |img| {
        Ok(DynamicImage::ImageRgb8(image::imageops::unsharpen(
            &img.to_rgb8(),
            sharpening.sigma,
            sharpening.threshold,
        )))
    })
}

/// Split an image into a `cols` × `rows` grid. See [`grid_regions`] for the
/// tile order and remainder handling.
pub fn grid_cropper(cols: u32, rows: u32) -> Cropper {
    cropper(move |img| {
        let regions = grid_regions((img.width(), img.height()), cols, rows).ok_or_else(|| {
            SourceError::Transform(format!(
                "cannot split {}x{} image into {cols}x{rows} tiles",
                img.width(),
                img.height()
            ))
        })?;
        Ok(regions
            .into_iter()
            .map(|r| img.crop_imm(r.x, r.y, r.width, r.height))
            .collect())
    })
}
