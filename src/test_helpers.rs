//! Shared test utilities: synthetic images, fixture writers, and directory
//! listings.

use crate::source::Cropper;
use crate::transforms::cropper;
use image::{DynamicImage, ImageEncoder, RgbImage};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Deterministic RGB test pattern with distinct values per pixel position.
pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8])
    }))
}

/// Write a small valid JPEG file with the given dimensions.
pub fn write_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = gradient_image(width, height).to_rgb8();
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write `img` losslessly as PNG.
pub fn write_test_png(path: &Path, img: &DynamicImage) {
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

/// Wrap a cropper so that calls to it are counted.
pub fn counting_cropper(inner: Cropper) -> (Cropper, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let counted = cropper(move |img| {
        counter.fetch_add(1, Ordering::SeqCst);
        inner(img)
    });
    (counted, calls)
}

/// File names directly inside `dir`, sorted. Empty if `dir` does not exist.
pub fn sorted_file_names(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
