//! Image source derived by cropping another source.

use crate::cache::{CropCache, Materialized, crop_base_name};
use crate::imaging::{Codec, normalize_extension};
use crate::source::{Cropper, ImageSource, SourceError};
use image::DynamicImage;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// One crop out of the crops `cropper` produces from `original`.
///
/// Sibling sources share the original, the cropper and a base name; their
/// names follow `<base>_<idx>`. Saving goes through the [crop
/// cache](crate::cache), so the original is decoded and cropped once per set.
///
/// [`read`](ImageSource::read) returns the original, *uncropped* image.
#[derive(Clone)]
pub struct CropImageSource {
    original: Arc<dyn ImageSource>,
    idx: usize,
    cropper: Cropper,
    name: String,
    codec: Codec,
}

impl CropImageSource {
    pub fn new(
        original: Arc<dyn ImageSource>,
        idx: usize,
        cropper: Cropper,
        name: impl Into<String>,
    ) -> Self {
        Self {
            original,
            idx,
            cropper,
            name: name.into(),
            codec: Codec::default(),
        }
    }

    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    pub fn idx(&self) -> usize {
        self.idx
    }

    pub fn original(&self) -> &Arc<dyn ImageSource> {
        &self.original
    }
}

impl fmt::Debug for CropImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CropImageSource")
            .field("original", &self.original.name())
            .field("idx", &self.idx)
            .field("name", &self.name)
            .field("codec", &self.codec)
            .finish()
    }
}

impl ImageSource for CropImageSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> Result<DynamicImage, SourceError> {
        self.original.read()
    }

    fn save(
        &self,
        target_dir: &Path,
        image_ext: &str,
        cache_dir: Option<&Path>,
    ) -> Result<PathBuf, SourceError> {
        self.save_encoded(target_dir, image_ext, cache_dir, &self.codec)
    }

    /// Crops are encoded with `codec` when this call populates the cache; an
    /// entry already on disk is moved as is.
    fn save_encoded(
        &self,
        target_dir: &Path,
        image_ext: &str,
        cache_dir: Option<&Path>,
        codec: &Codec,
    ) -> Result<PathBuf, SourceError> {
        let Some(cache_dir) = cache_dir else {
            return Err(SourceError::Configuration(format!(
                "crop source {:?} requires a cache directory",
                self.name
            )));
        };
        let base = crop_base_name(&self.name).ok_or_else(|| {
            SourceError::Configuration(format!(
                "crop source name {:?} must end with _<index>",
                self.name
            ))
        })?;
        let ext = normalize_extension(image_ext);

        let cache = CropCache::open(cache_dir)?;
        let outcome = cache.materialize(&self.name, base, &ext, codec, || {
            let img = self.read()?;
            (self.cropper)(&img)
        })?;
        if outcome != Materialized::Cached && !cache.entry_path(&self.name, &ext).exists() {
            return Err(SourceError::CropIndexOutOfRange {
                name: self.name.clone(),
                idx: self.idx,
            });
        }

        let output = cache.take(&self.name, &ext, target_dir)?;
        debug!(
            name = %self.name,
            idx = self.idx,
            output = %output.display(),
            ?outcome,
            "saved crop"
        );
        Ok(output)
    }
}
