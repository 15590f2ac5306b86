//! Image source backed by a single file.

use crate::imaging::{Codec, normalize_extension};
use crate::source::{ImageSource, Preprocessing, SourceError, output_path};
use crate::transforms::no_preprocessing;
use image::DynamicImage;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A file on disk plus an ordered preprocessing chain applied at read time.
///
/// The name defaults to the file name without directory and extension
/// (`data/cat.jpg` → `cat`). Reading is a pure function of the path and the
/// chain: nothing is cached, every `read` or `save` decodes the file again.
#[derive(Clone)]
pub struct PathImageSource {
    path: PathBuf,
    preprocessing: Preprocessing,
    name: String,
    codec: Codec,
}

impl PathImageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            preprocessing: no_preprocessing(),
            name,
            codec: Codec::default(),
        }
    }

    pub fn with_preprocessing(mut self, preprocessing: Preprocessing) -> Self {
        self.preprocessing = preprocessing;
        self
    }

    /// Override the name derived from the file path.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn preprocessing(&self) -> &Preprocessing {
        &self.preprocessing
    }
}

impl fmt::Debug for PathImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathImageSource")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("preprocessing", &self.preprocessing.len())
            .field("codec", &self.codec)
            .finish()
    }
}

impl ImageSource for PathImageSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> Result<DynamicImage, SourceError> {
        let mut img = self
            .codec
            .load(&self.path)
            .map_err(|e| SourceError::Decode {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        for step in self.preprocessing.iter() {
            img = step(img)?;
        }
        debug!(
            path = %self.path.display(),
            steps = self.preprocessing.len(),
            "read image"
        );
        Ok(img)
    }

    fn save(
        &self,
        target_dir: &Path,
        image_ext: &str,
        cache_dir: Option<&Path>,
    ) -> Result<PathBuf, SourceError> {
        self.save_encoded(target_dir, image_ext, cache_dir, &self.codec)
    }

    fn save_encoded(
        &self,
        target_dir: &Path,
        image_ext: &str,
        _cache_dir: Option<&Path>,
        codec: &Codec,
    ) -> Result<PathBuf, SourceError> {
        let ext = normalize_extension(image_ext);
        let img = self.read()?;
        let output = output_path(target_dir, &self.name, &ext);
        codec.save(&img, &output)?;
        debug!(
            source = %self.path.display(),
            output = %output.display(),
            quality = %codec.quality(),
            "saved image"
        );
        Ok(output)
    }
}
