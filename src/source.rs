//! The [`ImageSource`] capability shared by every image origin.
//!
//! A source is an immutable value that knows how to produce a pixel buffer
//! ([`read`](ImageSource::read)) and how to persist itself as exactly one
//! file `<target_dir>/<name><ext>` ([`save`](ImageSource::save)).
//!
//! | Source | `read` | `save` |
//! |---|---|---|
//! | [`PathImageSource`](crate::PathImageSource) | decode file, run preprocessing | encode `read()` |
//! | [`CropImageSource`](crate::CropImageSource) | the *uncropped* original | move one crop out of the crop cache |
//!
//! Injected transforms are shared closures: [`Preprocess`] maps one buffer to
//! another, [`Cropper`] splits one buffer into an ordered list of crops.

use crate::config::SourceConfig;
use crate::imaging::{Codec, CodecError};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Codec error: {0}")]
    Codec(CodecError),
    #[error("Transform failed: {0}")]
    Transform(String),
    #[error("Crop {idx} ({name:?}) was not produced by the cropper")]
    CropIndexOutOfRange { name: String, idx: usize },
}

// Write failures keep their IO identity; everything else stays a codec error.
impl From<CodecError> for SourceError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Io(e) => SourceError::Io(e),
            other => SourceError::Codec(other),
        }
    }
}

/// A preprocessing step applied at read time.
pub type Preprocess = Arc<dyn Fn(DynamicImage) -> Result<DynamicImage, SourceError> + Send + Sync>;

/// An ordered preprocessing chain, shared between sources.
pub type Preprocessing = Arc<[Preprocess]>;

/// Splits one image into an ordered sequence of crops.
pub type Cropper =
    Arc<dyn Fn(&DynamicImage) -> Result<Vec<DynamicImage>, SourceError> + Send + Sync>;

/// Anything that can produce a pixel buffer and persist itself into a directory.
pub trait ImageSource: Send + Sync {
    /// Output file stem used by [`save`](Self::save).
    fn name(&self) -> &str;

    /// Produce the decoded pixel buffer.
    fn read(&self) -> Result<DynamicImage, SourceError>;

    /// Write `<target_dir>/<name><image_ext>` with the source's own codec and
    /// return its path.
    ///
    /// `image_ext` may be given with or without its leading dot. `cache_dir`
    /// is only used by sources that derive their output from a shared,
    /// expensive computation.
    fn save(
        &self,
        target_dir: &Path,
        image_ext: &str,
        cache_dir: Option<&Path>,
    ) -> Result<PathBuf, SourceError>;

    /// [`save`](Self::save), encoding with `codec` instead of the source's own.
    fn save_encoded(
        &self,
        target_dir: &Path,
        image_ext: &str,
        cache_dir: Option<&Path>,
        codec: &Codec,
    ) -> Result<PathBuf, SourceError>;

    /// Save with the extension, cache directory and encoder settings from
    /// `config`.
    fn save_with(&self, target_dir: &Path, config: &SourceConfig) -> Result<PathBuf, SourceError> {
        self.save_encoded(
            target_dir,
            &config.image_ext,
            config.cache_dir.as_deref(),
            &config.codec(),
        )
    }
}

/// Path of the single file a source writes into `dir`.
pub(crate) fn output_path(dir: &Path, name: &str, ext: &str) -> PathBuf {
    dir.join(format!("{name}{ext}"))
}
