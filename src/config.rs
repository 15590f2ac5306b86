//! Save configuration.
//!
//! Controls how sources are persisted: the output extension, the optional
//! crop cache directory, and encoder quality. Loaded from a TOML file; every
//! key is optional and unknown keys are rejected to catch typos early.
//!
//! ```toml
//! image_ext = ".jpg"          # Output extension (with or without the dot)
//! cache_dir = "/tmp/crops"    # Crop cache; required to save crop sources
//!
//! [encoding]
//! quality = 90                # JPEG/AVIF quality (1-100)
//! ```

use crate::imaging::{Codec, Quality, format_for_extension};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// How image sources are saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// Output file extension, e.g. `".jpg"`.
    pub image_ext: String,
    /// Crop cache directory. Crop sources cannot be saved without one.
    pub cache_dir: Option<PathBuf>,
    pub encoding: EncodingConfig,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            image_ext: ".jpg".to_string(),
            cache_dir: None,
            encoding: EncodingConfig::default(),
        }
    }
}

/// Encoder settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodingConfig {
    /// Lossy quality for JPEG and AVIF output (1-100).
    pub quality: u32,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            quality: Quality::default().value(),
        }
    }
}

impl SourceConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SourceConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Err(quality) = Quality::try_from(self.encoding.quality) {
            return Err(ConfigError::Validation(format!(
                "encoding.quality must be {}-{}, got {quality}",
                Quality::MIN,
                Quality::MAX
            )));
        }
        if format_for_extension(&self.image_ext).is_none() {
            return Err(ConfigError::Validation(format!(
                "image_ext {:?} has no encoder",
                self.image_ext
            )));
        }
        Ok(())
    }

    /// Codec carrying the configured encoder settings.
    pub fn codec(&self) -> Codec {
        Codec::new(Quality::new(self.encoding.quality))
    }
}

/// Load a config file.
///
/// Returns the defaults if the file does not exist. Returns `Err` if the
/// file exists but is invalid TOML or fails validation.
pub fn load_config(path: &Path) -> Result<SourceConfig, ConfigError> {
    if !path.exists() {
        return Ok(SourceConfig::default());
    }
    let content = fs::read_to_string(path)?;
    SourceConfig::from_toml_str(&content)
}

/// Returns a fully-commented stock config with all keys and explanations.
pub fn stock_config_toml() -> &'static str {
    r##"# Image source configuration
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Extension of every saved file. Selects the encoder:
# .jpg/.jpeg, .png, .tif/.tiff, .webp (lossless), .avif
image_ext = ".jpg"

# Directory where crop sets are materialized before each crop is moved to
# its target directory. Required to save crop sources.
# cache_dir = "/tmp/crops"

# ---------------------------------------------------------------------------
# Encoding
# ---------------------------------------------------------------------------
[encoding]
# Quality for lossy formats (JPEG, AVIF), 1-100.
quality = 90
"##
}
