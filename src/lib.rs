//! # imgsource
//!
//! Lazily read and persist images from different origins inside a
//! dataset-preparation pipeline. A source is constructed once per dataset
//! item and asked to either [`read`](ImageSource::read) its pixels or
//! [`save`](ImageSource::save) itself into a target directory.
//!
//! ```text
//! PathImageSource   data/cat.jpg ──decode──▶ preprocessing ──▶ out/cat.jpg
//! CropImageSource   original ──cropper──▶ cache/cat_{0..N} ──move──▶ out/cat_2.jpg
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`source`] | The [`ImageSource`] trait, error type and transform closures |
//! | [`path_source`] | [`PathImageSource`]: a file plus a preprocessing chain |
//! | [`crop_source`] | [`CropImageSource`]: one crop of another source |
//! | [`cache`] | Crop cache: materialize a crop set once, move crops out |
//! | [`convert`] | Paths and directories → [`PathImageSource`] lists |
//! | [`transforms`] | Stock preprocessing steps and croppers |
//! | [`imaging`] | Codec adapter over the `image` crate, crop geometry |
//! | [`config`] | TOML save configuration |
//!
//! # Design Decisions
//!
//! ## Crops Are Computed Once Per Original
//!
//! Splitting an image into N crops should not decode the original N times.
//! The first crop source of a set to be saved writes every crop into a cache
//! directory; its siblings find their file already there and only move it.
//! That is why crop sources *require* a cache directory to be saved, and why
//! their names carry the crop index (`cat_2`): the cache file of crop `j` is
//! derived from the shared base name.
//!
//! ## `read` On A Crop Returns The Full Frame
//!
//! [`CropImageSource::read`](ImageSource::read) delegates to the original
//! and returns the uncropped image; only `save` produces the crop. Callers
//! inspecting a crop source see the frame it was cut from.
//!
//! ## Sources Are Values
//!
//! Sources hold no mutable state and are `Send + Sync`. The only shared
//! resource is the cache directory, whose populate step is serialized per
//! crop set.

pub mod cache;
pub mod config;
pub mod convert;
pub mod crop_source;
pub mod imaging;
pub mod path_source;
pub mod source;
pub mod transforms;

pub use config::{SourceConfig, load_config};
pub use convert::{dir_to_image_sources, paths_to_image_sources};
pub use crop_source::CropImageSource;
pub use path_source::PathImageSource;
pub use source::{Cropper, ImageSource, Preprocess, Preprocessing, SourceError};

#[cfg(test)]
pub(crate) mod test_helpers;
