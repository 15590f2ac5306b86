//! On-disk crop cache shared by sibling crop sources.
//!
//! Cropping is paid for per *original* image, not per crop: the first
//! [`CropImageSource`](crate::CropImageSource) of a crop set to be saved
//! decodes the original, runs the cropper and writes every crop into the
//! cache directory. Each sibling then moves its own file out of the cache.
//!
//! # File naming
//!
//! Crop sources are named `<base>_<idx>` (e.g. `cat_2`). The cache key of a
//! source is its file name `<name><ext>`; crop `j` of the set is stored as
//! `<base>_<j><ext>`:
//!
//! ```text
//! cache/
//! ├── cat_0.jpg
//! ├── cat_1.jpg
//! ├── cat_2.jpg   ← moved to <target_dir>/cat_2.jpg by source "cat_2"
//! └── cat_3.jpg
//! ```
//!
//! # Concurrency
//!
//! The protocol is split in two steps:
//!
//! 1. [`CropCache::materialize`]: "ensure the crop set is on disk". The
//!    exists-check and the writes run under a process-wide mutex keyed by
//!    `(cache dir, base, ext)`, so siblings saved from several threads run the
//!    cropper exactly once. The cache directory is canonicalized first, and
//!    a key leaves the registry as soon as no caller holds its mutex.
//! 2. [`CropCache::take`]: "consume one crop". Unlocked; every sibling owns
//!    a distinct file.
//!
//! Consuming removes the entry, so saving the same crop twice recomputes the
//! whole set the second time.

use crate::imaging::Codec;
use crate::source::SourceError;
use image::DynamicImage;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};
use tracing::{debug, info};

/// Per-crop-set populate locks, keyed by `<cache_dir>/<base><ext>`.
static POPULATE_LOCKS: LazyLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    LazyLock::new(Default::default);

fn populate_lock(key: &Path) -> Arc<Mutex<()>> {
    let mut locks = POPULATE_LOCKS
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    locks.entry(key.to_path_buf()).or_default().clone()
}

/// Drop the registry entry for `key` once no other caller holds its lock.
fn release_populate_lock(key: &Path, lock: Arc<Mutex<()>>) {
    let mut locks = POPULATE_LOCKS
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    // One reference in the map, one in `lock`.
    if Arc::strong_count(&lock) == 2 {
        locks.remove(key);
    }
}

/// Crop-set base of a crop name: everything before the last `_`.
///
/// ```
/// # use imgsource::cache::crop_base_name;
/// assert_eq!(crop_base_name("cat_2"), Some("cat"));
/// assert_eq!(crop_base_name("tabby_cat_10"), Some("tabby_cat"));
/// assert_eq!(crop_base_name("cat"), None);
/// ```
pub fn crop_base_name(name: &str) -> Option<&str> {
    name.rsplit_once('_').map(|(base, _)| base)
}

/// File name of crop `index` in the set `base`.
pub fn crop_file_name(base: &str, index: usize, ext: &str) -> String {
    format!("{base}_{index}{ext}")
}

/// Outcome of [`CropCache::materialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Materialized {
    /// The requested entry was already on disk; nothing was computed.
    Cached,
    /// The crop set was computed and this many files were written.
    Written(usize),
}

/// A cache directory holding materialized crop sets.
#[derive(Debug, Clone)]
pub struct CropCache {
    dir: PathBuf,
}

impl CropCache {
    /// Open a cache directory, creating it if needed.
    ///
    /// The path is canonicalized, so every spelling of one directory shares
    /// the same populate locks.
    pub fn open(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: fs::canonicalize(dir)?,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the cache entry for the crop named `name`.
    pub fn entry_path(&self, name: &str, ext: &str) -> PathBuf {
        self.dir.join(format!("{name}{ext}"))
    }

    /// Ensure the entry for `name` exists, computing the whole crop set if not.
    ///
    /// `produce` is only called when `<name><ext>` is absent; its crops are
    /// written as `<base>_<j><ext>` for every position `j`. The caller is
    /// expected to check that `name`'s own entry is among them.
    pub fn materialize<F>(
        &self,
        name: &str,
        base: &str,
        ext: &str,
        codec: &Codec,
        produce: F,
    ) -> Result<Materialized, SourceError>
    where
        F: FnOnce() -> Result<Vec<DynamicImage>, SourceError>,
    {
        let key = self.dir.join(format!("{base}{ext}"));
        let lock = populate_lock(&key);
        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.populate(name, base, ext, codec, produce)
        };
        release_populate_lock(&key, lock);
        result
    }

    fn populate<F>(
        &self,
        name: &str,
        base: &str,
        ext: &str,
        codec: &Codec,
        produce: F,
    ) -> Result<Materialized, SourceError>
    where
        F: FnOnce() -> Result<Vec<DynamicImage>, SourceError>,
    {
        let cached_file = self.entry_path(name, ext);
        if cached_file.exists() {
            debug!(entry = %cached_file.display(), "crop cache hit");
            return Ok(Materialized::Cached);
        }

        let crops = produce()?;
        for (index, crop) in crops.iter().enumerate() {
            let path = self.dir.join(crop_file_name(base, index, ext));
            codec.save(crop, &path)?;
        }
        info!(
            dir = %self.dir.display(),
            base,
            crops = crops.len(),
            "materialized crop set"
        );
        Ok(Materialized::Written(crops.len()))
    }

    /// Move the entry for `name` into `target_dir`, consuming it.
    ///
    /// Falls back to copy + remove when the cache and the target live on
    /// different filesystems.
    pub fn take(&self, name: &str, ext: &str, target_dir: &Path) -> Result<PathBuf, SourceError> {
        let cached_file = self.entry_path(name, ext);
        let target = target_dir.join(format!("{name}{ext}"));
        match fs::rename(&cached_file, &target) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                fs::copy(&cached_file, &target)?;
                fs::remove_file(&cached_file)?;
            }
            Err(e) => return Err(e.into()),
        }
        debug!(
            entry = %cached_file.display(),
            target = %target.display(),
            "moved crop out of cache"
        );
        Ok(target)
    }
}
