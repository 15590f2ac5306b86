//! Turning file paths into image sources.

use crate::imaging::supported_input_extensions;
use crate::path_source::PathImageSource;
use crate::source::{Preprocessing, SourceError};
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// One [`PathImageSource`] per path, in input order, all sharing `preprocessing`.
pub fn paths_to_image_sources<I, P>(paths: I, preprocessing: &Preprocessing) -> Vec<PathImageSource>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    paths
        .into_iter()
        .map(|path| PathImageSource::new(path).with_preprocessing(preprocessing.clone()))
        .collect()
}

/// Collect every decodable image below `dir`, sorted by path.
///
/// Hidden files and directories (leading `.`) are skipped, as are files whose
/// extension has no decoder compiled in. Symlinks are followed; a link back
/// to one of its own ancestors is skipped instead of failing the scan.
pub fn dir_to_image_sources(
    dir: &Path,
    preprocessing: &Preprocessing,
) -> Result<Vec<PathImageSource>, SourceError> {
    let mut paths = Vec::new();
    let walker = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.loop_ancestor().is_some() => {
                warn!(
                    path = ?e.path(),
                    ancestor = ?e.loop_ancestor(),
                    "skipping symlink loop"
                );
                continue;
            }
            Err(e) => return Err(io::Error::from(e).into()),
        };
        if entry.file_type().is_file() && is_image(entry.path()) {
            paths.push(entry.into_path());
        }
    }
    paths.sort();
    Ok(paths_to_image_sources(paths, preprocessing))
}

fn is_image(path: &Path) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    supported_input_extensions().contains(&ext.as_str())
}
