//! End-to-end crop cache protocol: sibling crop sources over one original,
//! saved sequentially and concurrently.

use image::{DynamicImage, GenericImageView, RgbImage};
use imgsource::transforms::{chain, cropper, grid_cropper, resize_to};
use imgsource::{
    CropImageSource, Cropper, ImageSource, PathImageSource, SourceConfig, paths_to_image_sources,
};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

fn write_source_png(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 64])
    });
    DynamicImage::ImageRgb8(img)
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

fn counted(inner: Cropper) -> (Cropper, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let wrapped = cropper(move |img| {
        counter.fetch_add(1, Ordering::SeqCst);
        inner(img)
    });
    (wrapped, calls)
}

struct Workspace {
    tmp: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("out")).unwrap();
        Self { tmp }
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.tmp.path().join(rel)
    }

    fn siblings(&self, base: &str, count: usize, cropper: &Cropper) -> Vec<CropImageSource> {
        let source_path = self.path(&format!("{base}.png"));
        write_source_png(&source_path, 64, 64);
        let original: Arc<dyn ImageSource> = Arc::new(PathImageSource::new(source_path));
        (0..count)
            .map(|idx| {
                CropImageSource::new(original.clone(), idx, cropper.clone(), format!("{base}_{idx}"))
            })
            .collect()
    }
}

#[test]
fn sequential_siblings_crop_once_and_drain_cache() {
    let ws = Workspace::new();
    let (cropper, calls) = counted(grid_cropper(2, 2));
    let crops = ws.siblings("cat", 4, &cropper);
    let (out, cache) = (ws.path("out"), ws.path("cache"));

    for crop in &crops {
        crop.save(&out, ".png", Some(&cache)).unwrap();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        file_names(&out),
        vec!["cat_0.png", "cat_1.png", "cat_2.png", "cat_3.png"]
    );
    assert!(file_names(&cache).is_empty());
    for name in file_names(&out) {
        let img = image::open(out.join(name)).unwrap();
        assert_eq!(img.dimensions(), (32, 32));
    }
}

#[test]
fn first_saved_crop_leaves_siblings_in_cache() {
    let ws = Workspace::new();
    let crops = ws.siblings("cat", 4, &grid_cropper(2, 2));
    let (out, cache) = (ws.path("out"), ws.path("cache"));

    crops[2].save(&out, ".jpg", Some(&cache)).unwrap();

    assert_eq!(file_names(&out), vec!["cat_2.jpg"]);
    assert_eq!(
        file_names(&cache),
        vec!["cat_0.jpg", "cat_1.jpg", "cat_3.jpg"]
    );
}

#[test]
fn concurrent_siblings_crop_once() {
    let ws = Workspace::new();
    let (cropper, calls) = counted(grid_cropper(4, 4));
    let crops = ws.siblings("dog", 16, &cropper);
    let (out, cache) = (ws.path("out"), ws.path("cache"));

    let written: Vec<PathBuf> = crops
        .par_iter()
        .map(|crop| crop.save(&out, ".png", Some(&cache)).unwrap())
        .collect();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(written.len(), 16);
    assert_eq!(file_names(&out).len(), 16);
    assert!(file_names(&cache).is_empty());
}

#[test]
fn concurrent_siblings_crop_once_across_cache_dir_spellings() {
    let ws = Workspace::new();
    fs::create_dir(ws.path("elsewhere")).unwrap();
    let (cropper, calls) = counted(grid_cropper(4, 2));
    let crops = ws.siblings("owl", 8, &cropper);
    let out = ws.path("out");
    let spellings = [
        ws.path("cache"),
        ws.path("cache/."),
        ws.path("elsewhere/../cache"),
    ];

    crops.par_iter().enumerate().for_each(|(i, crop)| {
        let cache = &spellings[i % spellings.len()];
        crop.save(&out, ".png", Some(cache)).unwrap();
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(file_names(&out).len(), 8);
    assert!(file_names(&ws.path("cache")).is_empty());
}

#[test]
fn independent_crop_sets_share_a_cache_dir() {
    let ws = Workspace::new();
    let (cropper, calls) = counted(grid_cropper(2, 1));
    let mut crops = ws.siblings("left", 2, &cropper);
    crops.extend(ws.siblings("right", 2, &cropper));
    let (out, cache) = (ws.path("out"), ws.path("cache"));

    crops.par_iter().for_each(|crop| {
        crop.save(&out, ".png", Some(&cache)).unwrap();
    });

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        file_names(&out),
        vec!["left_0.png", "left_1.png", "right_0.png", "right_1.png"]
    );
}

#[test]
fn save_with_config_routes_extension_and_cache() {
    let ws = Workspace::new();
    let crops = ws.siblings("bird", 2, &grid_cropper(1, 2));
    let config = SourceConfig {
        image_ext: "png".into(),
        cache_dir: Some(ws.path("cache")),
        ..SourceConfig::default()
    };

    for crop in &crops {
        crop.save_with(&ws.path("out"), &config).unwrap();
    }

    assert_eq!(file_names(&ws.path("out")), vec!["bird_0.png", "bird_1.png"]);
}

#[test]
fn path_sources_from_list_save_with_shared_preprocessing() {
    let ws = Workspace::new();
    let paths: Vec<PathBuf> = ["a", "b", "c"]
        .iter()
        .map(|stem| {
            let path = ws.path(&format!("{stem}.png"));
            write_source_png(&path, 50, 40);
            path
        })
        .collect();

    let sources = paths_to_image_sources(&paths, &chain(vec![resize_to(100, 100)]));
    for source in &sources {
        source.save(&ws.path("out"), ".jpg", None).unwrap();
    }

    assert_eq!(file_names(&ws.path("out")), vec!["a.jpg", "b.jpg", "c.jpg"]);
    for name in file_names(&ws.path("out")) {
        let dims = image::image_dimensions(ws.path("out").join(name)).unwrap();
        assert_eq!(dims, (100, 100));
    }
}
