//! Pure calculation functions for crop geometry.
//!
//! All functions here are pure and testable without any I/O or images.

/// A rectangular region of an image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Split an image of `size` into a `cols` × `rows` grid of regions.
///
/// Regions are returned in row-major order (left to right, then top to
/// bottom), which is the crop index order. When the size does not divide
/// evenly, the last column and the last row absorb the remainder, so the
/// regions always tile the whole image.
///
/// Returns `None` when `cols` or `rows` is zero or exceeds the pixel count
/// along its axis (some tiles would be empty).
///
/// # Examples
/// ```
/// # use imgsource::imaging::{Region, grid_regions};
/// // 100x50 split in 2x1 → two 50x50 halves
/// let halves = grid_regions((100, 50), 2, 1).unwrap();
/// assert_eq!(halves[1], Region { x: 50, y: 0, width: 50, height: 50 });
/// ```
pub fn grid_regions(size: (u32, u32), cols: u32, rows: u32) -> Option<Vec<Region>> {
    let (width, height) = size;
    if cols == 0 || rows == 0 || cols > width || rows > height {
        return None;
    }

    let tile_w = width / cols;
    let tile_h = height / rows;

    let mut regions = Vec::with_capacity(tile_count(cols, rows));
    for row in 0..rows {
        let y = row * tile_h;
        let h = if row + 1 == rows { height - y } else { tile_h };
        for col in 0..cols {
            let x = col * tile_w;
            let w = if col + 1 == cols { width - x } else { tile_w };
            regions.push(Region {
                x,
                y,
                width: w,
                height: h,
            });
        }
    }
    Some(regions)
}

/// Number of tiles in a `cols` × `rows` grid, computed without `u32` overflow.
fn tile_count(cols: u32, rows: u32) -> usize {
    cols as usize * rows as usize
}
