//! Encoder and filter settings shared by the codec and the stock transforms.

use std::fmt;

/// Lossy encoding quality, always within 1-100.
///
/// Only JPEG and AVIF honor it; PNG, TIFF and WebP are written losslessly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quality(u8);

impl Quality {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 100;

    /// Clamp `value` into the valid range.
    pub fn new(value: u32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX) as u8)
    }

    pub fn value(self) -> u32 {
        u32::from(self.0)
    }

    /// Raw byte as the `image` encoders take it.
    pub fn as_u8(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Strict conversion: out-of-range values are rejected instead of clamped.
impl TryFrom<u32> for Quality {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(value)
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// Unsharp-mask parameters.
///
/// `sigma` is the Gaussian blur radius (higher sharpens more); pixels whose
/// brightness differs by less than `threshold` are left untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sharpening {
    pub sigma: f32,
    pub threshold: i32,
}

impl Sharpening {
    pub fn new(sigma: f32, threshold: i32) -> Self {
        Self { sigma, threshold }
    }

    /// Enough to restore edges after a downscale.
    pub fn light() -> Self {
        Self::new(0.5, 0)
    }
}

impl Default for Sharpening {
    fn default() -> Self {
        Self::light()
    }
}
