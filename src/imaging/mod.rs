//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode / encode** | `image` crate, see [`Codec`] |
//! | **Grid geometry** | [`grid_regions`] |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop geometry (unit testable)
//! - **Parameters**: Encoding quality and sharpening settings
//! - **Codec**: [`Codec`], the only place bytes become pixels and back

mod calculations;
pub mod codec;
mod params;

pub use calculations::{Region, grid_regions};
pub use codec::{
    Codec, CodecError, format_for_extension, normalize_extension, supported_input_extensions,
};
pub use params::{Quality, Sharpening};
