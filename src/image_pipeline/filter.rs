//! Denoising filter catalog
//!
//! A small fixed set of per-pixel kernels evaluated by the convolution driver:
//! a 5x5 box blur and two bilateral filters whose edge-stop term comes either
//! from colour similarity or from scene geometry (depth and normals).

pub mod taps;
pub mod types;
mod box_blur;
mod bilateral;

pub use taps::{Tap, TapTable};
pub use types::{FilterKind, PixelFilter};
pub use box_blur::BoxBlur;
pub use bilateral::{ColorBilateral, DepthBilateral};
