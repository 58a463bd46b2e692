//! Preview export module
//!
//! Gamma-encodes finished colour images and writes them as TIFF files for an
//! external viewer.

mod writer;
mod tiff_preview_writer;
pub mod types;

pub use writer::PreviewWriter;
pub use tiff_preview_writer::TiffPreviewWriter;
pub use types::{TiffCompression, gamma, DEFAULT_GAMMA};
