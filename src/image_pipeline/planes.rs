//! Packed plane buffer decoding module
//!
//! Renderer output is a headerless stack of square plane groups, each group
//! holding four interleaved byte channels. This module maps logical channel
//! indices onto that layout and decodes the requested subset into a float image.

mod reader;
mod packed_reader;
pub mod layout;
pub mod types;

pub use reader::PlaneReader;
pub use packed_reader::PackedPlaneReader;
pub use layout::PlaneLayout;
pub use types::DecodedImage;
