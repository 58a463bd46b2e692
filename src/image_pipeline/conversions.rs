//! Pipeline conversions module
//!
//! Orchestrates decode, filtering and preview export for packed plane buffers.

mod denoise;


pub use denoise::{DenoisePipeline, read_file};
