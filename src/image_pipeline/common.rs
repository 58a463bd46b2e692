//! Common utilities module
//!
//! This module contains shared utilities used across the image pipeline.

pub mod error;
pub mod vector;
pub mod timing;

pub use error::{DenoiseError, Result};
pub use timing::{PipelineTimings, Timer};
