//! Image comparison against a converged reference render

use crate::image_pipeline::common::error::{DenoiseError, Result};
use crate::image_pipeline::planes::DecodedImage;

/// Mean squared error over every sample of two equally shaped images.
pub fn mean_squared_error(a: &DecodedImage, b: &DecodedImage) -> Result<f64> {
    if (a.width, a.height, a.channels) != (b.width, b.height, b.channels) {
        return Err(DenoiseError::InvalidDimensions(b.width, b.height));
    }
    let sum: f64 = a
        .data
        .iter()
        .zip(&b.data)
        .map(|(&x, &y)| {
            let d = (x - y) as f64;
            d * d
        })
        .sum();
    Ok(sum / a.data.len() as f64)
}

/// Error of the unfiltered input and of the filtered output against a reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceScore {
    pub input_mse: f64,
    pub output_mse: f64,
}

impl ReferenceScore {
    /// `true` when filtering moved the image closer to the reference.
    pub fn improved(&self) -> bool {
        self.output_mse < self.input_mse
    }
}
