//! Decoded image types

use crate::image_pipeline::common::error::{DenoiseError, Result};

/// A decoded or filtered image.
///
/// Samples are row-major (Y then X) and interleaved per pixel, with `channels`
/// floats per pixel. Decoded samples are `byte / 255`; filter output may drift
/// slightly outside `[0, 1]` and is kept as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// Samples per pixel
    pub channels: usize,
    /// Interleaved pixel data
    pub data: Vec<f32>,
}

impl DecodedImage {
    pub fn new(width: usize, height: usize, channels: usize, data: Vec<f32>) -> Result<Self> {
        if width == 0 || height == 0 || channels == 0 {
            return Err(DenoiseError::InvalidDimensions(width, height));
        }
        if data.len() != width * height * channels {
            return Err(DenoiseError::InvalidDimensions(width, height));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Builds an image where every pixel equals `pixel`.
    pub fn filled(width: usize, height: usize, pixel: &[f32]) -> Result<Self> {
        let data = pixel
            .iter()
            .copied()
            .cycle()
            .take(width * height * pixel.len())
            .collect();
        Self::new(width, height, pixel.len(), data)
    }

    pub fn pixel(&self, x: usize, y: usize) -> &[f32] {
        let start = (y * self.width + x) * self.channels;
        &self.data[start..start + self.channels]
    }

    /// Clamp-to-edge lookup. Coordinates outside the image resolve to the
    /// nearest border pixel on each axis independently.
    #[inline]
    pub fn sample(&self, x: isize, y: isize) -> &[f32] {
        let x = x.clamp(0, self.width as isize - 1) as usize;
        let y = y.clamp(0, self.height as isize - 1) as usize;
        self.pixel(x, y)
    }
}
