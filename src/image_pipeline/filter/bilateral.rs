//! Edge-aware bilateral filters.
//!
//! Both filters walk the shared [`TapTable`] around the output pixel and scale
//! each tap's spatial weight by an edge-stop term. Accumulated colour is
//! normalized by the total weight at the end.

use std::sync::Arc;

use crate::image_pipeline::common::vector::{add, distance, scale, take};
use crate::image_pipeline::filter::taps::TapTable;
use crate::image_pipeline::filter::types::PixelFilter;
use crate::image_pipeline::planes::DecodedImage;

/// Depth edges weigh more than normal edges.
const DEPTH_SENSITIVITY: f32 = 5.0;
const NORMAL_SENSITIVITY: f32 = 20.0;

const NORMAL_START: usize = 3;
const DEPTH_LO: usize = 6;
const DEPTH_HI: usize = 7;

/// Depth stored as two bytes at the end of a geometry pixel.
#[inline]
pub fn decode_depth(pixel: &[f32]) -> f32 {
    (pixel[DEPTH_HI] * 256.0 + pixel[DEPTH_LO]).sqrt()
}

/// Bilateral filter whose edge stop is colour similarity.
///
/// Weights are `1 - distance(center, sample)`, left unclamped.
#[derive(Debug, Clone)]
pub struct ColorBilateral {
    taps: Arc<TapTable>,
}

impl ColorBilateral {
    pub fn new(taps: Arc<TapTable>) -> Self {
        Self { taps }
    }
}

impl PixelFilter for ColorBilateral {
    fn name(&self) -> &'static str {
        "color_bilinear"
    }

    fn input_channels(&self) -> usize {
        3
    }

    fn apply(&self, image: &DecodedImage, x: usize, y: usize, out: &mut [f32]) {
        let (cx, cy) = (x as isize, y as isize);
        let center: [f32; 3] = take(image.pixel(x, y), 0);
        let first = self.taps.center();

        let mut sum = scale(center, first.weight);
        let mut total_weight = first.weight;

        for tap in self.taps.neighbors() {
            let sample = image.sample(cx.saturating_add(tap.dx), cy.saturating_add(tap.dy));
            let sample: [f32; 3] = take(sample, 0);
            let weight = (1.0 - distance(center, sample)) * tap.weight;
            sum = add(sum, scale(sample, weight));
            total_weight += weight;
        }

        out.copy_from_slice(&sum.map(|v| v / total_weight));
    }
}

/// Bilateral filter guided by scene geometry.
///
/// Expects eight-channel pixels `[r, g, b, nx, ny, nz, depth_lo, depth_hi]`.
/// Only colour is blended; normals and depth drive the weights.
#[derive(Debug, Clone)]
pub struct DepthBilateral {
    taps: Arc<TapTable>,
}

impl DepthBilateral {
    pub fn new(taps: Arc<TapTable>) -> Self {
        Self { taps }
    }
}

impl PixelFilter for DepthBilateral {
    fn name(&self) -> &'static str {
        "depth_bilinear"
    }

    fn input_channels(&self) -> usize {
        8
    }

    fn apply(&self, image: &DecodedImage, x: usize, y: usize, out: &mut [f32]) {
        let (cx, cy) = (x as isize, y as isize);
        let center = image.pixel(x, y);
        let center_depth = decode_depth(center);
        let center_normal: [f32; 3] = take(center, NORMAL_START);

        let mut sum = [0.0f32; 3];
        let mut total_weight = 0.0f32;

        for tap in self.taps.taps() {
            let sample = image.sample(cx.saturating_add(tap.dx), cy.saturating_add(tap.dy));
            let depth_diff = DEPTH_SENSITIVITY * (center_depth - decode_depth(sample)).abs();
            let normal_diff =
                NORMAL_SENSITIVITY * distance(take(sample, NORMAL_START), center_normal);
            let weight = tap.weight / (depth_diff + normal_diff + 1.0);

            sum = add(sum, scale(take(sample, 0), weight));
            total_weight += weight;
        }

        out.copy_from_slice(&sum.map(|v| v / total_weight));
    }
}
