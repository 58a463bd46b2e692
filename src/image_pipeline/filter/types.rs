//! Filter trait and the fixed filter catalog

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::image_pipeline::filter::{BoxBlur, ColorBilateral, DepthBilateral, TapTable};
use crate::image_pipeline::planes::DecodedImage;

/// A per-pixel kernel evaluated once per output pixel.
///
/// Implementations read from the source image only and never mutate it.
pub trait PixelFilter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Samples per pixel the source image must carry.
    fn input_channels(&self) -> usize;

    /// Samples written per output pixel.
    fn output_channels(&self) -> usize {
        3
    }

    /// Writes the filtered pixel at `(x, y)` into `out`, which holds exactly
    /// `output_channels()` samples.
    fn apply(&self, image: &DecodedImage, x: usize, y: usize, out: &mut [f32]);
}

/// Channel indices of the colour plane.
pub const COLOR_CHANNELS: [usize; 3] = [0, 1, 2];

/// Colour, normal, then the two depth bytes. Slots 3 and 7 are alpha/unused.
pub const GEOMETRY_CHANNELS: [usize; 8] = [0, 1, 2, 4, 5, 6, 8, 9];

/// Fixed filter catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterKind {
    /// No filtering, show the decoded channels as they are
    Raw,
    /// 5x5 box blur with a double-weighted centre
    Box,
    /// Bilateral filter with a colour-similarity edge stop
    ColorBilateral,
    /// Bilateral filter with depth and normal edge stops
    #[default]
    DepthBilateral,
}

impl FilterKind {
    pub const ALL: [FilterKind; 4] = [
        FilterKind::Raw,
        FilterKind::Box,
        FilterKind::ColorBilateral,
        FilterKind::DepthBilateral,
    ];

    /// Channel request bound to this filter.
    pub fn channels(&self) -> &'static [usize] {
        match self {
            FilterKind::Raw | FilterKind::Box | FilterKind::ColorBilateral => &COLOR_CHANNELS,
            FilterKind::DepthBilateral => &GEOMETRY_CHANNELS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::Raw => "raw",
            FilterKind::Box => "box",
            FilterKind::ColorBilateral => "color_bilinear",
            FilterKind::DepthBilateral => "depth_bilinear",
        }
    }

    /// Instantiates the kernel, or `None` for the unfiltered view.
    pub fn build(&self, taps: &Arc<TapTable>) -> Option<Box<dyn PixelFilter>> {
        match self {
            FilterKind::Raw => None,
            FilterKind::Box => Some(Box::new(BoxBlur)),
            FilterKind::ColorBilateral => Some(Box::new(ColorBilateral::new(Arc::clone(taps)))),
            FilterKind::DepthBilateral => Some(Box::new(DepthBilateral::new(Arc::clone(taps)))),
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "raw" | "none" => Ok(FilterKind::Raw),
            "box" => Ok(FilterKind::Box),
            "color_bilinear" | "color-bilinear" | "color_bilateral" | "color-bilateral" => {
                Ok(FilterKind::ColorBilateral)
            }
            "depth_bilinear" | "depth-bilinear" | "depth_bilateral" | "depth-bilateral" => {
                Ok(FilterKind::DepthBilateral)
            }
            other => Err(format!(
                "unknown filter '{}', expected one of: raw, box, color_bilinear, depth_bilinear",
                other
            )),
        }
    }
}
