//! Denoising pipeline configuration

use crate::image_pipeline::common::error::{DenoiseError, Result};
use crate::image_pipeline::convolve::DEFAULT_PROGRESS_INTERVAL;
use crate::image_pipeline::filter::taps::{DEFAULT_RADIUS, DEFAULT_SPACING};
use crate::image_pipeline::filter::{FilterKind, TapTable};
use crate::image_pipeline::planes::PlaneLayout;
use crate::image_pipeline::planes::layout::MAX_RESOLUTION;
use crate::image_pipeline::preview::{TiffCompression, DEFAULT_GAMMA};

/// Configuration for decoding, filtering and preview export
#[derive(Debug, Clone, PartialEq)]
pub struct DenoiseConfig {
    /// Filter to apply after decoding
    pub filter: FilterKind,
    /// Channel request overriding the filter's own binding
    pub channels: Option<Vec<usize>>,
    /// Bilateral kernel radius in taps
    pub tap_radius: usize,
    /// Pixel distance between neighbouring taps
    pub tap_spacing: usize,
    /// Rows between progress reports
    pub progress_interval: usize,
    /// Whether to filter rows on the rayon pool
    pub parallel: bool,
    /// Compression used for preview TIFFs
    pub compression: TiffCompression,
    /// Display gamma exponent for previews
    pub gamma: f32,
    /// Packed buffer geometry
    pub layout: PlaneLayout,
}

impl Default for DenoiseConfig {
    fn default() -> Self {
        Self {
            filter: FilterKind::default(),
            channels: None,
            tap_radius: DEFAULT_RADIUS,
            tap_spacing: DEFAULT_SPACING,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            parallel: true,
            compression: TiffCompression::None,
            gamma: DEFAULT_GAMMA,
            layout: PlaneLayout::default(),
        }
    }
}

impl DenoiseConfig {
    pub fn builder() -> DenoiseConfigBuilder {
        DenoiseConfigBuilder::default()
    }

    /// Channels to decode: the override if set, else the filter's binding.
    pub fn channels(&self) -> Vec<usize> {
        self.channels
            .clone()
            .unwrap_or_else(|| self.filter.channels().to_vec())
    }

    /// Rejects a layout or kernel the pipeline cannot address.
    pub fn validate(&self) -> Result<()> {
        let PlaneLayout { resolution, sub_channels } = self.layout;
        if resolution == 0 || resolution > MAX_RESOLUTION || sub_channels == 0 {
            return Err(DenoiseError::InvalidDimensions(resolution, resolution));
        }
        TapTable::check_bounds(self.tap_radius, self.tap_spacing)
    }
}

/// Builder for DenoiseConfig
#[derive(Default)]
pub struct DenoiseConfigBuilder {
    filter: Option<FilterKind>,
    channels: Option<Option<Vec<usize>>>,
    tap_radius: Option<usize>,
    tap_spacing: Option<usize>,
    progress_interval: Option<usize>,
    parallel: Option<bool>,
    compression: Option<TiffCompression>,
    gamma: Option<f32>,
    layout: Option<PlaneLayout>,
}

impl DenoiseConfigBuilder {
    pub fn filter(mut self, filter: FilterKind) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn channels(mut self, channels: Option<Vec<usize>>) -> Self {
        self.channels = Some(channels);
        self
    }

    pub fn tap_radius(mut self, radius: usize) -> Self {
        self.tap_radius = Some(radius);
        self
    }

    pub fn tap_spacing(mut self, spacing: usize) -> Self {
        self.tap_spacing = Some(spacing);
        self
    }

    pub fn progress_interval(mut self, rows: usize) -> Self {
        self.progress_interval = Some(rows);
        self
    }

    pub fn parallel(mut self, enable: bool) -> Self {
        self.parallel = Some(enable);
        self
    }

    pub fn compression(mut self, compression: TiffCompression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn gamma(mut self, exponent: f32) -> Self {
        self.gamma = Some(exponent);
        self
    }

    pub fn layout(mut self, layout: PlaneLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn resolution(mut self, resolution: usize) -> Self {
        self.layout = Some(PlaneLayout::new(resolution));
        self
    }

    pub fn build(self) -> DenoiseConfig {
        let default = DenoiseConfig::default();
        DenoiseConfig {
            filter: self.filter.unwrap_or(default.filter),
            channels: self.channels.unwrap_or(default.channels),
            tap_radius: self.tap_radius.unwrap_or(default.tap_radius),
            tap_spacing: self.tap_spacing.unwrap_or(default.tap_spacing),
            progress_interval: self.progress_interval.unwrap_or(default.progress_interval),
            parallel: self.parallel.unwrap_or(default.parallel),
            compression: self.compression.unwrap_or(default.compression),
            gamma: self.gamma.unwrap_or(default.gamma),
            layout: self.layout.unwrap_or(default.layout),
        }
    }
}
