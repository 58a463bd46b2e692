//! Precomputed radially symmetric kernel taps for the bilateral filters.

use std::sync::{Arc, OnceLock};

use crate::image_pipeline::common::error::{DenoiseError, Result};

/// Kernel radius used by the shipped bilateral filters.
pub const DEFAULT_RADIUS: usize = 16;

/// Spacing between taps; with the default radius taps reach 32 pixels out.
pub const DEFAULT_SPACING: usize = 2;

/// Largest accepted radius; the tap count grows with its square.
pub const MAX_RADIUS: usize = 256;

/// Largest accepted tap spacing.
pub const MAX_SPACING: usize = 256;

/// Taps lighter than this are dropped.
pub const MIN_WEIGHT: f32 = 1.0 / 256.0;

/// One kernel sample: a pixel offset and its spatial weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tap {
    pub dx: isize,
    pub dy: isize,
    pub weight: f32,
}

/// Immutable table of kernel taps.
///
/// The first tap is always the unweighted centre `(0, 0, 1.0)`; the bilateral
/// filters use it as their reference sample.
#[derive(Debug, Clone, PartialEq)]
pub struct TapTable {
    radius: usize,
    spacing: usize,
    taps: Vec<Tap>,
}

impl TapTable {
    /// Builds the truncated Gaussian `exp(-3 (x^2 + y^2) / radius^2)` over
    /// `[-radius, radius]^2`, scaling offsets by `spacing`.
    ///
    /// The centre tap comes first, the rest follow with `x` as the outer loop.
    /// Fails with [`DenoiseError::ParameterOutOfRange`] past [`MAX_RADIUS`] or
    /// [`MAX_SPACING`].
    pub fn build(radius: usize, spacing: usize) -> Result<Self> {
        Self::check_bounds(radius, spacing)?;
        Ok(Self::generate(radius, spacing))
    }

    pub fn check_bounds(radius: usize, spacing: usize) -> Result<()> {
        if radius > MAX_RADIUS {
            return Err(DenoiseError::ParameterOutOfRange {
                name: "radius",
                value: radius,
                max: MAX_RADIUS,
            });
        }
        if spacing > MAX_SPACING {
            return Err(DenoiseError::ParameterOutOfRange {
                name: "spacing",
                value: spacing,
                max: MAX_SPACING,
            });
        }
        Ok(())
    }

    // Offsets stay within `MAX_RADIUS * MAX_SPACING` once the bounds hold.
    fn generate(radius: usize, spacing: usize) -> Self {
        let r = radius as isize;
        let step = spacing as isize;
        let mut taps = vec![Tap { dx: 0, dy: 0, weight: 1.0 }];

        for x in -r..=r {
            for y in -r..=r {
                if x == 0 && y == 0 {
                    continue;
                }
                let weight = (-3.0 * (x * x + y * y) as f32 / (r * r) as f32).exp();
                if weight < MIN_WEIGHT {
                    continue;
                }
                taps.push(Tap {
                    dx: x * step,
                    dy: y * step,
                    weight,
                });
            }
        }

        Self { radius, spacing, taps }
    }

    /// The default `(16, 2)` table, built on first use.
    pub fn shared() -> Arc<TapTable> {
        static SHARED: OnceLock<Arc<TapTable>> = OnceLock::new();
        SHARED
            .get_or_init(|| Arc::new(TapTable::generate(DEFAULT_RADIUS, DEFAULT_SPACING)))
            .clone()
    }

    pub fn center(&self) -> Tap {
        self.taps[0]
    }

    /// Every tap after the centre.
    pub fn neighbors(&self) -> &[Tap] {
        &self.taps[1..]
    }

    pub fn taps(&self) -> &[Tap] {
        &self.taps
    }

    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    pub fn spacing(&self) -> usize {
        self.spacing
    }
}
