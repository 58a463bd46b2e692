//! Convolution driver
//!
//! Evaluates a [`PixelFilter`] at every pixel of a source image into a fresh
//! output image. Rows are processed in bands; the cancellation flag is checked
//! between bands and progress is reported once per `progress_interval`
//! completed rows. Serial bands are one interval long. Parallel bands are
//! sized to the rayon pool, rounded up to whole intervals.

use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::image_pipeline::common::error::{DenoiseError, Result};
use crate::image_pipeline::filter::PixelFilter;
use crate::image_pipeline::planes::DecodedImage;

/// Rows between progress reports.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 10;

/// Rows each pool thread gets per parallel band.
#[cfg(feature = "parallel")]
const ROWS_PER_THREAD: usize = 4;

/// Receives advisory row progress: `row` is the number of rows completed so
/// far. Errors are logged and otherwise ignored.
pub trait ProgressSink {
    fn report(&mut self, row: usize, total_rows: usize) -> Result<()>;
}

impl<F> ProgressSink for F
where
    F: FnMut(usize, usize) -> Result<()>,
{
    fn report(&mut self, row: usize, total_rows: usize) -> Result<()> {
        self(row, total_rows)
    }
}

/// Reports progress as `info` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&mut self, row: usize, total_rows: usize) -> Result<()> {
        info!(row, total_rows, "Filtering");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Convolver {
    pub progress_interval: usize,
    pub parallel: bool,
}

impl Default for Convolver {
    fn default() -> Self {
        Self {
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            parallel: true,
        }
    }
}

impl Convolver {
    pub fn new(progress_interval: usize, parallel: bool) -> Self {
        Self {
            progress_interval,
            parallel,
        }
    }

    /// Applies `filter` to every pixel of `image`.
    pub fn convolve(&self, image: &DecodedImage, filter: &dyn PixelFilter) -> Result<DecodedImage> {
        self.convolve_with(image, filter, None, None)
    }

    /// Like [`Convolver::convolve`], reporting progress to `progress` and
    /// stopping with [`DenoiseError::Cancelled`] once `cancel` is set.
    pub fn convolve_with(
        &self,
        image: &DecodedImage,
        filter: &dyn PixelFilter,
        mut progress: Option<&mut dyn ProgressSink>,
        cancel: Option<&AtomicBool>,
    ) -> Result<DecodedImage> {
        if image.channels != filter.input_channels() {
            return Err(DenoiseError::ChannelMismatch {
                stage: filter.name(),
                expected: filter.input_channels(),
                got: image.channels,
            });
        }

        let out_channels = filter.output_channels();
        let row_len = image.width * out_channels;
        let interval = self.progress_interval.max(1);
        let band_rows = self.band_rows(interval);
        let mut data = vec![0.0f32; image.height * row_len];

        debug!(
            "Convolving {}x{} with '{}' ({} rows per band, parallel={})",
            image.width,
            image.height,
            filter.name(),
            band_rows,
            self.parallel
        );

        for (band_index, band) in data.chunks_mut(band_rows * row_len).enumerate() {
            let first_row = band_index * band_rows;
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                return Err(DenoiseError::Cancelled { row: first_row });
            }

            self.filter_band(image, filter, band, first_row, row_len);

            let Some(sink) = progress.as_deref_mut() else {
                continue;
            };
            let done = (first_row + band_rows).min(image.height);
            let mut row = first_row;
            while row < done {
                row = (row + interval).min(done);
                if let Err(e) = sink.report(row, image.height) {
                    warn!("Ignoring progress sink failure at row {}: {}", row, e);
                }
            }
        }

        DecodedImage::new(image.width, image.height, out_channels, data)
    }

    /// Rows filtered between two cancellation checks. Always a whole number
    /// of progress intervals.
    fn band_rows(&self, interval: usize) -> usize {
        #[cfg(feature = "parallel")]
        if self.parallel {
            let rows = rayon::current_num_threads().max(1) * ROWS_PER_THREAD;
            return rows.div_ceil(interval) * interval;
        }

        interval
    }

    fn filter_band(
        &self,
        image: &DecodedImage,
        filter: &dyn PixelFilter,
        band: &mut [f32],
        first_row: usize,
        row_len: usize,
    ) {
        let out_channels = filter.output_channels();
        let filter_row = |(offset, row): (usize, &mut [f32])| {
            let y = first_row + offset;
            for (x, pixel) in row.chunks_exact_mut(out_channels).enumerate() {
                filter.apply(image, x, y, pixel);
            }
        };

        #[cfg(feature = "parallel")]
        if self.parallel {
            band.par_chunks_mut(row_len).enumerate().for_each(filter_row);
            return;
        }

        band.chunks_mut(row_len).enumerate().for_each(filter_row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::image_pipeline::filter::{FilterKind, TapTable};

    /// Writes the pixel coordinates, for checking iteration order and placement.
    struct Coordinates;

    impl PixelFilter for Coordinates {
        fn name(&self) -> &'static str {
            "coordinates"
        }

        fn input_channels(&self) -> usize {
            1
        }

        fn output_channels(&self) -> usize {
            2
        }

        fn apply(&self, _image: &DecodedImage, x: usize, y: usize, out: &mut [f32]) {
            out[0] = x as f32;
            out[1] = y as f32;
        }
    }

    fn noisy_geometry(width: usize, height: usize) -> DecodedImage {
        let data = (0..width * height * 8)
            .map(|i| ((i as u64 * 2_654_435_761) % 255) as f32 / 255.0)
            .collect();
        DecodedImage::new(width, height, 8, data).unwrap()
    }

    fn color_part(image: &DecodedImage) -> DecodedImage {
        let data = image.data.chunks(8).flat_map(|p| p[..3].to_vec()).collect();
        DecodedImage::new(image.width, image.height, 3, data).unwrap()
    }

    #[test]
    fn test_shape_is_preserved() {
        let geometry = noisy_geometry(13, 7);
        let color = color_part(&geometry);
        let taps = Arc::new(TapTable::build(3, 2).unwrap());

        for kind in [FilterKind::Box, FilterKind::ColorBilateral, FilterKind::DepthBilateral] {
            let filter = kind.build(&taps).unwrap();
            let source = if kind == FilterKind::DepthBilateral { &geometry } else { &color };
            let out = Convolver::default().convolve(source, filter.as_ref()).unwrap();
            assert_eq!((out.width, out.height, out.channels), (13, 7, 3), "{kind}");
        }
    }

    #[test]
    fn test_every_pixel_written_in_place() {
        let image = DecodedImage::filled(5, 23, &[0.0]).unwrap();
        for parallel in [false, true] {
            let out = Convolver::new(4, parallel).convolve(&image, &Coordinates).unwrap();
            for y in 0..23 {
                for x in 0..5 {
                    assert_eq!(out.pixel(x, y), &[x as f32, y as f32]);
                }
            }
        }
    }

    #[test]
    fn test_parallel_matches_serial() {
        let geometry = noisy_geometry(17, 21);
        let filter = FilterKind::DepthBilateral
            .build(&Arc::new(TapTable::build(3, 1).unwrap()))
            .unwrap();

        let serial = Convolver::new(10, false).convolve(&geometry, filter.as_ref()).unwrap();
        let parallel = Convolver::new(10, true).convolve(&geometry, filter.as_ref()).unwrap();
        assert_eq!(serial, parallel);
    }

    #[test]
    fn test_source_is_not_modified() {
        let geometry = noisy_geometry(9, 9);
        let before = geometry.clone();
        let filter = FilterKind::DepthBilateral
            .build(&Arc::new(TapTable::build(2, 1).unwrap()))
            .unwrap();
        Convolver::default().convolve(&geometry, filter.as_ref()).unwrap();
        assert_eq!(geometry, before);
    }

    #[test]
    fn test_progress_every_interval() {
        let image = DecodedImage::filled(4, 25, &[0.0]).unwrap();
        let mut rows = Vec::new();
        let mut sink = |row: usize, total: usize| -> Result<()> {
            assert_eq!(total, 25);
            rows.push(row);
            Ok(())
        };

        Convolver::new(10, true)
            .convolve_with(&image, &Coordinates, Some(&mut sink), None)
            .unwrap();
        assert_eq!(rows, [10, 20, 25]);
    }

    #[test]
    fn test_progress_is_the_same_serial_and_parallel() {
        let image = DecodedImage::filled(3, 50, &[0.0]).unwrap();
        let run = |parallel: bool| {
            let mut rows = Vec::new();
            let mut sink = |row: usize, _total: usize| -> Result<()> {
                rows.push(row);
                Ok(())
            };
            Convolver::new(3, parallel)
                .convolve_with(&image, &Coordinates, Some(&mut sink), None)
                .unwrap();
            rows
        };

        let expected: Vec<usize> = (3..50).step_by(3).chain([50]).collect();
        assert_eq!(run(false), expected);
        assert_eq!(run(true), expected);
    }

    #[test]
    fn test_band_size_is_independent_of_progress_interval() {
        assert_eq!(Convolver::new(10, false).band_rows(10), 10);

        #[cfg(feature = "parallel")]
        {
            let threads = rayon::current_num_threads();
            for interval in [1, 7, 10, 1000] {
                let rows = Convolver::new(interval, true).band_rows(interval);
                assert_eq!(rows % interval, 0);
                assert!(rows >= threads * ROWS_PER_THREAD);
                assert!(rows < threads * ROWS_PER_THREAD + interval);
            }
        }
    }

    #[test]
    fn test_failing_progress_sink_does_not_abort() {
        let image = DecodedImage::filled(4, 12, &[0.0]).unwrap();
        let expected = Convolver::default().convolve(&image, &Coordinates).unwrap();

        let mut calls = 0;
        let mut sink = |_row: usize, _total: usize| -> Result<()> {
            calls += 1;
            Err(DenoiseError::ProgressReport("sink closed".to_string()))
        };
        let out = Convolver::new(5, false)
            .convolve_with(&image, &Coordinates, Some(&mut sink), None)
            .unwrap();

        assert_eq!(out, expected);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_cancellation_between_bands() {
        let image = DecodedImage::filled(4, 30, &[0.0]).unwrap();

        let cancelled = AtomicBool::new(true);
        let result = Convolver::default().convolve_with(&image, &Coordinates, None, Some(&cancelled));
        assert!(matches!(result, Err(DenoiseError::Cancelled { row: 0 })));

        let flag = AtomicBool::new(false);
        let mut sink = |row: usize, _total: usize| -> Result<()> {
            if row == 10 {
                flag.store(true, Ordering::Relaxed);
            }
            Ok(())
        };
        // Ten rows are done when the flag goes up; the next band never starts.
        let result = Convolver::new(10, false).convolve_with(&image, &Coordinates, Some(&mut sink), Some(&flag));
        assert!(matches!(result, Err(DenoiseError::Cancelled { row: 10 })));
    }

    #[test]
    fn test_channel_mismatch() {
        let color = DecodedImage::filled(4, 4, &[0.1, 0.2, 0.3]).unwrap();
        let filter = FilterKind::DepthBilateral.build(&TapTable::shared()).unwrap();
        let result = Convolver::default().convolve(&color, filter.as_ref());
        assert!(matches!(
            result,
            Err(DenoiseError::ChannelMismatch { stage: "depth_bilinear", expected: 8, got: 3 })
        ));
    }
}
