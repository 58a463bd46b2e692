use tracing::{info, instrument};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::image_pipeline::{
    common::error::{DenoiseError, Result},
    common::timing::{PipelineTimings, Timer},
    config::DenoiseConfig,
    convolve::{Convolver, LogProgress},
    filter::{TapTable, types::COLOR_CHANNELS},
    metrics::{mean_squared_error, ReferenceScore},
    planes::{DecodedImage, PackedPlaneReader, PlaneReader},
    preview::{PreviewWriter, TiffPreviewWriter},
};

pub struct DenoisePipeline<R: PlaneReader, W: PreviewWriter> {
    reader: R,
    writer: W,
    config: DenoiseConfig,
    taps: Arc<TapTable>,
    cancel: Option<Arc<AtomicBool>>,
}

impl DenoisePipeline<PackedPlaneReader, TiffPreviewWriter> {
    pub fn new(config: DenoiseConfig) -> Result<Self> {
        Self::with_custom(PackedPlaneReader::new(config.layout), TiffPreviewWriter, config)
    }
}

impl<R: PlaneReader, W: PreviewWriter> DenoisePipeline<R, W> {
    /// Fails if `config` names a layout or kernel out of range.
    pub fn with_custom(reader: R, writer: W, config: DenoiseConfig) -> Result<Self> {
        config.validate()?;
        let taps = Self::taps_for(&config)?;
        Ok(Self {
            reader,
            writer,
            config,
            taps,
            cancel: None,
        })
    }

    /// The default kernel is shared process-wide; other parameters get their
    /// own table, built once per configuration.
    fn taps_for(config: &DenoiseConfig) -> Result<Arc<TapTable>> {
        let shared = TapTable::shared();
        if (config.tap_radius, config.tap_spacing) == (shared.radius(), shared.spacing()) {
            Ok(shared)
        } else {
            TapTable::build(config.tap_radius, config.tap_spacing).map(Arc::new)
        }
    }

    /// Flag checked between row bands; setting it aborts the running filter.
    pub fn set_cancel_flag(&mut self, flag: Arc<AtomicBool>) {
        self.cancel = Some(flag);
    }

    pub fn decode(&self, input_data: &[u8]) -> Result<DecodedImage> {
        self.reader.read_planes(input_data, &self.config.channels())
    }

    /// Runs the configured filter over an already decoded image.
    pub fn filter(&self, image: &DecodedImage) -> Result<DecodedImage> {
        let Some(filter) = self.config.filter.build(&self.taps) else {
            return Ok(image.clone());
        };

        info!(
            filter = filter.name(),
            taps = self.taps.len(),
            "Filtering {}x{} image",
            image.width,
            image.height
        );

        let convolver = Convolver::new(self.config.progress_interval, self.config.parallel);
        let mut progress = LogProgress;
        convolver.convolve_with(
            image,
            filter.as_ref(),
            Some(&mut progress),
            self.cancel.as_deref(),
        )
    }

    /// Decodes and filters one buffer.
    #[instrument(skip(self, input_data), fields(input_size = input_data.len()))]
    pub fn process(&self, input_data: &[u8]) -> Result<DecodedImage> {
        let mut timings = PipelineTimings::new();
        self.process_timed(input_data, &mut timings)
    }

    fn process_timed(&self, input_data: &[u8], timings: &mut PipelineTimings) -> Result<DecodedImage> {
        let image = {
            let _span = tracing::info_span!("decode").entered();
            let timer = Timer::start("decode");
            let image = self.decode(input_data)?;
            timer.record(timings);
            image
        };

        let _span = tracing::info_span!("filter", filter = %self.config.filter).entered();
        let timer = Timer::start("filter");
        let filtered = self.filter(&image)?;
        timer.record(timings);
        Ok(filtered)
    }

    pub fn write_preview(&self, image: &DecodedImage, output: &mut dyn Write) -> Result<()> {
        let _span = tracing::info_span!("encode_preview").entered();
        self.writer.write_preview(image, output, &self.config)
    }

    pub fn convert(&self, input_data: &[u8], output: &mut dyn Write) -> Result<()> {
        self.convert_with_timings(input_data, output).map(|_| ())
    }

    #[instrument(skip(self, input_data, output), fields(input_size = input_data.len()))]
    pub fn convert_with_timings(
        &self,
        input_data: &[u8],
        output: &mut dyn Write,
    ) -> Result<PipelineTimings> {
        let mut timings = PipelineTimings::new();
        info!("Starting denoise with filter {}", self.config.filter);

        let filtered = self.process_timed(input_data, &mut timings)?;

        let timer = Timer::start("encode_preview");
        self.write_preview(&filtered, output)?;
        timer.record(&mut timings);

        info!(
            width = filtered.width,
            height = filtered.height,
            "Denoise complete in {:.3}ms",
            timings.total_duration().as_secs_f64() * 1000.0
        );
        Ok(timings)
    }

    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
    ) -> Result<()> {
        self.convert_file_with_timings(input_path, output_path).map(|_| ())
    }

    #[instrument(skip(self, input_path, output_path))]
    pub fn convert_file_with_timings<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
    ) -> Result<PipelineTimings> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();
        let mut timings = PipelineTimings::new();

        info!(
            input = %input_path.display(),
            output = %output_path.display(),
            "Converting file"
        );

        let timer = Timer::start("read_input_file");
        let input_data = read_file(input_path)?;
        timer.record(&mut timings);

        // Filter before creating the output so a bad input leaves nothing behind.
        let filtered = self.process_timed(&input_data, &mut timings)?;

        let timer = Timer::start("encode_preview");
        let mut output_file = std::fs::File::create(output_path).map_err(|e| {
            DenoiseError::OutputWriteError(format!("{}: {}", output_path.display(), e))
        })?;
        self.write_preview(&filtered, &mut output_file)?;
        timer.record(&mut timings);

        Ok(timings)
    }

    /// Scores the colour plane of `input_data` and of `filtered` against a
    /// reference buffer with the same layout.
    pub fn score_against_reference(
        &self,
        input_data: &[u8],
        reference_data: &[u8],
        filtered: &DecodedImage,
    ) -> Result<ReferenceScore> {
        let input = self.reader.read_planes(input_data, &COLOR_CHANNELS)?;
        let reference = self.reader.read_planes(reference_data, &COLOR_CHANNELS)?;

        let score = ReferenceScore {
            input_mse: mean_squared_error(&input, &reference)?,
            output_mse: mean_squared_error(filtered, &reference)?,
        };
        info!(
            input_mse = score.input_mse,
            output_mse = score.output_mse,
            "Reference comparison"
        );
        Ok(score)
    }

    pub fn config(&self) -> &DenoiseConfig {
        &self.config
    }

    /// Replaces the configuration. The reader keeps the layout it was
    /// constructed with. A rejected config leaves the pipeline unchanged.
    pub fn set_config(&mut self, config: DenoiseConfig) -> Result<()> {
        config.validate()?;
        if (config.tap_radius, config.tap_spacing) != (self.config.tap_radius, self.config.tap_spacing) {
            self.taps = Self::taps_for(&config)?;
        }
        self.config = config;
        Ok(())
    }

    pub fn taps(&self) -> &TapTable {
        &self.taps
    }
}

pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    let _span = tracing::info_span!("read_input_file").entered();
    std::fs::read(path)
        .map_err(|e| DenoiseError::InputReadError(format!("{}: {}", path.display(), e)))
}
