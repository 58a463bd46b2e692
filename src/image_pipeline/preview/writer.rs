use std::io::Write;
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::config::DenoiseConfig;
use crate::image_pipeline::planes::DecodedImage;

pub trait PreviewWriter {
    fn write_preview(&self, image: &DecodedImage, output: &mut dyn Write, config: &DenoiseConfig) -> Result<()>;
}
