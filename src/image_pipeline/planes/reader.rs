use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::planes::types::DecodedImage;

pub trait PlaneReader {
    fn read_planes(&self, data: &[u8], channels: &[usize]) -> Result<DecodedImage>;
}
