use crate::image_pipeline::common::vector::{add, take};
use crate::image_pipeline::filter::types::PixelFilter;
use crate::image_pipeline::planes::DecodedImage;

const HALF_WIDTH: isize = 2;

/// 25 neighbourhood samples plus the centre once more.
const NORMALIZER: f32 = 26.0;

/// 5x5 box blur over colour images.
///
/// The centre sample is accumulated twice, once up front and once as part of
/// the neighbourhood, and the sum is divided by 26.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxBlur;

impl PixelFilter for BoxBlur {
    fn name(&self) -> &'static str {
        "box"
    }

    fn input_channels(&self) -> usize {
        3
    }

    fn apply(&self, image: &DecodedImage, x: usize, y: usize, out: &mut [f32]) {
        let (cx, cy) = (x as isize, y as isize);
        let mut sum: [f32; 3] = take(image.pixel(x, y), 0);

        for dx in -HALF_WIDTH..=HALF_WIDTH {
            for dy in -HALF_WIDTH..=HALF_WIDTH {
                sum = add(sum, take(image.sample(cx + dx, cy + dy), 0));
            }
        }

        out.copy_from_slice(&sum.map(|v| v / NORMALIZER));
    }
}
