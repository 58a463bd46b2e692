//! Reader for headerless packed plane buffers produced by the renderer.

use tracing::debug;
use crate::image_pipeline::common::error::{DenoiseError, Result};
use crate::image_pipeline::planes::layout::{MAX_RESOLUTION, PlaneLayout};
use crate::image_pipeline::planes::reader::PlaneReader;
use crate::image_pipeline::planes::types::DecodedImage;

/// Decodes channel subsets out of a [`PlaneLayout`] buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackedPlaneReader {
    layout: PlaneLayout,
}

impl PackedPlaneReader {
    pub fn new(layout: PlaneLayout) -> Self {
        Self { layout }
    }

    /// Checks every requested channel against the buffer length before any
    /// sample is produced, so a short file never yields a partial image.
    ///
    /// Returns each channel's cursor offset. A channel whose last byte is not
    /// even addressable is reported at `usize::MAX`.
    fn validate(&self, data: &[u8], channels: &[usize]) -> Result<Vec<usize>> {
        channels
            .iter()
            .map(|&channel| {
                let out_of_range = |offset| DenoiseError::ChannelOutOfRange {
                    channel,
                    offset,
                    len: data.len(),
                };
                let last = self
                    .layout
                    .last_byte(channel)
                    .ok_or_else(|| out_of_range(usize::MAX))?;
                if last >= data.len() {
                    return Err(out_of_range(last));
                }
                self.layout.offset(channel).ok_or_else(|| out_of_range(usize::MAX))
            })
            .collect()
    }
}

impl PlaneReader for PackedPlaneReader {
    /// Decodes `channels` (in the given order) into a float image.
    ///
    /// Every pixel shares one byte cursor that advances by `sub_channels` per
    /// pixel; a channel's offset only steers the cursor into its plane group.
    /// Rows come out bottom-up: row 0 of the result is the last scanned row.
    fn read_planes(&self, data: &[u8], channels: &[usize]) -> Result<DecodedImage> {
        let resolution = self.layout.resolution;
        if resolution == 0 || resolution > MAX_RESOLUTION || channels.is_empty() {
            return Err(DenoiseError::InvalidDimensions(resolution, resolution));
        }

        debug!(
            "Decoding {} channel(s) {:?} from {} bytes",
            channels.len(),
            channels,
            data.len()
        );
        let offsets = self.validate(data, channels)?;
        let stride = self.layout.sub_channels;
        let row_len = resolution * channels.len();
        let mut samples = vec![0.0f32; resolution * row_len];

        for (scan_y, row) in samples.chunks_exact_mut(row_len).rev().enumerate() {
            for (x, pixel) in row.chunks_exact_mut(channels.len()).enumerate() {
                let index = (scan_y * resolution + x) * stride;
                for (sample, &offset) in pixel.iter_mut().zip(&offsets) {
                    *sample = data[index + offset] as f32 / 255.0;
                }
            }
        }

        debug!("Decoded image: {}x{}x{}", resolution, resolution, channels.len());

        DecodedImage::new(resolution, resolution, channels.len(), samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(resolution: usize) -> PackedPlaneReader {
        PackedPlaneReader::new(PlaneLayout::new(resolution))
    }

    #[test]
    fn test_constant_buffers_decode_exactly() {
        let layout = PlaneLayout::new(4);
        let channels = [0, 1, 2, 4, 5, 6, 8, 9];

        let zeros = vec![0u8; layout.group_stride().unwrap() * 3];
        let image = reader(4).read_planes(&zeros, &channels).unwrap();
        assert_eq!(image.channels, 8);
        assert!(image.data.iter().all(|&v| v == 0.0));

        let ones = vec![255u8; layout.group_stride().unwrap() * 3];
        let image = reader(4).read_planes(&ones, &channels).unwrap();
        assert!(image.data.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_rows_are_flipped() {
        // 2x2 buffer: scan row 0 is all 10s, scan row 1 is all 200s.
        let mut data = vec![10u8; 8];
        data.extend(vec![200u8; 8]);
        let image = reader(2).read_planes(&data, &[0]).unwrap();

        assert_eq!(image.pixel(0, 0), &[200.0 / 255.0]);
        assert_eq!(image.pixel(1, 0), &[200.0 / 255.0]);
        assert_eq!(image.pixel(0, 1), &[10.0 / 255.0]);
    }

    #[test]
    fn test_channel_order_is_preserved() {
        // 1x1 layout, one group: bytes are the sub-channel slots.
        let data = [10u8, 20, 30, 40];
        let image = reader(1).read_planes(&data, &[2, 0, 3]).unwrap();
        assert_eq!(image.pixel(0, 0), &[30.0 / 255.0, 10.0 / 255.0, 40.0 / 255.0]);
    }

    #[test]
    fn test_higher_groups_share_the_pixel_cursor() {
        let layout = PlaneLayout::new(2);
        let mut data = vec![0u8; layout.group_stride().unwrap() * 2];
        // Pixel 3 in scan order (x=1 of scan row 1), channel 5 -> group 1, slot 1.
        data[3 * 4 + layout.offset(5).unwrap()] = 255;
        let image = reader(2).read_planes(&data, &[5]).unwrap();

        // Scan row 1 becomes output row 0.
        assert_eq!(image.pixel(1, 0), &[1.0]);
        assert_eq!(image.pixel(0, 0), &[0.0]);
        assert_eq!(image.pixel(1, 1), &[0.0]);
    }

    #[test]
    fn test_missing_group_fails_without_partial_image() {
        let layout = PlaneLayout::new(4);
        let one_group = vec![7u8; layout.group_stride().unwrap()];
        let result = reader(4).read_planes(&one_group, &[0, 1, 2, 4]);

        match result {
            Err(DenoiseError::ChannelOutOfRange { channel, len, .. }) => {
                assert_eq!(channel, 4);
                assert_eq!(len, layout.group_stride().unwrap());
            }
            other => panic!("expected ChannelOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_group_fails() {
        let layout = PlaneLayout::new(4);
        let short = vec![0u8; layout.group_stride().unwrap() - 1];
        assert!(reader(4).read_planes(&short, &[0, 1, 2]).is_ok());
        assert!(matches!(
            reader(4).read_planes(&short, &[3]),
            Err(DenoiseError::ChannelOutOfRange { channel: 3, .. })
        ));
    }

    #[test]
    fn test_unaddressable_channel_is_out_of_range() {
        let one_group = vec![109u8; PlaneLayout::default().group_stride().unwrap()];
        let wrapping = 1usize << (usize::BITS - 18);

        for channel in [usize::MAX / 2, wrapping] {
            match PackedPlaneReader::default().read_planes(&one_group, &[0, channel]) {
                Err(DenoiseError::ChannelOutOfRange { channel: c, offset, len }) => {
                    assert_eq!(c, channel);
                    assert_eq!(offset, usize::MAX);
                    assert_eq!(len, one_group.len());
                }
                other => panic!("expected ChannelOutOfRange, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_oversized_resolution_is_rejected() {
        let huge = MAX_RESOLUTION + 1;
        assert!(matches!(
            reader(huge).read_planes(&[0u8; 16], &[0]),
            Err(DenoiseError::InvalidDimensions(r, _)) if r == huge
        ));
        assert!(matches!(
            reader(usize::MAX).read_planes(&[0u8; 16], &[0]),
            Err(DenoiseError::InvalidDimensions(..))
        ));
    }

    #[test]
    fn test_empty_request_is_rejected() {
        assert!(matches!(
            reader(2).read_planes(&[0u8; 16], &[]),
            Err(DenoiseError::InvalidDimensions(2, 2))
        ));
    }
}
