//! Byte layout of packed plane buffers

/// Side length of the square buffers written by the renderer.
pub const DEFAULT_RESOLUTION: usize = 512;

/// Interleaved byte channels per plane group.
pub const DEFAULT_SUB_CHANNELS: usize = 4;

/// Largest side length a reader accepts.
pub const MAX_RESOLUTION: usize = 16_384;

/// Geometry of a packed multi-plane buffer.
///
/// Nothing in the file describes its own shape, so both values are caller
/// conventions. The number of plane groups is implied by the highest channel
/// a caller asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneLayout {
    /// Width and height of every plane group in pixels
    pub resolution: usize,
    /// Interleaved byte channels per pixel within one group
    pub sub_channels: usize,
}

impl Default for PlaneLayout {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            sub_channels: DEFAULT_SUB_CHANNELS,
        }
    }
}

impl PlaneLayout {
    pub fn new(resolution: usize) -> Self {
        Self {
            resolution,
            ..Self::default()
        }
    }

    /// Pixels per plane group, or `None` if the count overflows `usize`.
    pub fn pixel_count(&self) -> Option<usize> {
        self.resolution.checked_mul(self.resolution)
    }

    /// Size in bytes of one plane group.
    pub fn group_stride(&self) -> Option<usize> {
        self.pixel_count()?.checked_mul(self.sub_channels)
    }

    /// Byte offset of `channel` relative to a pixel's cursor.
    ///
    /// `channel / sub_channels` selects the plane group, `channel % sub_channels`
    /// the byte within the pixel's interleaved slot. `None` when the offset is
    /// not addressable.
    pub fn offset(&self, channel: usize) -> Option<usize> {
        let group = channel.checked_div(self.sub_channels)?;
        group
            .checked_mul(self.group_stride()?)?
            .checked_add(channel % self.sub_channels)
    }

    /// Index of the last byte read for `channel` over a full scan.
    pub fn last_byte(&self, channel: usize) -> Option<usize> {
        self.pixel_count()?
            .checked_sub(1)?
            .checked_mul(self.sub_channels)?
            .checked_add(self.offset(channel)?)
    }

    /// Smallest buffer length able to serve every channel in `channels`.
    pub fn required_len(&self, channels: &[usize]) -> Option<usize> {
        channels.iter().try_fold(0, |len: usize, &c| {
            Some(len.max(self.last_byte(c)?.checked_add(1)?))
        })
    }
}
