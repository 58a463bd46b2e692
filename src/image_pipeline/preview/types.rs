//! Preview encoding types

/// Display curve exponent applied before quantization.
pub const DEFAULT_GAMMA: f32 = 0.4;

/// TIFF compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    #[default]
    None,
    /// LZW compression
    Lzw,
    /// Deflate compression, balanced level
    Deflate,
}

impl std::str::FromStr for TiffCompression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(TiffCompression::None),
            "lzw" => Ok(TiffCompression::Lzw),
            "deflate" => Ok(TiffCompression::Deflate),
            other => Err(format!("unknown compression '{}', expected none, lzw or deflate", other)),
        }
    }
}

/// Display gamma curve `value^exponent`.
///
/// Filtered values can dip slightly below zero where the power curve is
/// undefined; those display as black.
pub fn gamma(value: f32, exponent: f32) -> f32 {
    value.max(0.0).powf(exponent)
}
