use std::io::Write;
use tracing::debug;
use crate::image_pipeline::common::error::{DenoiseError, Result};
use crate::image_pipeline::config::DenoiseConfig;
use crate::image_pipeline::planes::DecodedImage;
use crate::image_pipeline::preview::types::{gamma, TiffCompression};
use crate::image_pipeline::preview::writer::PreviewWriter;

/// Writes 16-bit RGB TIFF previews.
pub struct TiffPreviewWriter;

impl TiffPreviewWriter {
    /// Gamma-encodes and quantizes samples. Clamping to the displayable range
    /// happens only here.
    pub fn encode_samples(image: &DecodedImage, exponent: f32) -> Vec<u16> {
        image
            .data
            .iter()
            .map(|&v| (gamma(v, exponent).clamp(0.0, 1.0) * u16::MAX as f32).round() as u16)
            .collect()
    }
}

impl PreviewWriter for TiffPreviewWriter {
    fn write_preview(&self, image: &DecodedImage, output: &mut dyn Write, config: &DenoiseConfig) -> Result<()> {
        if image.channels != 3 {
            return Err(DenoiseError::ChannelMismatch {
                stage: "preview",
                expected: 3,
                got: image.channels,
            });
        }

        debug!("Encoding TIFF preview: {}x{}", image.width, image.height);

        let samples = Self::encode_samples(image, config.gamma);
        let mut buffer = Vec::new();

        let compression = match config.compression {
            TiffCompression::None => tiff::encoder::Compression::Uncompressed,
            TiffCompression::Lzw => tiff::encoder::Compression::Lzw,
            TiffCompression::Deflate => tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Balanced),
        };

        tiff::encoder::TiffEncoder::new(std::io::Cursor::new(&mut buffer))
            .map_err(|e| DenoiseError::EncodeError(e.to_string()))?
            .with_compression(compression)
            .write_image::<tiff::encoder::colortype::RGB16>(
                image.width as u32,
                image.height as u32,
                &samples,
            )
            .map_err(|e| DenoiseError::EncodeError(e.to_string()))?;

        output.write_all(&buffer)?;

        debug!("TIFF encoding complete, {} bytes", buffer.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_samples() {
        let image = DecodedImage::new(1, 1, 3, vec![0.0, 1.0, 1.5]).unwrap();
        assert_eq!(TiffPreviewWriter::encode_samples(&image, 0.4), vec![0, 65535, 65535]);

        let half = DecodedImage::new(1, 1, 3, vec![0.5, -0.2, 0.25]).unwrap();
        let encoded = TiffPreviewWriter::encode_samples(&half, 1.0);
        assert_eq!(encoded, vec![32768, 0, 16384]);
    }

    #[test]
    fn test_writes_readable_tiff() {
        let image = DecodedImage::filled(4, 3, &[0.25, 0.5, 1.0]).unwrap();
        let mut output = Vec::new();
        TiffPreviewWriter
            .write_preview(&image, &mut output, &DenoiseConfig::default())
            .unwrap();

        let mut decoder = tiff::decoder::Decoder::new(std::io::Cursor::new(output)).unwrap();
        assert_eq!(decoder.dimensions().unwrap(), (4, 3));
        match decoder.read_image().unwrap() {
            tiff::decoder::DecodingResult::U16(data) => {
                assert_eq!(data.len(), 4 * 3 * 3);
                assert_eq!(data[2], 65535);
            }
            _ => panic!("expected 16-bit samples"),
        }
    }

    #[test]
    fn test_rejects_non_rgb() {
        let image = DecodedImage::filled(2, 2, &[0.0; 8]).unwrap();
        let result = TiffPreviewWriter.write_preview(&image, &mut Vec::new(), &DenoiseConfig::default());
        assert!(matches!(result, Err(DenoiseError::ChannelMismatch { stage: "preview", expected: 3, got: 8 })));
    }
}
