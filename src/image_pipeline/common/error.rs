use thiserror::Error;

#[derive(Error, Debug)]
pub enum DenoiseError {
    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Channel {channel} reads byte {offset}, past the end of a {len}-byte buffer")]
    ChannelOutOfRange { channel: usize, offset: usize, len: usize },

    #[error("Stage '{stage}' expects {expected} channels per pixel, got {got}")]
    ChannelMismatch { stage: &'static str, expected: usize, got: usize },

    #[error("Failed to encode preview image: {0}")]
    EncodeError(String),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("{name} = {value} is out of range (maximum {max})")]
    ParameterOutOfRange { name: &'static str, value: usize, max: usize },

    #[error("Progress report failed: {0}")]
    ProgressReport(String),

    #[error("Convolution cancelled before row {row}")]
    Cancelled { row: usize },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DenoiseError>;
