//! Image processing pipeline module
//!
//! Decodes packed multi-plane render buffers, denoises them with a fixed
//! catalog of convolution filters and exports gamma-encoded previews.

pub mod common;
pub mod planes;
pub mod filter;
pub mod convolve;
pub mod config;
pub mod metrics;
pub mod preview;
pub mod conversions;

pub use common::{
    DenoiseError,
    Result,
    PipelineTimings,
};

pub use planes::{
    DecodedImage,
    PlaneLayout,
    PlaneReader,
    PackedPlaneReader,
};

pub use filter::{
    FilterKind,
    PixelFilter,
    Tap,
    TapTable,
};

pub use convolve::{
    Convolver,
    LogProgress,
    ProgressSink,
};

pub use config::{
    DenoiseConfig,
    DenoiseConfigBuilder,
};

pub use metrics::{
    mean_squared_error,
    ReferenceScore,
};

pub use preview::{
    PreviewWriter,
    TiffCompression,
    TiffPreviewWriter,
};

pub use conversions::{
    DenoisePipeline,
    read_file,
};
