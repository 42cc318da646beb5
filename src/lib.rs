mod cli;
pub mod core;
pub mod processors;
pub mod utils;

pub use cli::Cli;
pub use self::core::{
    ColorModel, ConversionOutcome, ConvertConfig, DecodeError, EncodeError,
    EncodeSettings, FileRecord, ImageProcessor, ImageToolError, ResampleFilter, Result,
    RunReporter, RunStats, RunSummary, TransformError,
};
pub use processors::{
    BatchProcessor, Codec, Compressor, ExtensionSet, ImageCodec, Loader, PathClassifier, Resizer,
};
pub use utils::{format_elapsed, format_file_size, plural_suffix};

// Re-export commonly used types
pub use image::DynamicImage;
