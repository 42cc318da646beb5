// imgshrink/src/processors/mod.rs
mod batch;
mod classifier;
mod codec;
mod compressor;
mod loader;
mod resizer;

pub use batch::{BatchProcessor, DirectoryListing};
pub use classifier::{Classification, ExtensionSet, PathClassifier, STANDARD_EXTENSIONS};
pub use codec::{Codec, ImageCodec};
pub use compressor::{detect_format, Compressor};
pub use loader::Loader;
pub use resizer::{convert_color_model, filter_type, fit_within, Resizer};
