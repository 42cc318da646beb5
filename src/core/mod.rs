// imgshrink/src/core/mod.rs
pub mod processor;
pub mod report;

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use processor::ImageProcessor;
pub use report::{RunReporter, RunStats, RunSummary};

/// Resampling filter used when an image has to be shrunk.
///
/// Ordered from fastest/lowest quality to slowest/highest quality; the
/// command line selects one by index (0..=3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResampleFilter {
    #[default]
    Nearest,
    Bilinear,
    Bicubic,
    Lanczos3,
}

impl ResampleFilter {
    pub const ALL: [ResampleFilter; 4] = [
        ResampleFilter::Nearest,
        ResampleFilter::Bilinear,
        ResampleFilter::Bicubic,
        ResampleFilter::Lanczos3,
    ];

    pub fn index(self) -> u8 {
        match self {
            ResampleFilter::Nearest => 0,
            ResampleFilter::Bilinear => 1,
            ResampleFilter::Bicubic => 2,
            ResampleFilter::Lanczos3 => 3,
        }
    }
}

impl TryFrom<u8> for ResampleFilter {
    type Error = ImageToolError;

    fn try_from(index: u8) -> Result<Self> {
        Self::ALL.get(index as usize).copied().ok_or_else(|| {
            ImageToolError::InvalidParameter(format!(
                "Filter index must be between 0 and 3, got {}",
                index
            ))
        })
    }
}

impl fmt::Display for ResampleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResampleFilter::Nearest => "Nearest",
            ResampleFilter::Bilinear => "Bilinear",
            ResampleFilter::Bicubic => "Bicubic",
            ResampleFilter::Lanczos3 => "Lanczos3",
        };
        f.write_str(name)
    }
}

/// Pixel layout an image is normalized to before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorModel {
    Rgb,
    Rgba,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertConfig {
    /// Cap for the longest side, in pixels.
    pub max_dimension: u32,
    pub dpi: u16,
    pub filter: ResampleFilter,
    pub quality: u8,
    pub optimize: bool,
    pub normalize_color_space: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            max_dimension: 1000,
            dpi: 72,
            filter: ResampleFilter::Nearest,
            quality: 80,
            optimize: true,
            normalize_color_space: false,
        }
    }
}

impl ConvertConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_dimension == 0 || self.max_dimension > 10_000 {
            return Err(ImageToolError::InvalidParameter(
                "Max size must be between 1 and 10000 pixels".to_string(),
            ));
        }

        if self.dpi == 0 || self.dpi > 1000 {
            return Err(ImageToolError::InvalidParameter(
                "DPI must be between 1 and 1000".to_string(),
            ));
        }

        if self.quality == 0 || self.quality > 100 {
            return Err(ImageToolError::InvalidParameter(
                "Quality must be between 1 and 100".to_string(),
            ));
        }

        Ok(())
    }

    pub fn encode_settings(&self) -> EncodeSettings {
        EncodeSettings {
            dpi: self.dpi,
            quality: self.quality,
            optimize: self.optimize,
        }
    }
}

/// Parameters handed to the encoder for every written file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeSettings {
    pub dpi: u16,
    pub quality: u8,
    pub optimize: bool,
}

/// A file as seen by the walker: containing directory plus bare name.
///
/// The name is kept as the raw OS string so files whose names are not valid
/// UTF-8 can still be reopened; it is only rendered lossily for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub directory: PathBuf,
    pub file_name: OsString,
}

impl FileRecord {
    pub fn new(directory: impl Into<PathBuf>, file_name: impl Into<OsString>) -> Self {
        Self {
            directory: directory.into(),
            file_name: file_name.into(),
        }
    }

    pub fn from_path(path: &Path) -> Self {
        let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let file_name = path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        Self { directory, file_name }
    }

    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

/// Result of handing one file to the pipeline.
#[derive(Debug)]
pub enum ConversionOutcome {
    Converted { output: PathBuf, resized: bool },
    Failed { file: FileRecord, cause: TransformError },
    Skipped(FileRecord),
}

impl ConversionOutcome {
    pub fn is_converted(&self) -> bool {
        matches!(self, ConversionOutcome::Converted { .. })
    }
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to decode Photoshop document {path}: {message}")]
    Psd { path: PathBuf, message: String },
}

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Failed to encode {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode PNG {path}: {source}")]
    Png {
        path: PathBuf,
        #[source]
        source: png::EncodingError,
    },

    #[error("PNG optimization failed for {path}: {message}")]
    Optimize { path: PathBuf, message: String },

    #[error("Unsupported output format for {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Wrote {output} but failed to remove {path}: {source}")]
    RemoveOriginal {
        path: PathBuf,
        output: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a single file ended up in the corrupted bucket.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

#[derive(Error, Debug)]
pub enum ImageToolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to scan directory tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, ImageToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_index_round_trips() {
        for filter in ResampleFilter::ALL {
            assert_eq!(ResampleFilter::try_from(filter.index()).unwrap(), filter);
        }
    }

    #[test]
    fn filter_index_out_of_range_is_rejected() {
        assert!(matches!(
            ResampleFilter::try_from(4),
            Err(ImageToolError::InvalidParameter(_))
        ));
    }

    #[test]
    fn default_config_matches_cli_defaults() {
        let config = ConvertConfig::default();
        assert_eq!(config.max_dimension, 1000);
        assert_eq!(config.dpi, 72);
        assert_eq!(config.filter, ResampleFilter::Nearest);
        assert_eq!(config.quality, 80);
        assert!(config.optimize);
        assert!(!config.normalize_color_space);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_rejects_out_of_range_values() {
        let bad = [
            ConvertConfig { max_dimension: 0, ..Default::default() },
            ConvertConfig { max_dimension: 10_001, ..Default::default() },
            ConvertConfig { dpi: 0, ..Default::default() },
            ConvertConfig { dpi: 1001, ..Default::default() },
            ConvertConfig { quality: 0, ..Default::default() },
            ConvertConfig { quality: 101, ..Default::default() },
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{:?} should be rejected", config);
        }
    }

    #[test]
    fn file_record_splits_path() {
        let record = FileRecord::from_path(Path::new("/photos/2019/b.tiff"));
        assert_eq!(record.directory, PathBuf::from("/photos/2019"));
        assert_eq!(record.file_name, "b.tiff");
        assert_eq!(record.path(), PathBuf::from("/photos/2019/b.tiff"));
    }

    #[cfg(unix)]
    #[test]
    fn file_record_keeps_non_utf8_name() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let name = OsStr::from_bytes(b"caf\xe9.jpg");
        let path = Path::new("/photos").join(name);
        let record = FileRecord::from_path(&path);
        assert_eq!(record.file_name.as_os_str(), name);
        assert_eq!(record.path(), path);
    }
}
