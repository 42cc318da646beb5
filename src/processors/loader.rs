// imgshrink/src/processors/loader.rs
use crate::core::DecodeError;
use crate::processors::classifier::has_any_suffix;
use image::{DynamicImage, GenericImageView, ImageReader, RgbaImage};
use psd::Psd;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

const PHOTOSHOP_EXTENSIONS: [&str; 2] = [".psd", ".psb"];

#[derive(Debug, Clone, Default)]
pub struct Loader;

impl Loader {
    pub fn new() -> Self {
        Self
    }

    /// Decode the file into memory. The handle is dropped before returning.
    pub fn load(&self, path: &Path) -> Result<DynamicImage, DecodeError> {
        log::debug!("Loading image from: {}", path.display());

        let is_photoshop = path
            .file_name()
            .is_some_and(|name| has_any_suffix(name, PHOTOSHOP_EXTENSIONS));
        let image = if is_photoshop {
            load_photoshop(path)?
        } else {
            load_raster(path)?
        };

        let (width, height) = image.dimensions();
        log::debug!(
            "Loaded image: {}x{} pixels, color: {:?}",
            width,
            height,
            image.color()
        );

        Ok(image)
    }
}

fn load_raster(path: &Path) -> Result<DynamicImage, DecodeError> {
    ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|source| DecodeError::Open {
            path: path.to_path_buf(),
            source,
        })?
        .decode()
        .map_err(|source| DecodeError::Image {
            path: path.to_path_buf(),
            source,
        })
}

/// Decode the flattened composite of a Photoshop document.
///
/// Fully opaque composites come back as RGB, the way they are stored.
fn load_photoshop(path: &Path) -> Result<DynamicImage, DecodeError> {
    let bytes = std::fs::read(path).map_err(|source| DecodeError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let psd_error = |message: String| DecodeError::Psd {
        path: path.to_path_buf(),
        message,
    };

    // the psd parser indexes straight into the buffer and can panic on
    // truncated input
    let decoded = panic::catch_unwind(AssertUnwindSafe(|| {
        Psd::from_bytes(&bytes).map(|psd| (psd.width(), psd.height(), psd.rgba()))
    }))
    .map_err(|_| psd_error("malformed document".to_string()))?;
    let (width, height, rgba) = decoded.map_err(|e| psd_error(e.to_string()))?;

    let composite = RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| psd_error(format!("composite does not cover {}x{} pixels", width, height)))?;

    if composite.pixels().all(|pixel| pixel[3] == u8::MAX) {
        Ok(DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(composite).to_rgb8()))
    } else {
        Ok(DynamicImage::ImageRgba8(composite))
    }
}
