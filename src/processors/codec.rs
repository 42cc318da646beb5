// imgshrink/src/processors/codec.rs
//! Narrow interface between the per-file pipeline and the image codecs.
//!
//! [`ImageProcessor`](crate::core::ImageProcessor) only talks to a [`Codec`],
//! so tests can swap in a recording implementation and check which files get
//! written without running real encoders.

use super::{convert_color_model, Compressor, Loader, Resizer};
use crate::core::{ColorModel, DecodeError, EncodeError, EncodeSettings, ResampleFilter};
use image::DynamicImage;
use std::path::Path;

pub trait Codec {
    fn decode(&self, path: &Path) -> Result<DynamicImage, DecodeError>;

    /// Downscale-only fit of the longest side to `max_side`.
    fn resize_to_fit(&self, image: DynamicImage, max_side: u32, filter: ResampleFilter) -> DynamicImage;

    fn convert_color_model(&self, image: DynamicImage, model: ColorModel) -> DynamicImage;

    /// Encode and write `image` to `path`; the format follows the suffix.
    fn encode(
        &self,
        image: &DynamicImage,
        path: &Path,
        settings: &EncodeSettings,
    ) -> Result<(), EncodeError>;
}

/// Codec backed by the `image`, `png` and `oxipng` crates.
#[derive(Debug, Clone, Default)]
pub struct ImageCodec {
    loader: Loader,
}

impl ImageCodec {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Codec for ImageCodec {
    fn decode(&self, path: &Path) -> Result<DynamicImage, DecodeError> {
        self.loader.load(path)
    }

    fn resize_to_fit(&self, image: DynamicImage, max_side: u32, filter: ResampleFilter) -> DynamicImage {
        Resizer::new(filter).thumbnail(image, max_side)
    }

    fn convert_color_model(&self, image: DynamicImage, model: ColorModel) -> DynamicImage {
        convert_color_model(image, model)
    }

    fn encode(
        &self,
        image: &DynamicImage,
        path: &Path,
        settings: &EncodeSettings,
    ) -> Result<(), EncodeError> {
        Compressor::new(*settings).save(image, path)
    }
}
