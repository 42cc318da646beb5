// imgshrink/src/processors/resizer.rs
use crate::core::{ColorModel, ResampleFilter};
use image::{imageops::FilterType, DynamicImage, GenericImageView};

pub struct Resizer {
    filter: ResampleFilter,
}

impl Resizer {
    pub fn new(filter: ResampleFilter) -> Self {
        Self { filter }
    }

    /// Shrink so the longest side is at most `max_side`, keeping the aspect
    /// ratio. Images already within bounds are returned untouched.
    pub fn thumbnail(&self, image: DynamicImage, max_side: u32) -> DynamicImage {
        let (orig_width, orig_height) = image.dimensions();
        let (width, height) = fit_within(orig_width, orig_height, max_side);

        if width == orig_width && height == orig_height {
            log::debug!("Image dimensions unchanged, skipping resize");
            return image;
        }

        log::debug!(
            "Resizing image from {}x{} to {}x{} ({})",
            orig_width,
            orig_height,
            width,
            height,
            self.filter
        );

        image.resize_exact(width, height, filter_type(self.filter))
    }
}

/// Target dimensions for a downscale-only fit of `max_side`.
pub fn fit_within(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    let longest = width.max(height);
    if max_side == 0 || longest <= max_side {
        return (width, height);
    }

    let ratio = max_side as f64 / longest as f64;
    let scale = |side: u32| -> u32 {
        if side == longest {
            max_side
        } else {
            ((side as f64 * ratio).round() as u32).clamp(1, max_side)
        }
    };

    (scale(width), scale(height))
}

pub fn filter_type(filter: ResampleFilter) -> FilterType {
    match filter {
        ResampleFilter::Nearest => FilterType::Nearest,
        ResampleFilter::Bilinear => FilterType::Triangle,
        ResampleFilter::Bicubic => FilterType::CatmullRom,
        ResampleFilter::Lanczos3 => FilterType::Lanczos3,
    }
}

pub fn convert_color_model(image: DynamicImage, model: ColorModel) -> DynamicImage {
    match (model, &image) {
        (ColorModel::Rgb, DynamicImage::ImageRgb8(_)) => image,
        (ColorModel::Rgba, DynamicImage::ImageRgba8(_)) => image,
        (ColorModel::Rgb, _) => DynamicImage::ImageRgb8(image.to_rgb8()),
        (ColorModel::Rgba, _) => DynamicImage::ImageRgba8(image.to_rgba8()),
    }
}
