// imgshrink/src/processors/compressor.rs
use crate::core::{EncodeError, EncodeSettings};
use crate::processors::classifier::{has_any_suffix, JPEG_EXTENSIONS, PNG_EXTENSIONS};
use crate::utils::format_file_size;
use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::{DynamicImage, ImageFormat};
use oxipng::{optimize_from_memory, Options};
use std::borrow::Cow;
use std::path::Path;

const METERS_PER_INCH: f64 = 0.0254;

pub struct Compressor {
    settings: EncodeSettings,
}

impl Compressor {
    pub fn new(settings: EncodeSettings) -> Self {
        Self {
            settings: EncodeSettings {
                quality: settings.quality.clamp(1, 100),
                ..settings
            },
        }
    }

    /// Encode fully in memory, then replace whatever is at `path`.
    pub fn save(&self, image: &DynamicImage, path: &Path) -> Result<(), EncodeError> {
        let format = detect_format(path).ok_or_else(|| EncodeError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;

        log::debug!(
            "Saving image to {} with format {:?}, quality: {}, dpi: {}",
            path.display(),
            format,
            self.settings.quality,
            self.settings.dpi
        );

        let bytes = self.compress_to_bytes(image, format, path)?;

        std::fs::write(path, &bytes).map_err(|source| EncodeError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        log::debug!(
            "Saved image: {} ({})",
            path.display(),
            format_file_size(bytes.len() as u64)
        );
        Ok(())
    }

    pub fn compress_to_bytes(
        &self,
        image: &DynamicImage,
        format: ImageFormat,
        path: &Path,
    ) -> Result<Vec<u8>, EncodeError> {
        match format {
            ImageFormat::Jpeg => self.encode_jpeg(image, path),
            ImageFormat::Png => {
                let data = self.encode_png(image, path)?;
                if self.settings.optimize {
                    self.optimize_png_bytes(&data, path)
                } else {
                    Ok(data)
                }
            }
            _ => Err(EncodeError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    fn encode_jpeg(&self, image: &DynamicImage, path: &Path) -> Result<Vec<u8>, EncodeError> {
        let image = narrow_to_8bit(image);
        let mut buffer = Vec::new();

        let mut encoder = JpegEncoder::new_with_quality(&mut buffer, self.settings.quality);
        encoder.set_pixel_density(PixelDensity::dpi(self.settings.dpi));
        image
            .write_with_encoder(encoder)
            .map_err(|source| EncodeError::Image {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(buffer)
    }

    fn encode_png(&self, image: &DynamicImage, path: &Path) -> Result<Vec<u8>, EncodeError> {
        let (color, depth, data) = png_layout(image);
        let png_error = |source| EncodeError::Png {
            path: path.to_path_buf(),
            source,
        };

        let mut buffer = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buffer, image.width(), image.height());
            encoder.set_color(color);
            encoder.set_depth(depth);
            encoder.set_pixel_dims(Some(png::PixelDimensions {
                xppu: dpi_to_ppm(self.settings.dpi),
                yppu: dpi_to_ppm(self.settings.dpi),
                unit: png::Unit::Meter,
            }));

            let mut writer = encoder.write_header().map_err(png_error)?;
            writer.write_image_data(&data).map_err(png_error)?;
            writer.finish().map_err(png_error)?;
        }

        Ok(buffer)
    }

    fn optimize_png_bytes(&self, data: &[u8], path: &Path) -> Result<Vec<u8>, EncodeError> {
        optimize_from_memory(data, &Options::default()).map_err(|e| EncodeError::Optimize {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Output format implied by the file suffix, matched the same way the
/// classifier matches eligible names.
pub fn detect_format(path: &Path) -> Option<ImageFormat> {
    let file_name = path.file_name()?;
    if has_any_suffix(file_name, JPEG_EXTENSIONS) {
        Some(ImageFormat::Jpeg)
    } else if has_any_suffix(file_name, PNG_EXTENSIONS) {
        Some(ImageFormat::Png)
    } else {
        None
    }
}

fn dpi_to_ppm(dpi: u16) -> u32 {
    (dpi as f64 / METERS_PER_INCH).round() as u32
}

/// Keep the channel layout but drop to 8 bits per sample.
fn narrow_to_8bit(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    match image {
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageRgb8(_)
        | DynamicImage::ImageRgba8(_) => Cow::Borrowed(image),
        DynamicImage::ImageLuma16(_) => Cow::Owned(DynamicImage::ImageLuma8(image.to_luma8())),
        DynamicImage::ImageLumaA16(_) => {
            Cow::Owned(DynamicImage::ImageLumaA8(image.to_luma_alpha8()))
        }
        _ if image.color().has_alpha() => Cow::Owned(DynamicImage::ImageRgba8(image.to_rgba8())),
        _ => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
    }
}

fn png_layout(image: &DynamicImage) -> (png::ColorType, png::BitDepth, Cow<'_, [u8]>) {
    use png::{BitDepth, ColorType};

    match image {
        DynamicImage::ImageLuma8(buf) => (ColorType::Grayscale, BitDepth::Eight, Cow::Borrowed(buf.as_raw())),
        DynamicImage::ImageLumaA8(buf) => {
            (ColorType::GrayscaleAlpha, BitDepth::Eight, Cow::Borrowed(buf.as_raw()))
        }
        DynamicImage::ImageRgb8(buf) => (ColorType::Rgb, BitDepth::Eight, Cow::Borrowed(buf.as_raw())),
        DynamicImage::ImageRgba8(buf) => (ColorType::Rgba, BitDepth::Eight, Cow::Borrowed(buf.as_raw())),
        DynamicImage::ImageLuma16(buf) => {
            (ColorType::Grayscale, BitDepth::Sixteen, Cow::Owned(be_bytes(buf.as_raw())))
        }
        DynamicImage::ImageLumaA16(buf) => {
            (ColorType::GrayscaleAlpha, BitDepth::Sixteen, Cow::Owned(be_bytes(buf.as_raw())))
        }
        DynamicImage::ImageRgb16(buf) => (ColorType::Rgb, BitDepth::Sixteen, Cow::Owned(be_bytes(buf.as_raw()))),
        DynamicImage::ImageRgba16(buf) => {
            (ColorType::Rgba, BitDepth::Sixteen, Cow::Owned(be_bytes(buf.as_raw())))
        }
        // float images
        _ if image.color().has_alpha() => {
            (ColorType::Rgba, BitDepth::Eight, Cow::Owned(image.to_rgba8().into_raw()))
        }
        _ => (ColorType::Rgb, BitDepth::Eight, Cow::Owned(image.to_rgb8().into_raw())),
    }
}

fn be_bytes(samples: &[u16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_be_bytes()).collect()
}
