// imgshrink/src/core/processor.rs
use super::{ConversionOutcome, ConvertConfig, EncodeError, FileRecord, TransformError};
use crate::processors::{Codec, ImageCodec, PathClassifier};
use image::GenericImageView;
use std::path::{Path, PathBuf};

/// Converts one file at a time. Never fails: every problem ends up in the
/// returned [`ConversionOutcome`].
pub struct ImageProcessor<C = ImageCodec> {
    config: ConvertConfig,
    classifier: PathClassifier,
    codec: C,
}

impl ImageProcessor<ImageCodec> {
    pub fn new(config: ConvertConfig, classifier: PathClassifier) -> Self {
        Self::with_codec(config, classifier, ImageCodec::new())
    }
}

impl<C: Codec> ImageProcessor<C> {
    pub fn with_codec(config: ConvertConfig, classifier: PathClassifier, codec: C) -> Self {
        Self {
            config,
            classifier,
            codec,
        }
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    pub fn classifier(&self) -> &PathClassifier {
        &self.classifier
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn convert<P: AsRef<Path>>(&self, path: P) -> ConversionOutcome {
        let path = path.as_ref();

        match self.try_convert(path) {
            Ok((output, resized)) => ConversionOutcome::Converted { output, resized },
            Err(cause) => {
                log::warn!("{}", cause);
                ConversionOutcome::Failed {
                    file: FileRecord::from_path(path),
                    cause,
                }
            }
        }
    }

    fn try_convert(&self, path: &Path) -> Result<(PathBuf, bool), TransformError> {
        let image = self.codec.decode(path)?;
        let classification = self.classifier.classify(path);

        let original_dimensions = image.dimensions();
        let mut image =
            self.codec
                .resize_to_fit(image, self.config.max_dimension, self.config.filter);
        let resized = image.dimensions() != original_dimensions;

        if self.config.normalize_color_space {
            image = self
                .codec
                .convert_color_model(image, classification.color_model);
        }

        let settings = self.config.encode_settings();

        if !classification.changes_extension(path) {
            self.codec.encode(&image, path, &settings)?;
            return Ok((path.to_path_buf(), resized));
        }

        let output = classification.output_path;
        if output.exists() {
            log::warn!(
                "{} already exists and will be replaced by the conversion of {}",
                output.display(),
                path.display()
            );
        }

        self.codec.encode(&image, &output, &settings)?;
        std::fs::remove_file(path).map_err(|source| EncodeError::RemoveOriginal {
            path: path.to_path_buf(),
            output: output.clone(),
            source,
        })?;

        log::debug!("Replaced {} with {}", path.display(), output.display());
        Ok((output, resized))
    }
}
