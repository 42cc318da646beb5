// imgshrink/src/processors/classifier.rs
use crate::core::ColorModel;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Suffixes accepted by a default run.
pub const STANDARD_EXTENSIONS: [&str; 8] = [
    ".jpg", ".jpeg", ".png", ".tif", ".tiff", ".bmp", ".psd", ".psb",
];

pub(crate) const JPEG_EXTENSIONS: [&str; 2] = [".jpg", ".jpeg"];
pub(crate) const PNG_EXTENSIONS: [&str; 1] = [".png"];

/// Set of file-name suffixes the walker tries to convert.
///
/// Suffixes are stored lowercase with their leading dot and matched
/// case-insensitively against the end of the file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSet {
    suffixes: Vec<String>,
}

impl ExtensionSet {
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let suffixes = suffixes
            .into_iter()
            .map(|s| {
                let s = s.as_ref().to_lowercase();
                if s.starts_with('.') {
                    s
                } else {
                    format!(".{}", s)
                }
            })
            .collect();
        Self { suffixes }
    }

    pub fn standard() -> Self {
        Self::new(STANDARD_EXTENSIONS)
    }

    pub fn matches(&self, file_name: impl AsRef<OsStr>) -> bool {
        has_any_suffix(file_name.as_ref(), &self.suffixes)
    }

    pub fn suffixes(&self) -> impl Iterator<Item = &str> {
        self.suffixes.iter().map(String::as_str)
    }
}

impl Default for ExtensionSet {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub color_model: ColorModel,
    pub output_path: PathBuf,
}

impl Classification {
    pub fn changes_extension(&self, input: &Path) -> bool {
        self.output_path != input
    }
}

#[derive(Debug, Clone, Default)]
pub struct PathClassifier {
    eligible: ExtensionSet,
}

impl PathClassifier {
    pub fn new(eligible: ExtensionSet) -> Self {
        Self { eligible }
    }

    pub fn is_eligible(&self, file_name: impl AsRef<OsStr>) -> bool {
        self.eligible.matches(file_name)
    }

    pub fn color_model(&self, file_name: impl AsRef<OsStr>) -> ColorModel {
        if has_any_suffix(file_name.as_ref(), PNG_EXTENSIONS) {
            ColorModel::Rgba
        } else {
            ColorModel::Rgb
        }
    }

    /// Where the converted image must be written.
    ///
    /// Anything that is not already JPEG or PNG is re-encoded as JPEG, so its
    /// suffix (text after the last dot) becomes `jpg`. The rest of the name
    /// is carried over byte for byte.
    pub fn output_path(&self, path: &Path) -> PathBuf {
        let Some(file_name) = path.file_name() else {
            return path.to_path_buf();
        };

        if has_any_suffix(file_name, JPEG_EXTENSIONS.iter().chain(&PNG_EXTENSIONS)) {
            return path.to_path_buf();
        }

        if path.extension().is_some() {
            return path.with_extension("jpg");
        }

        // `.psd` has no extension as far as `Path` is concerned
        if has_leading_dot(file_name) {
            return path.with_file_name(".jpg");
        }

        let mut renamed = OsString::from(file_name);
        renamed.push(".jpg");
        path.with_file_name(renamed)
    }

    pub fn classify(&self, path: &Path) -> Classification {
        Classification {
            color_model: self.color_model(path.file_name().unwrap_or_default()),
            output_path: self.output_path(path),
        }
    }
}

/// Case-insensitive suffix test on a raw file name.
///
/// Suffixes are ASCII, so matching on the lossy rendering is exact even for
/// names that are not valid UTF-8.
pub(crate) fn has_any_suffix<I>(file_name: &OsStr, suffixes: I) -> bool
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let lower = file_name.to_string_lossy().to_lowercase();
    suffixes
        .into_iter()
        .any(|suffix| lower.ends_with(suffix.as_ref()))
}

fn has_leading_dot(file_name: &OsStr) -> bool {
    file_name.to_string_lossy().starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_set_is_case_insensitive() {
        let classifier = PathClassifier::default();
        for name in ["a.jpg", "a.JPEG", "b.Png", "c.tif", "d.TIFF", "e.bmp", "f.psd", "g.PSB"] {
            assert!(classifier.is_eligible(name), "{} should be eligible", name);
        }
        for name in ["readme.txt", "movie.mp4", "photo.webp", "jpg", "archive.jpg.zip"] {
            assert!(!classifier.is_eligible(name), "{} should not be eligible", name);
        }
    }

    #[test]
    fn custom_set_normalizes_suffixes() {
        let set = ExtensionSet::new(["WEBP", ".Gif"]);
        assert_eq!(set.suffixes().collect::<Vec<_>>(), vec![".webp", ".gif"]);
        assert!(set.matches("anim.GIF"));
        assert!(!set.matches("photo.jpg"));
    }

    #[test]
    fn png_targets_alpha_model() {
        let classifier = PathClassifier::default();
        assert_eq!(classifier.color_model("icon.PNG"), ColorModel::Rgba);
        assert_eq!(classifier.color_model("photo.jpg"), ColorModel::Rgb);
        assert_eq!(classifier.color_model("scan.tiff"), ColorModel::Rgb);
    }

    #[test]
    fn jpeg_and_png_keep_their_path() {
        let classifier = PathClassifier::default();
        for name in ["a.jpg", "a.JPG", "a.jpeg", "a.png"] {
            let path = Path::new("/photos").join(name);
            assert_eq!(classifier.output_path(&path), path);
        }
    }

    #[test]
    fn other_formats_are_redirected_to_jpg() {
        let classifier = PathClassifier::default();
        assert_eq!(
            classifier.output_path(Path::new("/photos/b.tiff")),
            PathBuf::from("/photos/b.jpg")
        );
        assert_eq!(
            classifier.output_path(Path::new("/photos/scan.v2.BMP")),
            PathBuf::from("/photos/scan.v2.jpg")
        );
        assert_eq!(
            classifier.output_path(Path::new("/photos/.psd")),
            PathBuf::from("/photos/.jpg")
        );
        assert_eq!(
            classifier.output_path(Path::new("/photos/.hidden.tif")),
            PathBuf::from("/photos/.hidden.jpg")
        );
    }

    #[test]
    fn dotfile_png_keeps_its_path() {
        let classifier = PathClassifier::default();
        let path = Path::new("/photos/.png");
        assert!(classifier.is_eligible(".png"));
        assert_eq!(classifier.output_path(path), path);
        assert_eq!(classifier.color_model(".png"), ColorModel::Rgba);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_stem_survives_redirect() {
        use std::os::unix::ffi::OsStrExt;

        let classifier = PathClassifier::default();
        let input = Path::new("/photos").join(OsStr::from_bytes(b"caf\xe9.TIFF"));
        let expected = Path::new("/photos").join(OsStr::from_bytes(b"caf\xe9.jpg"));

        assert!(classifier.is_eligible(input.file_name().unwrap()));
        assert_eq!(classifier.output_path(&input), expected);
    }

    #[test]
    fn classification_is_idempotent() {
        let classifier = PathClassifier::default();
        let path = Path::new("/photos/b.tif");
        let first = classifier.classify(path);
        let second = classifier.classify(path);
        assert_eq!(first, second);
        assert!(first.changes_extension(path));
        assert!(!classifier.classify(Path::new("/photos/a.png")).changes_extension(Path::new("/photos/a.png")));
    }
}
