// imgshrink/src/processors/batch.rs
use crate::core::{
    ConversionOutcome, ConvertConfig, FileRecord, ImageProcessor, ImageToolError, Result,
    RunReporter,
};
use crate::processors::{Codec, ImageCodec, PathClassifier};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One directory of the pre-scanned tree with the names of its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryListing {
    pub directory: PathBuf,
    pub files: Vec<OsString>,
}

/// Walks a directory tree and runs every file through the pipeline,
/// sequentially.
pub struct BatchProcessor<C = ImageCodec> {
    processor: ImageProcessor<C>,
    show_progress: bool,
}

impl BatchProcessor<ImageCodec> {
    pub fn new(config: ConvertConfig, classifier: PathClassifier) -> Self {
        Self::from_processor(ImageProcessor::new(config, classifier))
    }
}

impl<C: Codec> BatchProcessor<C> {
    pub fn from_processor(processor: ImageProcessor<C>) -> Self {
        Self {
            processor,
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn processor(&self) -> &ImageProcessor<C> {
        &self.processor
    }

    /// Convert everything under `root`, feeding outcomes to `reporter`.
    ///
    /// Only failures to enumerate the tree are returned as errors; problems
    /// with individual files are recorded as outcomes.
    pub fn process_directory(&self, root: &Path, reporter: &mut RunReporter) -> Result<()> {
        self.validate_root(root)?;

        let listings = scan_tree(root)?;
        let file_count: usize = listings.iter().map(|l| l.files.len()).sum();

        log::info!(
            "Found {} files in {} directories under {}",
            file_count,
            listings.len(),
            root.display()
        );

        let pb = self.create_progress_bar(listings.len());

        for listing in &listings {
            for file_name in &listing.files {
                let outcome = self.process_file(&listing.directory, file_name);
                reporter.record(outcome);
            }
            pb.inc(1);
        }

        pb.finish();
        Ok(())
    }

    fn process_file(&self, directory: &Path, file_name: &OsStr) -> ConversionOutcome {
        let path = directory.join(file_name);
        if !self.processor.classifier().is_eligible(file_name) {
            log::debug!("Skipping {}", path.display());
            return ConversionOutcome::Skipped(FileRecord::new(directory, file_name));
        }

        self.processor.convert(path)
    }

    fn create_progress_bar(&self, total: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total as u64);
        match ProgressStyle::default_bar().template(
            "Processing images: {percent:>3}% | {bar:40.green} | {pos}/{len} Folders | Elapsed: {elapsed} | Remaining: {eta}",
        ) {
            Ok(style) => pb.set_style(style),
            Err(e) => log::debug!("Falling back to default progress style: {}", e),
        }
        pb
    }

    fn validate_root(&self, root: &Path) -> Result<()> {
        if !root.exists() {
            return Err(ImageToolError::InvalidParameter(format!(
                "Root directory does not exist: {}",
                root.display()
            )));
        }

        if !root.is_dir() {
            return Err(ImageToolError::InvalidParameter(format!(
                "Root path is not a directory: {}",
                root.display()
            )));
        }

        Ok(())
    }
}

/// Materialize the whole tree before anything is converted.
///
/// Directories come out depth-first in file-name order, each followed by
/// its own files. Files written during the run are therefore never picked
/// up again. Symbolic links to directories are neither followed nor listed
/// as files.
///
/// File names are kept as raw OS strings.
pub fn scan_tree(root: &Path) -> Result<Vec<DirectoryListing>> {
    let mut listings: Vec<DirectoryListing> = Vec::new();
    let mut index: HashMap<PathBuf, usize> = HashMap::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;

        if entry.depth() > 0 && entry.path_is_symlink() && entry.path().is_dir() {
            log::debug!("Not following directory link {}", entry.path().display());
            continue;
        }

        if entry.file_type().is_dir() {
            index.insert(entry.path().to_path_buf(), listings.len());
            listings.push(DirectoryListing {
                directory: entry.path().to_path_buf(),
                files: Vec::new(),
            });
            continue;
        }

        let Some(parent) = entry.path().parent() else {
            continue;
        };
        match index.get(parent) {
            Some(&slot) => listings[slot].files.push(entry.file_name().to_os_string()),
            None => log::warn!("Ignoring {} outside the scanned tree", entry.path().display()),
        }
    }

    Ok(listings)
}
