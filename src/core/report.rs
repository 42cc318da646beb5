// imgshrink/src/core/report.rs
use super::{ConversionOutcome, FileRecord};
use crate::utils::{format_elapsed, plural_suffix};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Per-run tallies, appended to in walk order.
#[derive(Debug, Default)]
pub struct RunStats {
    pub converted: usize,
    pub failed: Vec<FileRecord>,
    pub skipped: Vec<FileRecord>,
}

impl RunStats {
    pub fn total(&self) -> usize {
        self.converted + self.failed.len() + self.skipped.len()
    }
}

/// Collects outcomes while the tree is walked and produces the summary.
pub struct RunReporter {
    started: Instant,
    stats: RunStats,
    self_path: Option<PathBuf>,
}

impl RunReporter {
    /// Starts the clock.
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            stats: RunStats::default(),
            self_path: None,
        }
    }

    /// Path of the running program, hidden from the "other files" listing if
    /// the walk comes across it.
    pub fn with_self_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.self_path = Some(path.into());
        self
    }

    pub fn record(&mut self, outcome: ConversionOutcome) {
        match outcome {
            ConversionOutcome::Converted { .. } => self.stats.converted += 1,
            ConversionOutcome::Failed { file, .. } => self.stats.failed.push(file),
            ConversionOutcome::Skipped(file) => self.stats.skipped.push(file),
        }
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn finish(self) -> RunSummary {
        let elapsed = self.started.elapsed();
        log::info!(
            "Run finished in {:?}: {} converted, {} corrupted, {} skipped",
            elapsed,
            self.stats.converted,
            self.stats.failed.len(),
            self.stats.skipped.len()
        );

        RunSummary {
            elapsed,
            stats: self.stats,
            self_path: self.self_path,
        }
    }
}

#[derive(Debug)]
pub struct RunSummary {
    pub elapsed: Duration,
    pub stats: RunStats,
    self_path: Option<PathBuf>,
}

impl RunSummary {
    /// Skipped files worth telling the user about.
    pub fn other_files(&self) -> impl Iterator<Item = &FileRecord> {
        self.stats
            .skipped
            .iter()
            .filter(move |file| !is_same_file(&file.path(), self.self_path.as_deref()))
    }
}

fn is_same_file(candidate: &Path, self_path: Option<&Path>) -> bool {
    let Some(self_path) = self_path else {
        return false;
    };
    if candidate == self_path {
        return true;
    }
    match (candidate.canonicalize(), self_path.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Time to complete: {}", format_elapsed(self.elapsed))?;
        writeln!(f, "Total number of converted images: {}", self.stats.converted)?;

        let failed = &self.stats.failed;
        if failed.is_empty() {
            writeln!(f, "No corrupted images found.")?;
        } else {
            writeln!(f)?;
            writeln!(
                f,
                "{} Corrupted image{}:",
                failed.len(),
                plural_suffix(failed.len())
            )?;
            for file in failed {
                writeln!(
                    f,
                    "-> {} found in {}",
                    file.file_name.to_string_lossy(),
                    file.directory.display()
                )?;
            }
        }

        let mut others = self.other_files().peekable();
        if others.peek().is_none() {
            writeln!(f, "No other files found.")?;
        } else {
            writeln!(f)?;
            writeln!(f, "Other files (not converted):")?;
            for file in others {
                writeln!(
                    f,
                    "-> {} found in {}",
                    file.file_name.to_string_lossy(),
                    file.directory.display()
                )?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DecodeError, TransformError};

    fn failed(dir: &str, name: &str) -> ConversionOutcome {
        ConversionOutcome::Failed {
            file: FileRecord::new(dir, name),
            cause: TransformError::Decode(DecodeError::Open {
                path: PathBuf::from(dir).join(name),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, "corrupt"),
            }),
        }
    }

    fn converted(path: &str) -> ConversionOutcome {
        ConversionOutcome::Converted {
            output: PathBuf::from(path),
            resized: false,
        }
    }

    #[test]
    fn outcomes_land_in_their_bucket() {
        let mut reporter = RunReporter::start();
        reporter.record(converted("/p/a.png"));
        reporter.record(failed("/p", "broken.jpg"));
        reporter.record(ConversionOutcome::Skipped(FileRecord::new("/p", "readme.txt")));
        reporter.record(converted("/p/b.jpg"));

        let stats = reporter.stats();
        assert_eq!(stats.converted, 2);
        assert_eq!(stats.failed, vec![FileRecord::new("/p", "broken.jpg")]);
        assert_eq!(stats.skipped, vec![FileRecord::new("/p", "readme.txt")]);
        assert_eq!(stats.total(), 4);
    }

    #[test]
    fn single_failure_uses_singular() {
        let mut reporter = RunReporter::start();
        reporter.record(failed("/p", "broken.jpg"));
        let text = reporter.finish().to_string();

        assert!(text.contains("Total number of converted images: 0"));
        assert!(text.contains("\n1 Corrupted image:\n"));
        assert!(text.contains("-> broken.jpg found in /p"));
        assert!(text.contains("No other files found."));
    }

    #[test]
    fn several_failures_use_plural() {
        let mut reporter = RunReporter::start();
        reporter.record(failed("/p", "x.jpg"));
        reporter.record(failed("/q", "y.tif"));
        let text = reporter.finish().to_string();

        assert!(text.contains("2 Corrupted images:"));
        assert!(text.contains("-> x.jpg found in /p"));
        assert!(text.contains("-> y.tif found in /q"));
    }

    #[test]
    fn empty_run_reports_none_found() {
        let text = RunReporter::start().finish().to_string();
        assert!(text.starts_with("Time to complete: 0h 00m 00s\n"));
        assert!(text.contains("No corrupted images found."));
        assert!(text.contains("No other files found."));
    }

    #[test]
    fn skipped_files_are_listed() {
        let mut reporter = RunReporter::start();
        reporter.record(ConversionOutcome::Skipped(FileRecord::new("/p", "readme.txt")));
        let text = reporter.finish().to_string();

        assert!(text.contains("Other files (not converted):"));
        assert!(text.contains("-> readme.txt found in /p"));
        assert!(!text.contains("No other files found."));
    }

    #[test]
    fn self_path_is_not_an_other_file() {
        let mut reporter = RunReporter::start().with_self_path("/p/imgshrink");
        reporter.record(ConversionOutcome::Skipped(FileRecord::new("/p", "imgshrink")));
        let summary = reporter.finish();

        assert_eq!(summary.stats.skipped.len(), 1);
        assert_eq!(summary.other_files().count(), 0);
        assert!(summary.to_string().contains("No other files found."));
    }

    #[test]
    fn self_path_is_hidden_among_other_files() {
        let mut reporter = RunReporter::start().with_self_path("/p/imgshrink");
        reporter.record(ConversionOutcome::Skipped(FileRecord::new("/p", "imgshrink")));
        reporter.record(ConversionOutcome::Skipped(FileRecord::new("/p", "notes.md")));
        let text = reporter.finish().to_string();

        assert!(text.contains("-> notes.md found in /p"));
        assert!(!text.contains("-> imgshrink found in"));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_names_are_rendered_lossily() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let mut reporter = RunReporter::start();
        reporter.record(ConversionOutcome::Skipped(FileRecord::new(
            "/p",
            OsStr::from_bytes(b"caf\xe9.txt"),
        )));
        let text = reporter.finish().to_string();

        assert!(text.contains("-> caf\u{FFFD}.txt found in /p"));
    }
}
