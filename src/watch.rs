//! Watch mode for re-analyzing stylesheets on change
//!
//! Provides file system watching with debouncing for `stylus-lens watch`.

use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::analysis::Analyzer;
use crate::config::schema::WatchConfig;
use crate::parser::StylusParser;

/// Error during watch mode
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Failed to initialize file watcher: {0}")]
    WatcherInit(#[source] notify::Error),
    #[error("Failed to watch path: {0}")]
    WatchPath(#[source] notify::Error),
    #[error("Watch channel error: {0}")]
    ChannelError(String),
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),
}

/// Analysis summary for one file
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub path: PathBuf,
    pub symbols: usize,
    pub colors: usize,
    /// Parse or read failure; the counts are zero when set
    pub error: Option<String>,
}

impl FileReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Analyze one file, recording rather than propagating failures.
pub fn analyze_file<P: StylusParser>(analyzer: &Analyzer<P>, path: &Path) -> FileReport {
    let mut report = FileReport { path: path.to_path_buf(), symbols: 0, colors: 0, error: None };

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            report.error = Some(err.to_string());
            return report;
        }
    };

    if let Err(err) = analyzer.ast(&text) {
        report.error = Some(err.to_string());
        return report;
    }

    report.symbols = analyzer.symbols(&text).len();
    report.colors = analyzer.colors(&text).len();
    report
}

/// Tracks files that failed across iterations for recovery detection
#[derive(Debug, Default)]
pub struct ErrorTracker {
    files_with_errors: HashSet<PathBuf>,
}

impl ErrorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the latest reports, returns files that no longer fail
    pub fn update(&mut self, reports: &[FileReport]) -> Vec<PathBuf> {
        let mut fixed = Vec::new();
        for report in reports {
            if report.is_ok() {
                if self.files_with_errors.remove(&report.path) {
                    fixed.push(report.path.clone());
                }
            } else {
                self.files_with_errors.insert(report.path.clone());
            }
        }
        fixed
    }

    pub fn has_errors(&self) -> bool {
        !self.files_with_errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.files_with_errors.len()
    }
}

/// Options for watch mode
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Directory to watch recursively
    pub dir: PathBuf,
    pub config: WatchConfig,
}

/// Check if a file has one of the watched extensions
pub fn is_relevant_file(path: &Path, extensions: &[String]) -> bool {
    match path.extension() {
        Some(ext) => {
            let ext = ext.to_string_lossy().to_lowercase();
            extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext))
        }
        None => false,
    }
}

/// All watched files below `dir`.
pub fn find_stylesheets(dir: &Path, extensions: &[String]) -> Vec<PathBuf> {
    use glob::glob;

    let mut files = Vec::new();
    for ext in extensions {
        let pattern = format!("{}/**/*.{}", dir.display(), ext);
        if let Ok(entries) = glob(&pattern) {
            files.extend(entries.flatten());
        }
    }
    files.sort();
    files
}

/// Format duration for display
fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}

/// Get current timestamp for logging
fn timestamp() -> String {
    use std::time::SystemTime;
    let now = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
    let secs = now.as_secs() % 86400;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

fn print_reports(reports: &[FileReport], fixed: &[PathBuf], duration: Duration) {
    for path in fixed {
        println!("[{}] Fixed: {}", timestamp(), path.display());
    }
    for report in reports {
        match &report.error {
            Some(error) => println!("[{}] {}: {}", timestamp(), report.path.display(), error),
            None => println!(
                "[{}] {}: {} symbols, {} colors",
                timestamp(),
                report.path.display(),
                report.symbols,
                report.colors
            ),
        }
    }
    println!("[{}] Analyzed {} file(s) in {}", timestamp(), reports.len(), format_duration(duration));
}

fn analyze_all<P: StylusParser>(analyzer: &Analyzer<P>, paths: &[PathBuf]) -> (Vec<FileReport>, Duration) {
    let start = Instant::now();
    let reports = paths.iter().map(|path| analyze_file(analyzer, path)).collect();
    (reports, start.elapsed())
}

/// Watch for file changes and re-analyze changed files.
///
/// Blocks until the watcher's channel closes.
pub fn watch_and_analyze<P: StylusParser>(options: WatchOptions, analyzer: &Analyzer<P>) -> Result<(), WatchError> {
    if !options.dir.exists() {
        return Err(WatchError::DirectoryNotFound(options.dir.clone()));
    }

    let (tx, rx) = channel();
    let debounce = Duration::from_millis(options.config.debounce_ms);
    let mut debouncer = new_debouncer(debounce, tx).map_err(WatchError::WatcherInit)?;
    debouncer.watcher().watch(&options.dir, RecursiveMode::Recursive).map_err(WatchError::WatchPath)?;

    let mut error_tracker = ErrorTracker::new();

    let initial = find_stylesheets(&options.dir, &options.config.extensions);
    let (reports, duration) = analyze_all(analyzer, &initial);
    error_tracker.update(&reports);
    print_reports(&reports, &[], duration);
    println!("[{}] Watching {} for changes...", timestamp(), options.dir.display());

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let mut changed: Vec<PathBuf> = events
                    .into_iter()
                    .filter(|e| {
                        matches!(e.kind, DebouncedEventKind::Any)
                            && is_relevant_file(&e.path, &options.config.extensions)
                            && e.path.exists()
                    })
                    .map(|e| e.path)
                    .collect();
                changed.sort();
                changed.dedup();

                if !changed.is_empty() {
                    let (reports, duration) = analyze_all(analyzer, &changed);
                    let fixed = error_tracker.update(&reports);
                    print_reports(&reports, &fixed, duration);
                }
            }
            Ok(Err(error)) => {
                tracing::warn!("watch error: {:?}", error);
            }
            Err(e) => {
                return Err(WatchError::ChannelError(e.to_string()));
            }
        }
    }
}
