use anyhow::Result;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::apply::{self, TimestampBackend};
use crate::date;
use crate::metadata;

/// Image extensions with a standard EXIF layout.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tiff", "tif", "heic", "heif"];

/// Vendor RAW extensions — non-standard metadata layout, extraction is
/// attempted but may legitimately come back empty.
const RAW_EXTENSIONS: &[&str] = &["cr2", "nef", "arw"];

/// Video container extensions.
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv"];

/// The media category of a file, derived from its extension.
///
/// Determines whether metadata extraction is attempted at all and which
/// date fields the resolver considers.
///
/// # Example
///
/// ```rust
/// use exif_redate::pipeline::MediaKind;
/// use std::path::Path;
///
/// assert_eq!(MediaKind::from_path(Path::new("IMG_0001.JPG")), MediaKind::Image);
/// assert_eq!(MediaKind::from_path(Path::new("clip.MKV")), MediaKind::Video);
/// assert_eq!(MediaKind::from_path(Path::new("notes.txt")), MediaKind::Unsupported);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// JPEG, PNG, TIFF, HEIC/HEIF
    Image,
    /// CR2, NEF, ARW
    RawImage,
    /// MP4, MOV, AVI, MKV
    Video,
    /// Anything else — skipped before any metadata work
    Unsupported,
}

impl MediaKind {
    /// Determine the media kind from a file path extension. Total function:
    /// no extension or an unknown one yields `Unsupported`.
    pub fn from_path(path: &Path) -> Self {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return Self::Unsupported;
        };
        let ext = ext.to_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Self::Image
        } else if RAW_EXTENSIONS.contains(&ext.as_str()) {
            Self::RawImage
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Self::Video
        } else {
            Self::Unsupported
        }
    }
}

/// Why a file was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// Extension not recognized — skipped before any metadata work.
    UnsupportedFormat,
    /// No candidate metadata field present or parseable. Expected for
    /// files without EXIF; not an error.
    NoDateFound,
}

/// Why a file failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    /// The file itself could not be read.
    ReadFailure(String),
    /// The OS primitive rejected the creation-date mutation.
    ApplyFailure(String),
}

/// The outcome of processing a single file. Every file the walker touches
/// yields exactly one of these.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FileOutcome {
    Updated {
        /// Creation timestamp before the update, where the platform
        /// exposes one.
        previous: Option<NaiveDateTime>,
        /// The capture date that was (or would be) applied.
        applied: NaiveDateTime,
        /// The metadata field the date came from.
        source: &'static str,
        /// True in dry-run mode: reported as updated, nothing mutated.
        simulated: bool,
    },
    Skipped(SkipReason),
    Failed(FailureKind),
}

/// One processed path and its outcome.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

/// Aggregate result of a run. `found` counts every file the walker
/// considered; `updated + skipped + failed == found`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub found: u64,
    pub updated: u64,
    pub skipped: u64,
    pub failed: u64,
    pub outcomes: Vec<FileReport>,
}

impl RunSummary {
    fn record(&mut self, path: PathBuf, outcome: FileOutcome) {
        self.found += 1;
        match &outcome {
            FileOutcome::Updated { .. } => self.updated += 1,
            FileOutcome::Skipped(_) => self.skipped += 1,
            FileOutcome::Failed(_) => self.failed += 1,
        }
        self.outcomes.push(FileReport { path, outcome });
    }
}

/// Traversal and mutation settings for a run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Follow symbolic links while walking.
    pub follow_symlinks: bool,
    /// Report what would change without mutating anything.
    pub dry_run: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            follow_symlinks: true,
            dry_run: false,
        }
    }
}

/// Per-file reporting hook: `(current, total, path, outcome)`. Called once
/// per processed file, in walk order.
pub type OutcomeObserver = dyn Fn(u64, u64, &Path, &FileOutcome);

/// Collect the regular files under `root`, sorted by file name for
/// deterministic summaries. Unreadable directory entries are skipped.
pub fn collect_files(root: &Path, options: &RunOptions) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(root)
        .follow_links(options.follow_symlinks)
        .sort_by_file_name();
    if !options.recursive {
        walker = walker.max_depth(1);
    }
    walker
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect()
}

/// Run the full pipeline over a directory tree.
///
/// Fails fast (before touching any file) when `root` does not exist or is
/// not a directory. Every per-file condition is folded into that file's
/// [`FileOutcome`] — a bad file never aborts the walk.
///
/// # Example
///
/// ```rust,no_run
/// use exif_redate::apply::SetFileBackend;
/// use exif_redate::pipeline::{run, RunOptions};
/// use std::path::Path;
///
/// # fn main() -> anyhow::Result<()> {
/// let summary = run(Path::new("./photos"), &RunOptions::default(), &SetFileBackend)?;
/// println!("{} updated, {} skipped", summary.updated, summary.skipped);
/// # Ok(())
/// # }
/// ```
pub fn run(
    root: &Path,
    options: &RunOptions,
    backend: &dyn TimestampBackend,
) -> Result<RunSummary> {
    run_with_observer(root, options, backend, &|_, _, _, _| {})
}

/// Like [`run`], reporting each file's outcome through `observer` as the
/// walk progresses.
pub fn run_with_observer(
    root: &Path,
    options: &RunOptions,
    backend: &dyn TimestampBackend,
    observer: &OutcomeObserver,
) -> Result<RunSummary> {
    if !root.exists() {
        anyhow::bail!("directory does not exist: {}", root.display());
    }
    if !root.is_dir() {
        anyhow::bail!("path is not a directory: {}", root.display());
    }

    let files = collect_files(root, options);
    let total = files.len() as u64;
    log::info!("Found {total} file(s) to process");
    let mut summary = RunSummary::default();

    for (i, path) in files.into_iter().enumerate() {
        let kind = MediaKind::from_path(&path);
        let outcome = if kind == MediaKind::Unsupported {
            FileOutcome::Skipped(SkipReason::UnsupportedFormat)
        } else {
            process_file(&path, kind, options.dry_run, backend)
        };
        observer(i as u64 + 1, total, &path, &outcome);
        summary.record(path, outcome);
    }

    Ok(summary)
}

/// Drive one file through read → resolve → apply.
pub fn process_file(
    path: &Path,
    kind: MediaKind,
    dry_run: bool,
    backend: &dyn TimestampBackend,
) -> FileOutcome {
    let tags = match metadata::read_metadata(path) {
        Ok(tags) => tags,
        Err(e) => return FileOutcome::Failed(FailureKind::ReadFailure(format!("{e:#}"))),
    };

    let Some(date) = date::resolve_capture_date(kind, &tags) else {
        return FileOutcome::Skipped(SkipReason::NoDateFound);
    };

    let previous = creation_time(path);
    match apply::apply_creation_date(path, &date, dry_run, backend) {
        Ok(()) => FileOutcome::Updated {
            previous,
            applied: date.timestamp,
            source: date.source,
            simulated: dry_run,
        },
        Err(e) => FileOutcome::Failed(FailureKind::ApplyFailure(e.to_string())),
    }
}

/// The file's current creation timestamp, where the platform exposes one.
fn creation_time(path: &Path) -> Option<NaiveDateTime> {
    let created = fs::metadata(path).ok()?.created().ok()?;
    Some(chrono::DateTime::<chrono::Local>::from(created).naive_local())
}
