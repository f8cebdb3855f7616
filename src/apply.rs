//! Creation-date application.
//!
//! The OS primitive that mutates a file's creation date is platform-specific
//! and injectable: [`SetFileBackend`] shells out to macOS `SetFile`, while
//! [`RecordingBackend`] records intended mutations in memory so the full
//! pipeline can be exercised without touching the filesystem.

use chrono::NaiveDateTime;
use std::cell::RefCell;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::date::CaptureDate;

/// Why the OS primitive rejected a creation-date mutation.
#[derive(Debug, Clone)]
pub enum ApplyError {
    /// The `SetFile` utility is not on PATH (non-macOS system, or the Xcode
    /// command line tools are missing).
    MissingUtility,
    /// The utility ran and refused (permission denied, unsupported
    /// filesystem); carries its stderr.
    Rejected(String),
    /// Spawning the utility or inspecting the file failed.
    Io(String),
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplyError::MissingUtility => write!(f, "SetFile utility not found"),
            ApplyError::Rejected(stderr) => write!(f, "rejected: {stderr}"),
            ApplyError::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ApplyError {}

/// The OS capability that sets a file's creation date.
pub trait TimestampBackend {
    fn set_creation_time(&self, path: &Path, timestamp: NaiveDateTime) -> Result<(), ApplyError>;
}

/// Production backend: macOS `SetFile -d "MM/DD/YYYY HH:MM:SS" <path>`.
pub struct SetFileBackend;

impl TimestampBackend for SetFileBackend {
    fn set_creation_time(&self, path: &Path, timestamp: NaiveDateTime) -> Result<(), ApplyError> {
        let stamp = timestamp.format("%m/%d/%Y %H:%M:%S").to_string();
        let output = Command::new("SetFile")
            .arg("-d")
            .arg(&stamp)
            .arg(path)
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => ApplyError::MissingUtility,
                _ => ApplyError::Io(e.to_string()),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Err(ApplyError::Rejected(stderr))
        }
    }
}

/// Test backend: records intended mutations instead of performing them.
#[derive(Default)]
pub struct RecordingBackend {
    calls: RefCell<Vec<(PathBuf, NaiveDateTime)>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mutations requested so far, in call order.
    pub fn calls(&self) -> Vec<(PathBuf, NaiveDateTime)> {
        self.calls.borrow().clone()
    }
}

impl TimestampBackend for RecordingBackend {
    fn set_creation_time(&self, path: &Path, timestamp: NaiveDateTime) -> Result<(), ApplyError> {
        self.calls.borrow_mut().push((path.to_path_buf(), timestamp));
        Ok(())
    }
}

/// Apply a resolved capture date to a file's creation attribute.
///
/// In dry-run mode the path is validated (it must exist and not be
/// read-only) but nothing is mutated and the backend is never invoked.
pub fn apply_creation_date(
    path: &Path,
    date: &CaptureDate,
    dry_run: bool,
    backend: &dyn TimestampBackend,
) -> Result<(), ApplyError> {
    if dry_run {
        let meta = fs::metadata(path).map_err(|e| ApplyError::Io(e.to_string()))?;
        if meta.permissions().readonly() {
            return Err(ApplyError::Rejected("file is read-only".to_string()));
        }
        return Ok(());
    }
    backend.set_creation_time(path, date.timestamp)
}
