//! # exif-redate
//!
//! Sync file creation dates to the capture date recorded in EXIF metadata.
//! Copying, syncing, and format conversion routinely clobber filesystem
//! timestamps; the capture date embedded in the file survives. This crate
//! walks a photo library, resolves one authoritative capture timestamp per
//! file from its metadata, and sets the file's creation-date attribute to
//! match.
//!
//! ## Quick Start
//!
//! The pipeline module handles the full walk → read → resolve → apply flow:
//!
//! ```rust,no_run
//! use exif_redate::apply::SetFileBackend;
//! use exif_redate::pipeline::{run, RunOptions};
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let options = RunOptions {
//!         dry_run: true, // preview first
//!         ..RunOptions::default()
//!     };
//!
//!     let summary = run(Path::new("./photos"), &options, &SetFileBackend)?;
//!
//!     println!(
//!         "{} updated, {} skipped, {} failed out of {} files",
//!         summary.updated, summary.skipped, summary.failed, summary.found
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! The pipeline stages can also be driven individually:
//!
//! ```rust,no_run
//! use exif_redate::date::resolve_capture_date;
//! use exif_redate::metadata::read_metadata;
//! use exif_redate::pipeline::MediaKind;
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let path = Path::new("photo.jpg");
//!
//!     // 1. Read and normalize the metadata tags
//!     let tags = read_metadata(path)?;
//!
//!     // 2. Resolve the authoritative capture date
//!     if let Some(date) = resolve_capture_date(MediaKind::from_path(path), &tags) {
//!         println!("taken {} (from {})", date.timestamp, date.source);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Date Field Priority
//!
//! | Priority | Field | Role |
//! |----------|-------|------|
//! | 1 | `EXIF DateTimeOriginal` | primary |
//! | 2 | `EXIF DateTime` | primary |
//! | 3 | `Image DateTime` | primary |
//! | 4 | `EXIF SubSecTimeOriginal` | sub-second refinement only |
//! | 5 | `EXIF SubSecTime` | sub-second refinement only |
//!
//! The first primary field that parses as `YYYY:MM:DD HH:MM:SS` wins;
//! malformed values fall through. Video containers (MP4, MOV, AVI, MKV) are
//! walked and classified but carry their dates in container tags that are
//! not parsed yet, so they skip as "no date found".
//!
//! ## Modules
//!
//! - [`config`] — Configuration types and loading/saving
//! - [`metadata`] — Tag extraction and normalization
//! - [`date`] — Capture-date resolution policy
//! - [`apply`] — Creation-date application and the injectable OS backend
//! - [`pipeline`] — Directory walk, per-file orchestration, run summary

pub mod apply;
pub mod config;
pub mod date;
pub mod metadata;
pub mod pipeline;
