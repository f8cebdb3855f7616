use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};

use exif_redate::apply::SetFileBackend;
use exif_redate::config::Config;
use exif_redate::metadata;
use exif_redate::pipeline::{self, FailureKind, FileOutcome, MediaKind, SkipReason};

#[derive(Parser, Debug)]
#[command(
    name = "exif-redate",
    version,
    about = "Sync file creation dates to the capture date recorded in EXIF metadata"
)]
struct Cli {
    /// Directory containing photos and videos to process
    #[arg(value_name = "DIR")]
    root: Option<PathBuf>,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Preview changes without touching any file
    #[arg(long)]
    dry_run: bool,

    /// Output the run summary as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// List all metadata tags per file (grouped) and exit
    #[arg(long = "show-tags")]
    show_tags: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    // Load config
    let mut config = Config::load(cli.config.as_deref())?;

    // Override dry_run from CLI flag
    if cli.dry_run {
        config.output.dry_run = true;
    }

    // Validate inputs
    let Some(root) = cli.root else {
        anyhow::bail!("No directory specified. Use --help for usage.");
    };

    // Handle --show-tags
    if cli.show_tags {
        return show_tags(&root, &config);
    }

    let options = config.run_options();
    log::info!("Processing {}", root.display());
    if options.dry_run {
        log::info!("DRY RUN — no files will be modified");
    }

    let summary =
        pipeline::run_with_observer(&root, &options, &SetFileBackend, &log_outcome)?;

    // JSON output
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    // Summary
    log::info!(
        "Done: {} updated, {} skipped, {} failed out of {} files",
        summary.updated,
        summary.skipped,
        summary.failed,
        summary.found
    );

    Ok(())
}

/// Per-file progress line, matched to the outcome's severity.
fn log_outcome(current: u64, total: u64, path: &Path, outcome: &FileOutcome) {
    match outcome {
        FileOutcome::Updated {
            applied,
            source,
            simulated: true,
            ..
        } => {
            log::info!(
                "[{current}/{total}] {}: would set creation date to {applied} (from {source})",
                path.display()
            );
        }
        FileOutcome::Updated {
            applied, source, ..
        } => {
            log::info!(
                "[{current}/{total}] {}: creation date set to {applied} (from {source})",
                path.display()
            );
        }
        FileOutcome::Skipped(SkipReason::UnsupportedFormat) => {
            log::debug!("[{current}/{total}] {}: unsupported format", path.display());
        }
        FileOutcome::Skipped(SkipReason::NoDateFound) => {
            // PNGs typically don't carry EXIF — worth a hint.
            if path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("png"))
            {
                log::warn!(
                    "[{current}/{total}] {}: no capture date (PNG files rarely carry EXIF)",
                    path.display()
                );
            } else {
                log::warn!("[{current}/{total}] {}: no capture date found", path.display());
            }
        }
        FileOutcome::Failed(FailureKind::ReadFailure(e)) => {
            log::error!("[{current}/{total}] {}: read failed: {e}", path.display());
        }
        FileOutcome::Failed(FailureKind::ApplyFailure(e)) => {
            log::error!("[{current}/{total}] {}: update failed: {e}", path.display());
        }
    }
}

// ANSI color codes
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Inspect metadata tags for a single file or a whole directory.
fn show_tags(root: &Path, config: &Config) -> Result<()> {
    let files = if root.is_file() {
        vec![root.to_path_buf()]
    } else if root.is_dir() {
        pipeline::collect_files(root, &config.run_options())
    } else {
        anyhow::bail!("path does not exist: {}", root.display());
    };

    let media: Vec<PathBuf> = files
        .into_iter()
        .filter(|p| MediaKind::from_path(p) != MediaKind::Unsupported)
        .collect();
    if media.is_empty() {
        anyhow::bail!("No supported media files found in the specified path.");
    }

    for path in &media {
        if let Err(e) = print_tag_listing(path) {
            log::error!("{}: {e:#}", path.display());
        }
    }
    Ok(())
}

/// Print every normalized tag of one file, grouped by category.
fn print_tag_listing(path: &Path) -> Result<()> {
    let tags = metadata::read_metadata(path)?;

    println!();
    println!("{BOLD}File:{RESET} {}", path.display());
    println!("{DIM}{}{RESET}", "═".repeat(72));

    if tags.is_empty() {
        println!("  {DIM}(no metadata tags found){RESET}");
        return Ok(());
    }
    println!("  {} tag(s)", tags.len());
    println!();

    for group in ["Date / Time", "Camera", "Other"] {
        let rows: Vec<(&String, &String)> =
            tags.iter().filter(|(name, _)| tag_group(name) == group).collect();
        if rows.is_empty() {
            continue;
        }
        println!("  {BOLD}{group}{RESET}");
        println!("  {DIM}{}{RESET}", "─".repeat(70));
        for (name, value) in rows {
            println!("  {name:<28} : {value}");
        }
        println!();
    }

    Ok(())
}

/// Bucket a tag into a display group by name.
fn tag_group(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    if ["date", "time", "create", "original"]
        .iter()
        .any(|w| lower.contains(w))
    {
        "Date / Time"
    } else if ["make", "model", "lens", "focal", "aperture", "iso", "exposure"]
        .iter()
        .any(|w| lower.contains(w))
    {
        "Camera"
    } else {
        "Other"
    }
}
