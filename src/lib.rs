//! dupesig - Fast duplicate file detection via sampling signatures.
//!
//! Instead of hashing full file contents, dupesig fingerprints each file
//! with four 4-byte positional samples plus a 64-bit hash of the first
//! 4 KiB, then resolves duplicates through a fixed-bucket signature index.
//! A fingerprint match is treated as sufficient evidence of duplication;
//! optional byte-for-byte verification is available for the cautious.

pub mod cli;
pub mod error;
pub mod format;
pub mod index;
pub mod logging;
pub mod pipeline;
pub mod signature;

use anyhow::Context;

use cli::{Cli, Commands, ScanArgs};
use error::ExitCode;
use format::{format_bytes, ByteFormat};
use pipeline::{ScanConfig, ScanReport};

/// Run the application with parsed CLI arguments.
///
/// Returns the exit code the process should terminate with.
///
/// # Errors
///
/// Returns an error for failures that prevent a scan from starting or
/// completing, such as index construction failure. Per-file problems are
/// reported in the scan summary instead.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Scan(args) => run_scan(&args),
        Commands::Formats => {
            print_formats();
            Ok(ExitCode::Success)
        }
    }
}

fn run_scan(args: &ScanArgs) -> anyhow::Result<ExitCode> {
    let config = ScanConfig {
        bucket_count: args.bucket_count.max(1),
        min_size: args.min_size.max(signature::SAMPLE_WIDTH),
        skip_hidden: args.skip_hidden,
        follow_symlinks: args.follow_symlinks,
        threads: args.threads.max(1),
        verify: args.verify,
    };

    let report = pipeline::scan(&args.paths, &config).context("scan failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report, args.byte_format);
    }

    let had_skips = report.stats.fingerprint_failures > 0
        || report.stats.index_failures > 0
        || report.stats.walk_errors > 0;
    Ok(if had_skips {
        ExitCode::PartialSuccess
    } else if report.groups.is_empty() {
        ExitCode::NoClones
    } else {
        ExitCode::Success
    })
}

fn print_summary(report: &ScanReport, byte_format: ByteFormat) {
    let stats = &report.stats;

    for group in &report.groups {
        println!(
            "clone group {} ({} each):",
            group.clone_id,
            format_bytes(group.size, byte_format)
        );
        for path in &group.paths {
            println!("  {}", path.display());
        }
    }

    println!(
        "{} files scanned, {} unique, {} clones in {} groups",
        stats.files_seen, stats.unique_files, stats.clone_files, stats.clone_groups
    );
    println!(
        "reclaimable: {}",
        format_bytes(stats.reclaimable_bytes, byte_format)
    );
    if stats.fingerprint_failures > 0 || stats.walk_errors > 0 || stats.index_failures > 0 {
        println!(
            "skipped: {} unreadable, {} walk errors, {} index failures",
            stats.fingerprint_failures, stats.walk_errors, stats.index_failures
        );
    }
    if stats.verification_rejects > 0 {
        println!(
            "verification demoted {} signature matches",
            stats.verification_rejects
        );
    }
    log::debug!(
        "index diagnostics: {} collisions across buckets",
        stats.index_collisions
    );
}

fn print_formats() {
    println!("Available byte-size formats:");
    for &(name, format) in ByteFormat::all() {
        println!("  {name:<18} - {}", format.describe());
    }
}
