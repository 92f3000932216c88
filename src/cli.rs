//! Command-line interface definitions for dupesig.
//!
//! All CLI arguments, subcommands, and options via the clap derive API,
//! with global options (verbosity, structured errors) and subcommands for
//! scanning and introspection.
//!
//! # Example
//!
//! ```bash
//! # Scan a directory for duplicate files
//! dupesig scan ~/Downloads
//!
//! # Scan with byte-for-byte verification of matches and a JSON report
//! dupesig scan ~/Downloads --verify --json
//!
//! # List the available byte-size display formats
//! dupesig formats
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::format::ByteFormat;

/// Fast duplicate file detection via sampling signatures.
///
/// dupesig fingerprints files with four positional samples plus a 4 KiB
/// prefix hash instead of hashing full contents, then groups files whose
/// fingerprints collide.
#[derive(Debug, Parser)]
#[command(name = "dupesig")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Emit errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for dupesig.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan directories for duplicate files
    Scan(ScanArgs),
    /// List available byte-size display formats
    Formats,
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directories to scan for duplicates
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Number of index buckets (fixed for the scan, never resized)
    ///
    /// Size this relative to the expected number of unique files.
    #[arg(long, value_name = "N", default_value = "65536", env = "DUPESIG_BUCKETS")]
    pub bucket_count: usize,

    /// Minimum file size to fingerprint, in bytes
    ///
    /// Files under 4 bytes can never be fingerprinted and are always skipped.
    #[arg(long, value_name = "BYTES", default_value = "4")]
    pub min_size: u64,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Follow symbolic links during scan
    ///
    /// Warning: May cause infinite loops if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Number of fingerprint threads (default: 4)
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N", default_value = "4")]
    pub threads: usize,

    /// Verify matches byte-for-byte before declaring a clone
    ///
    /// Slower; rules out the sampling design's false positives.
    #[arg(long)]
    pub verify: bool,

    /// Byte-size display format for the summary (see `dupesig formats`)
    #[arg(long, value_name = "FORMAT", default_value = "si")]
    pub byte_format: ByteFormat,

    /// Print the full report as JSON instead of a human summary
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_scan() {
        let cli = Cli::try_parse_from(["dupesig", "scan", "/tmp"]).unwrap();
        match cli.command {
            Commands::Scan(args) => {
                assert_eq!(args.paths, [PathBuf::from("/tmp")]);
                assert_eq!(args.bucket_count, 65536);
                assert_eq!(args.threads, 4);
                assert!(!args.verify);
                assert_eq!(args.byte_format, ByteFormat::Si);
            }
            Commands::Formats => panic!("expected scan"),
        }
    }

    #[test]
    fn test_cli_scan_requires_path() {
        assert!(Cli::try_parse_from(["dupesig", "scan"]).is_err());
    }

    #[test]
    fn test_cli_parses_options() {
        let cli = Cli::try_parse_from([
            "dupesig",
            "-v",
            "scan",
            "/a",
            "/b",
            "--bucket-count",
            "1024",
            "--verify",
            "--byte-format",
            "iec",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Scan(args) => {
                assert_eq!(args.paths.len(), 2);
                assert_eq!(args.bucket_count, 1024);
                assert!(args.verify);
                assert_eq!(args.byte_format, ByteFormat::Binary);
            }
            Commands::Formats => panic!("expected scan"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["dupesig", "-v", "-q", "scan", "/tmp"]).is_err());
    }

    #[test]
    fn test_cli_parses_formats() {
        let cli = Cli::try_parse_from(["dupesig", "formats"]).unwrap();
        assert!(matches!(cli.command, Commands::Formats));
    }
}
