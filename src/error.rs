//! Structured error handling and exit codes.

use serde::Serialize;

/// Exit codes for the dupesig application.
///
/// - 0: Success (completed normally, clones found)
/// - 1: General error (unexpected failure)
/// - 2: No clones found (completed normally)
/// - 3: Partial success (completed with some non-fatal scan errors)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: Scan completed and clones were found.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// No clones: Scan completed but no duplicate files were found.
    NoClones = 2,
    /// Partial success: Scan completed but some files could not be processed.
    PartialSuccess = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DS000",
            Self::GeneralError => "DS001",
            Self::NoClones => "DS002",
            Self::PartialSuccess => "DS003",
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DS001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
        }
    }
}
