//! Error types for dsomm operations.
//!
//! This module defines [`DsommError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - `DsommError` covers the fatal paths: anything that stops a run before a
//!   probe is invoked, plus the late render failure
//! - Per-check and per-repository failures are never errors here; they end up
//!   as text in the result table (see [`crate::probes::ResolutionError`])
//! - Use `anyhow::Error` (via `DsommError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for dsomm operations.
#[derive(Debug, Error)]
pub enum DsommError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse a settings or registry document.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// The registry document is structurally invalid.
    #[error("Invalid registry: {message}")]
    RegistryLoadError { message: String },

    /// Two checks share a name somewhere in the registry.
    #[error("Duplicate check '{check}' in level {level} (first declared in {first_level})")]
    DuplicateCheck {
        check: String,
        level: String,
        first_level: String,
    },

    /// The selection expression matched nothing.
    #[error("No valid checks selected from '{expression}'")]
    NoChecksSelected { expression: String },

    /// No repositories were given to evaluate.
    #[error("No repositories to check")]
    NoRepositories,

    /// A required answer is missing and no one can be asked for it.
    #[error("Cannot prompt for '{key}' in non-interactive mode (no default value)")]
    PromptUnavailable { key: String },

    /// The run was interrupted before all probes finished.
    #[error("Run cancelled; partial results were discarded")]
    Cancelled,

    /// Results could not be written to the requested destination.
    #[error("Failed to write results to {path}: {message}")]
    RenderError { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DsommError {
    /// Process exit code for this error.
    ///
    /// Setup problems exit 1, output problems exit 2 and an interrupted run
    /// exits 130 like any other SIGINT'd process.
    pub fn exit_code(&self) -> i32 {
        match self {
            DsommError::RenderError { .. } => 2,
            DsommError::Cancelled => 130,
            _ => 1,
        }
    }
}

/// Result type alias for dsomm operations.
pub type Result<T> = std::result::Result<T, DsommError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_not_found_displays_path() {
        let err = DsommError::ConfigNotFound {
            path: PathBuf::from("/foo/levels.yml"),
        };
        assert!(err.to_string().contains("/foo/levels.yml"));
    }

    #[test]
    fn config_parse_error_displays_path_and_message() {
        let err = DsommError::ConfigParseError {
            path: PathBuf::from("/config.yml"),
            message: "invalid syntax".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/config.yml"));
        assert!(msg.contains("invalid syntax"));
    }

    #[test]
    fn duplicate_check_names_both_levels() {
        let err = DsommError::DuplicateCheck {
            check: "l1_1_automated_prs".into(),
            level: "LEVEL2".into(),
            first_level: "LEVEL1".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("l1_1_automated_prs"));
        assert!(msg.contains("LEVEL2"));
        assert!(msg.contains("LEVEL1"));
    }

    #[test]
    fn no_checks_selected_displays_expression() {
        let err = DsommError::NoChecksSelected {
            expression: "LEVEL9".into(),
        };
        assert!(err.to_string().contains("LEVEL9"));
    }

    #[test]
    fn exit_codes_follow_error_kind() {
        assert_eq!(DsommError::NoRepositories.exit_code(), 1);
        assert_eq!(DsommError::Cancelled.exit_code(), 130);
        let render = DsommError::RenderError {
            path: PathBuf::from("/readonly/dsomm.csv"),
            message: "permission denied".into(),
        };
        assert_eq!(render.exit_code(), 2);
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: DsommError = io_err.into();
        assert!(matches!(err, DsommError::Io(_)));
    }
}
