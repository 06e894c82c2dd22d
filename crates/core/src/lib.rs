//! Core types for the slipway entrypoint launcher
//!
//! slipway turns the classic container entrypoint script (stage a secrets
//! file, export an environment variable, run a configuration check, exec the
//! server) into a typed startup sequence. This crate holds the manifest
//! model, the environment map, the startup sequence itself, and the shared
//! error type.

pub mod environment;
pub mod manifest;
pub mod startup;

pub use environment::Environment;
pub use manifest::{CommandSpec, Manifest};
pub use startup::{LaunchCommand, StartupOutcome, StartupPlan};

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for slipway operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Invalid or incomplete manifest content
    #[error("Configuration error: {message}")]
    #[diagnostic(code(slipway::config::invalid))]
    Configuration {
        /// The error message describing the configuration issue
        message: String,
    },

    /// I/O error with path context
    #[error("I/O error during {operation}: {source}")]
    #[diagnostic(code(slipway::io::error))]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// The path where the I/O error occurred, if applicable
        path: Option<Box<std::path::Path>>,
        /// Description of the operation that failed
        operation: String,
    },

    /// Manifest TOML could not be deserialized
    #[error("Failed to parse manifest {}: {message}", path.display())]
    #[diagnostic(
        code(slipway::manifest::parse),
        help("Check the manifest against the documented [secrets], [env], [check], and [serve] tables")
    )]
    ManifestParse {
        /// Path of the manifest that failed to parse
        path: Box<std::path::Path>,
        /// The deserialization error message
        message: String,
    },

    /// Secret staging failed
    #[error(transparent)]
    #[diagnostic(code(slipway::secrets::stage))]
    Secrets(#[from] slipway_secrets::StageError),

    /// Process replacement returned, which only happens on failure
    #[error("Failed to exec '{command}': {source}")]
    #[diagnostic(
        code(slipway::launch::exec),
        help("Verify the serve command exists and is executable inside the container image")
    )]
    Launch {
        /// The command that could not replace the process image
        command: String,
        /// The error returned by the exec primitive
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a configuration error with a message
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an I/O error with context
    pub fn io(source: std::io::Error, path: Option<PathBuf>, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: path.map(|p| p.into_boxed_path()),
            operation: operation.into(),
        }
    }

    /// Create a manifest parse error
    pub fn manifest_parse(path: &std::path::Path, message: impl Into<String>) -> Self {
        Self::ManifestParse {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for slipway operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_message() {
        let err = Error::configuration("serve command is empty");
        assert_eq!(
            err.to_string(),
            "Configuration error: serve command is empty"
        );
    }

    #[test]
    fn test_io_error_carries_operation() {
        let err = Error::io(
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            Some(PathBuf::from("/etc/slipway/slipway.toml")),
            "read manifest",
        );
        assert!(err.to_string().contains("read manifest"));
    }

    #[test]
    fn test_stage_error_converts() {
        let err: Error = slipway_secrets::StageError::SourceMissing {
            path: PathBuf::from("/run/secrets/app"),
        }
        .into();
        assert!(matches!(err, Error::Secrets(_)));
        assert!(err.to_string().contains("/run/secrets/app"));
    }
}
