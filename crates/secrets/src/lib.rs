//! Secret file staging for slipway
//!
//! Container deployments inject secrets as files at fixed paths (Docker and
//! Kubernetes secret mounts). Before the server starts, those files must be
//! placed where the server's configuration expects them. This crate moves
//! opaque secret blobs into configuration targets, either overwriting the
//! target or appending to it.
//!
//! Secret content is never parsed and never logged; tracing records paths
//! and byte counts only.

mod stage;

pub use stage::{StageAction, StageReport, stage, stage_all};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Error types for secret staging
#[derive(Debug, Error)]
pub enum StageError {
    /// The injected secrets file does not exist
    #[error("Secrets file not found: {}", path.display())]
    SourceMissing {
        /// Path that was expected to hold the injected secret
        path: PathBuf,
    },

    /// The injected secrets file exists but could not be read
    #[error("Failed to read secrets file {}: {source}", path.display())]
    SourceUnreadable {
        /// Path of the unreadable secrets file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configuration target could not be written
    #[error("Failed to write configuration target {}: {source}", path.display())]
    TargetUnwritable {
        /// Path of the configuration target
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// How a secret file is placed into its configuration target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageMode {
    /// Replace the target with the secret bytes
    #[default]
    Overwrite,
    /// Append the secret bytes to the target, creating it if missing
    Append,
}

/// A secret file to stage into a configuration location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretFile {
    /// Path of the injected secrets file (owned by the deployment system)
    pub source: PathBuf,

    /// Configuration path the server will read from
    pub target: PathBuf,

    /// Placement mode
    #[serde(default)]
    pub mode: StageMode,
}

impl SecretFile {
    /// Create a spec that overwrites the target with the secret
    #[must_use]
    pub fn overwrite(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            mode: StageMode::Overwrite,
        }
    }

    /// Create a spec that appends the secret to the target
    #[must_use]
    pub fn append(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            mode: StageMode::Append,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_mode_default_is_overwrite() {
        assert_eq!(StageMode::default(), StageMode::Overwrite);
    }

    #[test]
    fn test_stage_mode_deserializes_lowercase() {
        let mode: StageMode = serde_json::from_str("\"append\"").unwrap();
        assert_eq!(mode, StageMode::Append);
    }

    #[test]
    fn test_secret_file_mode_defaults_when_absent() {
        let json = r#"{"source": "/run/secrets/app", "target": "/deploy/config/secrets.yml"}"#;
        let spec: SecretFile = serde_json::from_str(json).unwrap();
        assert_eq!(spec.mode, StageMode::Overwrite);
        assert_eq!(spec.source, PathBuf::from("/run/secrets/app"));
    }

    #[test]
    fn test_error_messages_name_the_path() {
        let err = StageError::SourceMissing {
            path: PathBuf::from("/run/secrets/app"),
        };
        assert!(err.to_string().contains("/run/secrets/app"));
    }
}
