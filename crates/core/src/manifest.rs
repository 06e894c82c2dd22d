//! Startup manifest
//!
//! A TOML file describes the whole entrypoint sequence: which secret files
//! to stage, which environment variables to export, which command validates
//! the configuration, and which command serves once validation passes.
//!
//! ```toml
//! [[secrets]]
//! source = "/run/secrets/tiled"
//! target = "/deploy/config/secrets.yml"
//! mode = "overwrite"
//!
//! [env]
//! TILED_CONFIG = "/deploy/config"
//!
//! [check]
//! command = "tiled"
//! args = ["check-config", "/deploy/config"]
//!
//! [serve]
//! command = "gunicorn"
//! args = ["-c", "/deploy/gunicorn_config.py"]
//! ```
//!
//! The three historical entrypoint variants (overwrite vs append, config by
//! path argument vs environment variable vs serve subcommand) are all
//! expressible here; none is privileged.

use crate::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

pub use slipway_secrets::{SecretFile, StageMode};

/// Default manifest location inside the container image
pub const DEFAULT_MANIFEST_PATH: &str = "/etc/slipway/slipway.toml";

/// An external command invoked by path lookup, opaque beyond its exit code
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandSpec {
    /// Executable name or path
    pub command: String,

    /// Arguments passed verbatim
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Create a command spec
    #[must_use]
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    /// Render as a single display string for logs
    #[must_use]
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, self.args.join(" "))
        }
    }
}

/// The startup manifest for one container
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Secret files to stage before anything else runs
    #[serde(default)]
    pub secrets: Vec<SecretFile>,

    /// Environment variables exported to the validator and the server
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Configuration validator; when absent, staging alone gates the launch
    #[serde(default)]
    pub check: Option<CommandSpec>,

    /// Server launch command that replaces this process on success
    pub serve: CommandSpec,
}

impl Manifest {
    /// Load and validate a manifest from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, [`Error::ManifestParse`]
    /// if it is not valid manifest TOML, and [`Error::Configuration`] if it
    /// parses but fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::io(e, Some(path.to_path_buf()), "read manifest"))?;
        let manifest: Self =
            toml::from_str(&raw).map_err(|e| Error::manifest_parse(path, e.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Check structural constraints the type system cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] naming the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        if self.serve.command.trim().is_empty() {
            return Err(Error::configuration("serve command must not be empty"));
        }
        if let Some(check) = &self.check
            && check.command.trim().is_empty()
        {
            return Err(Error::configuration("check command must not be empty"));
        }
        for key in self.env.keys() {
            if key.trim().is_empty() {
                return Err(Error::configuration(
                    "environment variable names must not be empty",
                ));
            }
        }
        for secret in &self.secrets {
            if secret.source.as_os_str().is_empty() {
                return Err(Error::configuration("secret source path must not be empty"));
            }
            if secret.target.as_os_str().is_empty() {
                return Err(Error::configuration("secret target path must not be empty"));
            }
        }
        Ok(())
    }
}
