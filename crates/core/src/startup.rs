//! The typed startup sequence: stage, export, validate, launch
//!
//! A [`StartupPlan`] is built from a [`Manifest`] and driven in two explicit
//! steps. [`StartupPlan::preflight`] stages secrets, exports the
//! environment, and runs the validator, returning a [`StartupOutcome`] that
//! distinguishes "validation failed" from "ready to launch". Launching is a
//! separate call: [`LaunchCommand::exec`] replaces the current process image
//! and never returns on success, so preflight stays testable.

use crate::environment::Environment;
use crate::manifest::{CommandSpec, Manifest};
use crate::{Error, Result};
use slipway_secrets::{SecretFile, StageReport};
use std::process::Stdio;
use tracing::instrument;

/// Exit code reported when a child dies without an exit status or signal
const EXIT_UNKNOWN: i32 = 1;

/// The fully-resolved server launch: command, arguments, environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    /// Executable name or path
    pub command: String,
    /// Arguments passed verbatim
    pub args: Vec<String>,
    /// Environment the server will observe (manifest merged over system)
    pub env: Environment,
}

impl LaunchCommand {
    /// Replace the current process image with the server command.
    ///
    /// On success this never returns: the server inherits the process ID and
    /// no slipway code runs afterwards. The only way out is failure, so the
    /// return type is the error itself.
    #[cfg(unix)]
    #[must_use = "exec only returns on failure; the error must be surfaced"]
    pub fn exec(self) -> Error {
        use std::os::unix::process::CommandExt;

        tracing::info!(command = %self.command, args = ?self.args, "Replacing process image");

        let mut cmd = std::process::Command::new(&self.command);
        cmd.args(&self.args);
        for (key, value) in self.env.merge_with_system() {
            cmd.env(key, value);
        }

        let source = cmd.exec();
        Error::Launch {
            command: self.command,
            source,
        }
    }
}

/// Result of preflight: the process either launches or exits with the
/// validator's status
#[derive(Debug)]
pub enum StartupOutcome {
    /// The validator exited non-zero; the server must not be launched
    ValidationFailed {
        /// The validator's exit code, propagated unchanged to the
        /// orchestrator (signal deaths map to the shell convention
        /// 128 + signo)
        code: i32,
    },
    /// Staging and validation passed; the launch command is fully resolved
    ReadyToLaunch(LaunchCommand),
}

/// The startup sequence for one container, built from its manifest
#[derive(Debug, Clone)]
pub struct StartupPlan {
    secrets: Vec<SecretFile>,
    env: Environment,
    check: Option<CommandSpec>,
    serve: CommandSpec,
}

impl StartupPlan {
    /// Build a plan from a validated manifest
    #[must_use]
    pub fn from_manifest(manifest: Manifest) -> Self {
        let env = manifest.env.into_iter().collect();
        Self {
            secrets: manifest.secrets,
            env,
            check: manifest.check,
            serve: manifest.serve,
        }
    }

    /// The environment the validator and server will observe
    #[must_use]
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Stage secrets only, without validating or launching.
    ///
    /// # Errors
    ///
    /// Returns the first staging failure; later secret files are not touched.
    #[instrument(name = "stage_secrets", skip(self), fields(count = self.secrets.len()))]
    pub async fn stage_secrets(&self) -> Result<Vec<StageReport>> {
        let reports = slipway_secrets::stage_all(&self.secrets).await?;
        Ok(reports)
    }

    /// Run the full preflight: stage secrets, export the environment, run
    /// the validator.
    ///
    /// The environment is merged before the validator runs, so the validator
    /// observes the same configuration reference the server will. A missing
    /// or unreadable secrets file fails the sequence before validation; a
    /// failing validator yields [`StartupOutcome::ValidationFailed`] and the
    /// server is never invoked.
    ///
    /// # Errors
    ///
    /// Returns an error if staging fails or the validator cannot be spawned
    /// at all. A validator that runs and exits non-zero is not an error; it
    /// is [`StartupOutcome::ValidationFailed`].
    #[instrument(name = "preflight", skip(self))]
    pub async fn preflight(&self) -> Result<StartupOutcome> {
        self.stage_secrets().await?;

        if let Some(check) = &self.check {
            tracing::info!(command = %check.display(), "Running configuration check");
            let code = self.run_validator(check).await?;
            if code != 0 {
                tracing::warn!(code, "Configuration check failed; server will not start");
                return Ok(StartupOutcome::ValidationFailed { code });
            }
            tracing::info!("Configuration check passed");
        } else {
            tracing::debug!("No configuration check configured");
        }

        Ok(StartupOutcome::ReadyToLaunch(LaunchCommand {
            command: self.serve.command.clone(),
            args: self.serve.args.clone(),
            env: self.env.clone(),
        }))
    }

    /// Run the validator as a child process with inherited stdio
    async fn run_validator(&self, check: &CommandSpec) -> Result<i32> {
        let mut cmd = tokio::process::Command::new(&check.command);
        cmd.args(&check.args);
        for (key, value) in self.env.merge_with_system() {
            cmd.env(key, value);
        }
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());
        cmd.stdin(Stdio::null());

        let status = cmd.status().await.map_err(|e| {
            Error::configuration(format!(
                "Failed to execute check command '{}': {}",
                check.command, e
            ))
        })?;

        Ok(exit_code(status))
    }
}

/// Map a child exit status to a shell-conventional exit code
fn exit_code(status: std::process::ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    EXIT_UNKNOWN
}
