//! CLI argument surface, error rendering, and exit-code mapping

use clap::{Parser, Subcommand};
use miette::{Diagnostic, Report};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Exit code for successful runs
pub const EXIT_OK: i32 = 0;
/// CLI or configuration error exit code
pub const EXIT_CLI: i32 = 2;
/// Staging, I/O, or launch error exit code
pub const EXIT_RUNTIME: i32 = 3;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// CLI or configuration error (exit code 2)
    #[error("CLI/configuration error: {message}")]
    #[diagnostic(code(slipway::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Staging, I/O, or launch error (exit code 3)
    #[error("{message}")]
    #[diagnostic(code(slipway::cli::runtime))]
    Runtime {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new configuration error with help text
    #[must_use]
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a new runtime error
    #[must_use]
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new runtime error with help text
    #[must_use]
    pub fn runtime_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
            help: Some(help.into()),
        }
    }
}

/// Convert `slipway_core::Error` to the appropriate `CliError` variant.
///
/// Manifest problems are user-facing configuration mistakes (exit code 2);
/// staging, I/O, and launch failures are runtime errors (exit code 3).
impl From<slipway_core::Error> for CliError {
    fn from(err: slipway_core::Error) -> Self {
        match err {
            // Extract just the message to avoid "Configuration error: Configuration error:"
            slipway_core::Error::Configuration { message } => Self::config(message),
            slipway_core::Error::ManifestParse { .. } => Self::config_with_help(
                err.to_string(),
                "Check the manifest against the documented [secrets], [env], [check], and [serve] tables",
            ),
            slipway_core::Error::Secrets(e) => Self::runtime_with_help(
                e.to_string(),
                "Verify the deployment injected the secrets file and the configuration target is writable",
            ),
            slipway_core::Error::Io {
                source,
                path,
                operation,
            } => {
                let path_str = path
                    .as_ref()
                    .map_or(String::new(), |p| format!(" on {}", p.display()));
                Self::runtime_with_help(
                    format!("I/O {operation} failed{path_str}: {source}"),
                    "Check file permissions and ensure the path exists",
                )
            }
            slipway_core::Error::Launch { .. } => Self::runtime_with_help(
                err.to_string(),
                "Verify the serve command exists and is executable inside the container image",
            ),
        }
    }
}

/// Map CLI error to appropriate exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } => EXIT_CLI,
        CliError::Runtime { .. } => EXIT_RUNTIME,
    }
}

/// Render error appropriately based on the JSON flag
pub fn render_error(err: &CliError, json_mode: bool) {
    if json_mode {
        let envelope = ErrorEnvelope::new(serde_json::json!({
            "code": match err {
                CliError::Config { .. } => "config",
                CliError::Runtime { .. } => "runtime",
            },
            "message": err.to_string()
        }));

        match serde_json::to_string(&envelope) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("Error serializing error response"),
        }
    } else {
        // Use miette for human-friendly error display
        let report = Report::new(err.clone());
        eprintln!("{report:?}");
        // Ensure output is flushed before potential process exit
        let _ = io::stderr().flush();
    }
}

/// Success response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkEnvelope<T> {
    /// Status indicator - always "ok" for success
    pub status: &'static str,
    /// The actual data payload
    pub data: T,
}

impl<T> OkEnvelope<T> {
    /// Create a new success envelope
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self { status: "ok", data }
    }
}

/// Error response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope<E> {
    /// Status indicator - always "error" for failures
    pub status: &'static str,
    /// The error details
    pub error: E,
}

impl<E> ErrorEnvelope<E> {
    /// Create a new error envelope
    #[must_use]
    pub const fn new(error: E) -> Self {
        Self {
            status: "error",
            error,
        }
    }
}

/// Main CLI entry point for slipway.
///
/// A typed container entrypoint launcher: stage secrets into the
/// configuration, validate it, and exec the server.
#[derive(Parser, Debug)]
#[command(name = "slipway")]
#[command(
    about = "Typed container entrypoint launcher: stage secrets, validate configuration, exec the server"
)]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to the startup manifest.
    #[arg(
        long,
        global = true,
        env = "SLIPWAY_MANIFEST",
        default_value = slipway_core::manifest::DEFAULT_MANIFEST_PATH,
        help = "Path to the startup manifest"
    )]
    pub manifest: PathBuf,

    /// Logging verbosity level.
    #[arg(
        short = 'L',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: crate::tracing::LogLevel,

    /// Emit JSON envelopes instead of human-readable output.
    #[arg(long, global = true, help = "Emit JSON envelopes instead of human-readable output")]
    pub json: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full entrypoint sequence: stage, validate, exec the server.
    #[command(about = "Stage secrets, validate configuration, and exec the server")]
    Run,

    /// Stage and validate only; exit with the validator's code.
    #[command(about = "Stage secrets and run the configuration check without launching")]
    Check,

    /// Stage secret files only.
    #[command(about = "Stage secret files into their configuration targets")]
    Stage,

    /// Show version information.
    #[command(about = "Show version information")]
    Version,
}

/// Parse CLI arguments from the process environment
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
