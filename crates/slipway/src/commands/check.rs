//! Check command: preflight without launching

use crate::cli::EXIT_OK;
use slipway_core::{Result, StartupOutcome};
use std::path::Path;
use tracing::instrument;

/// Stage secrets, export the environment, and run the configuration check,
/// but never launch. Exit 0 when the sequence would launch, otherwise the
/// validator's own exit code.
///
/// Useful for orchestrator health tooling and CI: the same gate the
/// entrypoint applies, without side effects beyond staging.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded, staging fails, or the
/// validator cannot be spawned.
#[instrument(name = "check", skip_all, fields(manifest = %manifest_path.display()))]
pub async fn execute_check(manifest_path: &Path) -> Result<i32> {
    let plan = super::load_plan(manifest_path)?;

    match plan.preflight().await? {
        StartupOutcome::ValidationFailed { code } => Ok(code),
        StartupOutcome::ReadyToLaunch(launch) => {
            tracing::info!(command = %launch.command, "Configuration is ready to launch");
            Ok(EXIT_OK)
        }
    }
}
