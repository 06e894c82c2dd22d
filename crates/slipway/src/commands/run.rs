//! Run command: the full entrypoint sequence

use slipway_core::{Result, StartupOutcome};
use std::path::Path;
use tracing::instrument;

/// Stage secrets, export the environment, run the configuration check, and
/// on success replace this process with the server command.
///
/// Returns the validator's exit code when validation fails; the container
/// orchestrator interprets it per its restart policy. On a passing check
/// this function only returns if the exec primitive itself failed.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded, staging fails, the
/// validator cannot be spawned, or process replacement fails.
#[instrument(name = "run", skip_all, fields(manifest = %manifest_path.display()))]
pub async fn execute_run(manifest_path: &Path) -> Result<i32> {
    let plan = super::load_plan(manifest_path)?;

    match plan.preflight().await? {
        StartupOutcome::ValidationFailed { code } => Ok(code),
        StartupOutcome::ReadyToLaunch(launch) => {
            // exec never returns on success; reaching Err means the process
            // image was not replaced.
            Err(launch.exec())
        }
    }
}
