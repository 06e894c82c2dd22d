//! Stage command: place secret files without validating or launching

use crate::cli::{EXIT_OK, OkEnvelope};
use slipway_core::Result;
use slipway_secrets::{StageAction, StageReport};
use std::path::Path;
use tracing::instrument;

/// Stage every secret file from the manifest and report what changed.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded or staging fails.
#[instrument(name = "stage", skip_all, fields(manifest = %manifest_path.display()))]
pub async fn execute_stage(manifest_path: &Path, json_mode: bool) -> Result<i32> {
    let plan = super::load_plan(manifest_path)?;
    let reports = plan.stage_secrets().await?;
    render_reports(&reports, json_mode);
    Ok(EXIT_OK)
}

#[allow(clippy::print_stdout)]
fn render_reports(reports: &[StageReport], json_mode: bool) {
    if json_mode {
        let data: Vec<_> = reports
            .iter()
            .map(|r| {
                serde_json::json!({
                    "target": r.target,
                    "bytes": r.bytes,
                    "action": action_str(r.action),
                })
            })
            .collect();
        if let Ok(json) = serde_json::to_string(&OkEnvelope::new(data)) {
            println!("{json}");
        }
    } else if reports.is_empty() {
        println!("no secret files configured");
    } else {
        for report in reports {
            println!(
                "{:9} {} ({} bytes)",
                action_str(report.action),
                report.target.display(),
                report.bytes
            );
        }
    }
}

const fn action_str(action: StageAction) -> &'static str {
    match action {
        StageAction::Written => "written",
        StageAction::Appended => "appended",
        StageAction::Unchanged => "unchanged",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_stage_places_secrets_and_exits_zero() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("injected");
        let target = dir.path().join("config/secrets.yml");
        std::fs::write(&source, b"uri: mongodb://db\n").unwrap();

        let manifest = format!(
            "[[secrets]]\nsource = \"{}\"\ntarget = \"{}\"\n\n[serve]\ncommand = \"app\"\n",
            source.display(),
            target.display()
        );
        let path = dir.path().join("slipway.toml");
        std::fs::write(&path, manifest).unwrap();

        assert_eq!(execute_stage(&path, false).await.unwrap(), EXIT_OK);
        assert_eq!(std::fs::read(&target).unwrap(), b"uri: mongodb://db\n");
    }

    #[tokio::test]
    async fn test_stage_missing_source_fails() {
        let dir = TempDir::new().unwrap();
        let manifest = format!(
            "[[secrets]]\nsource = \"{}\"\ntarget = \"{}\"\n\n[serve]\ncommand = \"app\"\n",
            dir.path().join("absent").display(),
            dir.path().join("out").display()
        );
        let path = dir.path().join("slipway.toml");
        std::fs::write(&path, manifest).unwrap();

        assert!(execute_stage(&path, false).await.is_err());
    }
}
