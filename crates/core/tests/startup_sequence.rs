//! End-to-end startup sequence tests against real child processes
//!
//! Each test builds a manifest in a temp directory and drives
//! `StartupPlan::preflight`, checking the observable contract: staging
//! precedes validation, validation gates the launch, exit codes propagate,
//! and the sequence is idempotent across container restarts.

use slipway_core::{Manifest, StartupOutcome, StartupPlan};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

fn load_plan(dir: &TempDir, manifest_toml: &str) -> StartupPlan {
    let path = dir.path().join("slipway.toml");
    write(&path, manifest_toml);
    StartupPlan::from_manifest(Manifest::load(&path).unwrap())
}

/// A check command that records its invocation in a marker file, then exits
/// with the given code.
fn marking_check(marker: &Path, code: i32) -> String {
    format!(
        "command = \"sh\"\nargs = [\"-c\", \"echo ran >> {}; exit {}\"]",
        marker.display(),
        code
    )
}

#[tokio::test]
async fn missing_secrets_file_fails_before_validation() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("check-ran");
    let manifest = format!(
        r#"
[[secrets]]
source = "{missing}"
target = "{target}"

[check]
{check}

[serve]
command = "app"
"#,
        missing = dir.path().join("absent-secret").display(),
        target = dir.path().join("config/secrets.yml").display(),
        check = marking_check(&marker, 0),
    );

    let plan = load_plan(&dir, &manifest);
    let result = plan.preflight().await;

    assert!(result.is_err());
    assert!(!marker.exists(), "validator must not run when staging fails");
}

#[tokio::test]
async fn failing_validator_blocks_launch_and_propagates_code() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("check-ran");
    let manifest = format!(
        "[check]\n{}\n\n[serve]\ncommand = \"app\"\n",
        marking_check(&marker, 42)
    );

    let plan = load_plan(&dir, &manifest);
    let outcome = plan.preflight().await.unwrap();

    assert!(matches!(
        outcome,
        StartupOutcome::ValidationFailed { code: 42 }
    ));
    assert!(marker.exists());
}

#[tokio::test]
async fn passing_validator_resolves_launch_exactly_once() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("check-ran");
    let manifest = format!(
        "[check]\n{}\n\n[serve]\ncommand = \"gunicorn\"\nargs = [\"-c\", \"/deploy/gunicorn_config.py\"]\n",
        marking_check(&marker, 0)
    );

    let plan = load_plan(&dir, &manifest);
    let outcome = plan.preflight().await.unwrap();

    match outcome {
        StartupOutcome::ReadyToLaunch(launch) => {
            assert_eq!(launch.command, "gunicorn");
            assert_eq!(launch.args, ["-c", "/deploy/gunicorn_config.py"]);
        }
        StartupOutcome::ValidationFailed { code } => {
            panic!("expected launch, validator exited {code}")
        }
    }
    assert_eq!(
        std::fs::read_to_string(&marker).unwrap().lines().count(),
        1,
        "validator runs exactly once"
    );
}

#[tokio::test]
async fn env_export_precedes_validation() {
    let dir = TempDir::new().unwrap();
    let config_dir = dir.path().join("config");
    std::fs::create_dir_all(&config_dir).unwrap();

    // The validator fails unless it observes the exported variable.
    let manifest = format!(
        r#"
[env]
APP_CONFIG = "{config}"

[check]
command = "sh"
args = ["-c", "test -d \"$APP_CONFIG\""]

[serve]
command = "app"
"#,
        config = config_dir.display(),
    );

    let plan = load_plan(&dir, &manifest);
    let outcome = plan.preflight().await.unwrap();

    assert!(matches!(outcome, StartupOutcome::ReadyToLaunch(_)));
}

#[tokio::test]
async fn validator_sees_staged_secret_content() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("injected");
    let target = dir.path().join("config/secrets.yml");
    write(&source, "uri: mongodb://db\n");

    let manifest = format!(
        r#"
[[secrets]]
source = "{source}"
target = "{target}"

[check]
command = "grep"
args = ["-q", "mongodb://db", "{target}"]

[serve]
command = "app"
"#,
        source = source.display(),
        target = target.display(),
    );

    let plan = load_plan(&dir, &manifest);
    let outcome = plan.preflight().await.unwrap();

    assert!(matches!(outcome, StartupOutcome::ReadyToLaunch(_)));
}

#[tokio::test]
async fn repeated_preflight_reaches_the_same_outcome() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("injected");
    let target = dir.path().join("config/config.yml");
    write(&source, "password: hunter2\n");
    write(&target, "bind: 0.0.0.0:8000\n");

    // Append mode is the variant most at risk of drifting across restarts.
    let manifest = format!(
        r#"
[[secrets]]
source = "{source}"
target = "{target}"
mode = "append"

[check]
command = "sh"
args = ["-c", "test $(grep -c hunter2 {target}) -eq 1"]

[serve]
command = "app"
"#,
        source = source.display(),
        target = target.display(),
    );

    let plan = load_plan(&dir, &manifest);
    for _ in 0..2 {
        let outcome = plan.preflight().await.unwrap();
        assert!(matches!(outcome, StartupOutcome::ReadyToLaunch(_)));
    }

    let staged = std::fs::read_to_string(&target).unwrap();
    assert_eq!(staged, "bind: 0.0.0.0:8000\npassword: hunter2\n");
}

#[tokio::test]
async fn manifest_validation_rejects_unlaunchable_plans() {
    let dir = TempDir::new().unwrap();
    let path: PathBuf = dir.path().join("slipway.toml");
    write(&path, "[serve]\ncommand = \"\"\n");

    assert!(Manifest::load(&path).is_err());
}
