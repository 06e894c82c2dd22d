//! Subcommand handlers
//!
//! Each handler returns `Result<i32>`: the exit code the process should
//! terminate with. `run` is the exception in spirit: on a passing check it
//! replaces the process image and never returns at all.

pub mod check;
pub mod run;
pub mod stage;

use crate::cli::{EXIT_OK, OkEnvelope};
use slipway_core::{Manifest, Result, StartupPlan};
use std::path::Path;

/// Load the manifest and build the startup plan
pub fn load_plan(manifest_path: &Path) -> Result<StartupPlan> {
    let manifest = Manifest::load(manifest_path)?;
    Ok(StartupPlan::from_manifest(manifest))
}

/// Print version information
#[allow(clippy::print_stdout)]
pub fn execute_version(json_mode: bool) -> i32 {
    if json_mode {
        let envelope = OkEnvelope::new(serde_json::json!({
            "name": "slipway",
            "version": env!("CARGO_PKG_VERSION"),
        }));
        if let Ok(json) = serde_json::to_string(&envelope) {
            println!("{json}");
        }
    } else {
        println!("slipway {}", env!("CARGO_PKG_VERSION"));
    }
    EXIT_OK
}
