//! slipway CLI library
//!
//! The binary in `main.rs` is a thin shell over these modules: `cli` defines
//! the argument surface and error-to-exit-code mapping, `tracing` configures
//! structured logging, and `commands` holds one handler per subcommand.

pub mod cli;
pub mod commands;
pub mod tracing;

pub use slipway_core::{Error, Result};
