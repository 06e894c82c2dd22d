//! slipway CLI application
//!
//! A typed container entrypoint launcher. `slipway run` stages injected
//! secret files into the configuration, exports environment variables, runs
//! the configuration check, and on success replaces this process with the
//! server command, so the server inherits PID 1 and the container's signal
//! handling.

// CLI binary needs to output to stdout/stderr - this is intentional
#![allow(clippy::print_stdout, clippy::print_stderr)]

use slipway::cli::{self, CliError, exit_code_for, render_error};
use slipway::commands;
use slipway::tracing::{Level, TracingConfig, TracingFormat, init_tracing};

fn main() {
    // NOTE: Using eprintln! in the panic hook is intentional - tracing
    // infrastructure may be corrupted during a panic.
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::parse();
    std::process::exit(run(cli));
}

fn run(cli: cli::Cli) -> i32 {
    let tracing_config = TracingConfig {
        format: if cli.json {
            TracingFormat::Json
        } else {
            TracingFormat::Compact
        },
        level: Level::from(cli.level.clone()),
    };
    // Ignore error if tracing is already initialized (e.g., in tests)
    let _ = init_tracing(tracing_config);

    let Some(command) = cli.command else {
        let err = CliError::config_with_help(
            "No subcommand provided",
            "Run 'slipway --help' for usage information",
        );
        render_error(&err, cli.json);
        return exit_code_for(&err);
    };

    // Version is the sync fast path; everything else does I/O
    if let cli::Commands::Version = command {
        return commands::execute_version(cli.json);
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Fatal error: Failed to create tokio runtime: {e}");
            return 1;
        }
    };

    let result = rt.block_on(async {
        match command {
            cli::Commands::Run => commands::run::execute_run(&cli.manifest).await,
            cli::Commands::Check => commands::check::execute_check(&cli.manifest).await,
            cli::Commands::Stage => commands::stage::execute_stage(&cli.manifest, cli.json).await,
            cli::Commands::Version => unreachable!("handled on the sync path"),
        }
    });

    match result {
        Ok(code) => code,
        Err(err) => {
            let cli_err = CliError::from(err);
            render_error(&cli_err, cli.json);
            exit_code_for(&cli_err)
        }
    }
}
