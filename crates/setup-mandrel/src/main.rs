//! setup-mandrel CLI entry point.

// The CLI is the one place that prints results and diagnostics.
#![allow(clippy::print_stdout, clippy::print_stderr)]

use setup_mandrel::cli::{self, CliError, EXIT_OK, OkEnvelope, exit_code_for, render_error};
use setup_mandrel::tracing::{TracingConfig, init_tracing};

fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::parse();
    let json_mode = cli.json;

    let tracing_config = TracingConfig::from_verbosity(cli.log_format, cli.verbose, cli.quiet);
    if let Err(e) = init_tracing(&tracing_config) {
        render_error(&CliError::config(e.to_string()), json_mode);
        std::process::exit(cli::EXIT_CLI);
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Fatal error: Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    let exit_code = match runtime.block_on(setup_mandrel::run(&cli)) {
        Ok(output) => {
            if json_mode {
                match serde_json::to_string(&OkEnvelope::new(output.data)) {
                    Ok(json) => println!("{json}"),
                    Err(e) => eprintln!("Error serializing response: {e}"),
                }
            } else if !output.text.is_empty() {
                println!("{}", output.text);
            }
            EXIT_OK
        }
        Err(err) => {
            tracing::debug!(error = %err, "Command failed");
            render_error(&err, json_mode);
            exit_code_for(&err)
        }
    };

    std::process::exit(exit_code);
}
