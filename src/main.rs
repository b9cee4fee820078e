//! pipdesk CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use pipdesk::cli::{Cli, CommandContext, CommandDispatcher, Commands};
use pipdesk::commands::{Backend, ErrorPayload};
use pipdesk::config::load_config;
use pipdesk::state::SelectionStore;
use pipdesk::ui::{create_ui, OutputMode};
use pipdesk::PipdeskError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
///
/// Logs go to stderr; stdout belongs to command output and `serve` frames.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("pipdesk=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pipdesk=info"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn report_json_error(err: &PipdeskError) {
    let payload = serde_json::json!({ "error": ErrorPayload::from(err) });
    println!("{}", payload);
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("pipdesk starting with args: {:?}", cli);

    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    let output_mode = OutputMode::from_flags(cli.verbose, cli.quiet);
    let serving = matches!(cli.command, Commands::Serve);
    let mut ui = create_ui(!cli.json && !serving, output_mode);

    let setup = load_config(cli.config.as_deref()).and_then(|config| {
        let store = if config.persist_selection {
            SelectionStore::user_default()
        } else {
            None
        };
        Backend::new(config).map(|backend| CommandContext::new(backend, cli.json, store))
    });
    let ctx = match setup {
        Ok(ctx) => ctx,
        Err(e) => {
            if cli.json {
                report_json_error(&e);
            } else {
                ui.error(&format!("Error: {}", e));
            }
            return ExitCode::from(1);
        }
    };

    ctx.restore_selection();
    let dispatcher = CommandDispatcher::new(ctx);

    match dispatcher.dispatch(&cli, ui.as_mut()) {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            if cli.json {
                report_json_error(&e);
            } else {
                ui.error(&format!("Error: {}", e));
            }
            ExitCode::from(1)
        }
    }
}
