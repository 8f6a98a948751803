//! # EqualSpeak - gendered language detector
//!
//! Flags gendered terms in text, scores how biased the text reads, and suggests
//! neutral replacements that can be applied word by word.
//!
//! ## Features
//! - One-shot analysis (`analyze`) and suggestion application (`apply`)
//! - Interactive debounced session (`watch`, the default)
//! - Table-based or chat-model-based suggestions, optional semantic scoring
//! - Configuration via environment / `.env`, API key kept out of the binary

mod cli;
mod core;
mod run;

use std::io;

use clap::{CommandFactory, Parser};
use dotenv::dotenv;

use cli::{Args, Commands};

/// Print a user-facing error (Display, not Debug) and exit with status 1.
fn exit_on_error(result: Result<(), Box<dyn std::error::Error>>) {
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application entry point.
///
/// Handles:
/// - Environment configuration via dotenv
/// - CLI argument parsing and logger setup
/// - Dispatch to one-shot commands or the interactive session
#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv().ok();

    let args = Args::parse();
    run::init_logger(&args);

    // Commands that need no configuration.
    match &args.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = Args::command();
            cli::generate(*shell, &mut cmd, core::app::NAME, &mut io::stdout());
            return;
        }
        Some(Commands::Apply {
            text,
            position,
            replacement,
            original,
        }) => {
            exit_on_error(run::run_apply(
                text.as_deref(),
                *position,
                replacement,
                original.as_deref(),
            ));
            return;
        }
        Some(Commands::Terms { query }) => {
            run::run_terms(&core::terms::active(), query.as_deref());
            return;
        }
        Some(Commands::SetKey) => {
            exit_on_error(run::run_set_key());
            return;
        }
        _ => {}
    }

    // Load application configuration
    let config = run::load_config(&args).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let result = match &args.command {
        Some(Commands::Analyze { text, json }) => {
            run::run_analyze(&config, text.as_deref(), *json).await
        }
        Some(Commands::Config) => {
            run::run_show_config(&config);
            Ok(())
        }
        _ => run::run_watch(&config).await,
    };
    exit_on_error(result);
}
