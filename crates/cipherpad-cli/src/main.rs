//! Cipherpad CLI - a password-gated notepad that encrypts every note body
//!
//! This is the command-line interface for Cipherpad. It provides a
//! user-friendly interface to the core library functionality.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod output;
mod security;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cipherpad_core::CipherpadError;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::commands::{account, init, misc, notes};
use crate::constants::env_vars;
use crate::errors::{classify, CliError};

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let ctx = AppContext::new(&cli);

    if let Err(e) = run(&ctx, &cli) {
        exit_with_error(e)
    }
}

/// Log to stderr, filtered by `CIPHERPAD_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_env(env_vars::LOG).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn exit_with_error(err: anyhow::Error) -> ! {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        cli_err.exit()
    }
    if let Some(cli_err) = err.downcast_ref::<CipherpadError>().and_then(classify) {
        cli_err.exit()
    }
    eprintln!("Error: {:#}", err);
    std::process::exit(1)
}

fn run(ctx: &AppContext, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Init(args) => init::handle_init(ctx, args),
        Commands::Passwd => account::handle_passwd(ctx),
        Commands::Add(args) => notes::handle_add(ctx, args),
        Commands::List(args) => notes::handle_list(ctx, args),
        Commands::Show(args) => notes::handle_show(ctx, args),
        Commands::Edit(args) => notes::handle_edit(ctx, args),
        Commands::Delete(args) => notes::handle_delete(ctx, args),
        Commands::Rekey => account::handle_rekey(ctx),
        Commands::Completions(args) => misc::handle_completions(args),
    }
}
