// src/main.rs
mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use commands::LaunchOptions;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // diagnostics go to stderr; stdout carries the followed log and dry-run JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.cmd {
        // ─────────────────────────── status ────────────────────────────────
        Some(Commands::Status { script }) => commands::run_status(&cli.root, &script),

        // ──────────────────────────── stop ─────────────────────────────────
        Some(Commands::Stop { script }) => commands::run_stop(&cli.root, &script),

        // ─────────────────────── launch (default) ──────────────────────────
        None => {
            let args = cli.launch;
            match (args.script, args.config) {
                (Some(script), Some(config)) => {
                    commands::run_launch(LaunchOptions {
                        root: cli.root,
                        script,
                        config,
                        interpreter: args.interpreter,
                        pull: !args.no_pull,
                        follow: !args.no_follow,
                        dry_run: args.dry_run,
                    })
                    .await
                }
                _ => Err(anyhow::anyhow!("usage: invoke <SCRIPT> <CONFIG>")),
            }
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
