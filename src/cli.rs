use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "invoke",
    version = env!("CARGO_PKG_VERSION"),
    about = "Launch a training script in the background from a YAML config",
    subcommand_negates_reqs = true
)]
pub struct Cli {
    /// working root holding entry points, logs/ and pid files
    #[arg(long, env = "INVOKE_ROOT", default_value = ".", global = true)]
    pub root: PathBuf,

    #[command(subcommand)]
    pub cmd: Option<Commands>,

    #[command(flatten)]
    pub launch: LaunchArgs,
}

#[derive(Args)]
pub struct LaunchArgs {
    /// entry point relative to the root, e.g. train.py
    #[arg(required = true)]
    pub script: Option<String>,

    /// run config (.yaml / .yml)
    #[arg(required = true)]
    pub config: Option<PathBuf>,

    /// program that runs the entry point
    #[arg(long, env = "INVOKE_INTERPRETER", default_value = "python3")]
    pub interpreter: String,

    /// skip the `git pull` before launching
    #[arg(long)]
    pub no_pull: bool,

    /// never follow the log, even on a terminal
    #[arg(long)]
    pub no_follow: bool,

    /// print the synthesized launch as JSON and exit
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Is the last launch of a script still running?
    Status { script: String },

    /// Send SIGTERM to the last launch of a script
    Stop { script: String },
}
