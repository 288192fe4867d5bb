//! Command implementations for the invoke CLI

use anyhow::{Context, Result};
use invoke::constants::{LATEST_LOG, LOG_DIR};
use invoke::control::{self, Liveness, StopResult};
use invoke::follow::{FollowOutcome, Follower};
use invoke::launch::{launch, LaunchSpec};
use invoke::registry::ProcessRegistry;
use invoke::synth::{script_stem, synthesize};
use invoke::{config, hooks};
use serde::Serialize;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub struct LaunchOptions {
    pub root: PathBuf,
    pub script: String,
    pub config: PathBuf,
    pub interpreter: String,
    pub pull: bool,
    pub follow: bool,
    pub dry_run: bool,
}

#[derive(Serialize)]
struct DryRun<'a> {
    entry_point: &'a Path,
    log_path: &'a Path,
    root_path: &'a Path,
    args: &'a [String],
}

/// pull → load → synthesize → launch → record pid → (follow)
pub async fn run_launch(opts: LaunchOptions) -> Result<()> {
    let root = opts
        .root
        .canonicalize()
        .with_context(|| format!("working root {}", opts.root.display()))?;

    if opts.pull && !opts.dry_run {
        hooks::pull_latest(&root).await;
    }

    let doc = config::load(&opts.config)?;
    let stem = script_stem(&opts.script);
    let synthesis = synthesize(&doc, stem)?;

    let spec = LaunchSpec {
        root: root.clone(),
        interpreter: opts.interpreter,
        script: opts.script.clone(),
        config_path: opts.config.clone(),
        args: synthesis.args,
    };

    if opts.dry_run {
        let entry = spec.entry_point();
        let out = DryRun {
            entry_point: &entry,
            log_path: &synthesis.paths.dynamic_log_path,
            root_path: &synthesis.paths.dynamic_root_path,
            args: &spec.args,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let mut record = launch(&spec)?;
    let registry = ProcessRegistry::new(&root);
    registry.record(stem, record.pid)?;

    println!("🚀 launched {} (pid {})", opts.script, record.pid);
    println!("   log: {}", record.log_path.display());

    let latest = root.join(LOG_DIR).join(LATEST_LOG);
    if !opts.follow || !std::io::stdout().is_terminal() {
        println!("follow with: tail -f {}", latest.display());
        return Ok(());
    }

    let mut follower = Follower::new(&record.log_path, tokio::io::stdout());
    match follower.run(&mut record.child, interrupt()).await? {
        FollowOutcome::Exited(status) => {
            info!(pid = record.pid, %status, "launched process exited");
            println!("\n✔ process {} exited ({status})", record.pid);
        }
        FollowOutcome::Interrupted => {
            println!(
                "\n⏹ stopped following; process {} keeps running (tail -f {})",
                record.pid,
                latest.display()
            );
        }
    }
    Ok(())
}

/// Resolves on Ctrl-C. If the handler cannot be installed, never resolves.
async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

pub fn run_status(root: &Path, script: &str) -> Result<()> {
    let registry = ProcessRegistry::new(root);
    let pid = registry.lookup(script_stem(script))?;
    match control::probe(pid)? {
        Liveness::Running => println!("{script}: running (pid {pid})"),
        Liveness::Gone => println!("{script}: not running (last pid {pid})"),
    }
    Ok(())
}

pub fn run_stop(root: &Path, script: &str) -> Result<()> {
    let registry = ProcessRegistry::new(root);
    let pid = registry.lookup(script_stem(script))?;
    match control::stop(pid)? {
        StopResult::Signalled => println!("sent SIGTERM to {script} (pid {pid})"),
        StopResult::AlreadyExited => println!("{script}: already exited (pid {pid})"),
    }
    Ok(())
}
