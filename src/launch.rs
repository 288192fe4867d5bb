//! Process launcher: spawn the entry point detached, output appended to a fresh log.

use crate::constants::{LATEST_LOG, LOG_DIR, LOG_TS_FORMAT, MODULE_PATH_ENV};
use crate::error::{InvokeError, IoContext, Result};
use crate::synth::script_stem;
use chrono::{DateTime, Local};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::{Child, Command};

/// Everything needed to start one run.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    /// working root: entry points are resolved against it, `logs/` lives in it
    pub root: PathBuf,
    pub interpreter: String,
    /// entry point relative to `root`, e.g. `train.py`
    pub script: String,
    pub config_path: PathBuf,
    pub args: Vec<String>,
}

impl LaunchSpec {
    pub fn entry_point(&self) -> PathBuf {
        self.root.join(&self.script)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.root.join(LOG_DIR)
    }
}

/// Handle to a started process.
#[derive(Debug)]
pub struct LaunchRecord {
    pub pid: u32,
    pub log_path: PathBuf,
    pub child: Child,
}

/// `<script>_<timestamp>_<config stem>.log`
pub fn log_file_name(script: &str, config_path: &Path, at: DateTime<Local>) -> String {
    let config_stem = config_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("config");
    format!(
        "{}_{}_{}.log",
        script_stem(script),
        at.format(LOG_TS_FORMAT),
        config_stem
    )
}

/// Spawn the entry point in its own session.
///
/// Fails with `ScriptNotFound` before touching the filesystem. A `SpawnFailure`
/// can leave the new log file behind.
pub fn launch(spec: &LaunchSpec) -> Result<LaunchRecord> {
    let entry = spec.entry_point();
    if !entry.exists() {
        return Err(InvokeError::ScriptNotFound { path: entry });
    }

    let log_dir = spec.log_dir();
    fs::create_dir_all(&log_dir)
        .io_context(|| format!("create log dir {}", log_dir.display()))?;

    let log_path = log_dir.join(log_file_name(&spec.script, &spec.config_path, Local::now()));
    let stdout = open_log(&log_path)?;
    let stderr = stdout
        .try_clone()
        .io_context(|| format!("clone handle for {}", log_path.display()))?;
    update_latest(&log_dir, &log_path)?;

    let mut cmd = Command::new(&spec.interpreter);
    cmd.arg(&entry)
        .args(&spec.args)
        .current_dir(&spec.root)
        .env(MODULE_PATH_ENV, &spec.root)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr));

    // new session: no controlling terminal, so SIGHUP/SIGINT from ours never reach it
    unsafe {
        cmd.pre_exec(|| {
            nix::unistd::setsid()
                .map(|_| ())
                .map_err(std::io::Error::from)
        });
    }

    let child = cmd.spawn().map_err(|e| InvokeError::SpawnFailure {
        program: spec.interpreter.clone(),
        reason: e.to_string(),
    })?;
    let pid = child.id().ok_or_else(|| InvokeError::SpawnFailure {
        program: spec.interpreter.clone(),
        reason: "no process id after spawn".into(),
    })?;

    tracing::info!(
        pid,
        entry = %entry.display(),
        log = %log_path.display(),
        "process launched"
    );
    Ok(LaunchRecord {
        pid,
        log_path,
        child,
    })
}

fn open_log(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .io_context(|| format!("open log {}", path.display()))
}

/// Point `logs/latest.log` at `target`. The link is relative to the log dir.
pub fn update_latest(log_dir: &Path, target: &Path) -> Result<PathBuf> {
    let latest = log_dir.join(LATEST_LOG);
    match fs::remove_file(&latest) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e).io_context(|| format!("remove {}", latest.display())),
    }

    let rel = target.file_name().map(Path::new).unwrap_or(target);
    std::os::unix::fs::symlink(rel, &latest)
        .io_context(|| format!("link {} -> {}", latest.display(), rel.display()))?;
    Ok(latest)
}
