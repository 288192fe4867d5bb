//! Best-effort pre-launch hook: bring the working root up to date.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Run `git pull` in `root`. Failure is logged and swallowed.
pub async fn pull_latest(root: &Path) -> bool {
    match try_pull(root).await {
        Ok(()) => {
            tracing::info!(root = %root.display(), "pulled latest");
            true
        }
        Err(e) => {
            tracing::warn!(root = %root.display(), "pull latest failed, continuing: {e:#}");
            false
        }
    }
}

async fn try_pull(root: &Path) -> Result<()> {
    let out = Command::new("git")
        .arg("pull")
        .current_dir(root)
        .stdin(Stdio::null())
        .output()
        .await
        .context("spawn git")?;

    if !out.status.success() {
        anyhow::bail!(
            "git pull exited with {}: {}",
            out.status,
            String::from_utf8_lossy(&out.stderr).trim()
        );
    }
    Ok(())
}
