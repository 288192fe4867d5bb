//! Per-script PID files.
//!
//! Advisory bookkeeping: the file holds the pid of the most recent launch of a
//! script. Nothing here checks that the pid is still alive.

use crate::constants::PID_EXT;
use crate::error::{InvokeError, IoContext, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub struct ProcessRegistry {
    dir: PathBuf,
}

impl ProcessRegistry {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<dir>/<script>.pid`, derived from the script name only.
    pub fn path_for(&self, script: &str) -> PathBuf {
        self.dir.join(format!("{script}.{PID_EXT}"))
    }

    /// Overwrite the registry entry for `script`.
    pub fn record(&self, script: &str, pid: u32) -> Result<PathBuf> {
        let path = self.path_for(script);
        fs::write(&path, pid.to_string())
            .io_context(|| format!("write pid file {}", path.display()))?;
        tracing::info!(script, pid, path = %path.display(), "pid recorded");
        Ok(path)
    }

    /// Read back the last recorded pid.
    pub fn lookup(&self, script: &str) -> Result<u32> {
        let path = self.path_for(script);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(InvokeError::NotRegistered {
                    script: script.to_string(),
                    path,
                })
            }
            Err(e) => return Err(e).io_context(|| format!("read pid file {}", path.display())),
        };
        parse_pid(&raw, &path)
    }
}

fn parse_pid(raw: &str, path: &Path) -> Result<u32> {
    raw.trim().parse::<u32>().map_err(|e| InvokeError::Io {
        context: format!("invalid pid in {}", path.display()),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })
}
