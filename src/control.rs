//! Inspect or terminate a launched process through its registry entry.

use crate::error::{InvokeError, Result};
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Running,
    Gone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopResult {
    Signalled,
    AlreadyExited,
}

fn to_pid(pid: u32) -> Result<Pid> {
    i32::try_from(pid)
        .map(Pid::from_raw)
        .map_err(|_| InvokeError::Io {
            context: format!("pid {pid} out of range"),
            source: std::io::Error::from(std::io::ErrorKind::InvalidInput),
        })
}

/// Signal 0 probe. A process owned by someone else still counts as running.
pub fn probe(pid: u32) -> Result<Liveness> {
    match kill(to_pid(pid)?, None) {
        Ok(()) | Err(Errno::EPERM) => Ok(Liveness::Running),
        Err(Errno::ESRCH) => Ok(Liveness::Gone),
        Err(e) => Err(InvokeError::Io {
            context: format!("probe pid {pid}"),
            source: e.into(),
        }),
    }
}

/// Send SIGTERM. The registry file is left alone.
pub fn stop(pid: u32) -> Result<StopResult> {
    match kill(to_pid(pid)?, Signal::SIGTERM) {
        Ok(()) => {
            tracing::info!(pid, "sent SIGTERM");
            Ok(StopResult::Signalled)
        }
        Err(Errno::ESRCH) => Ok(StopResult::AlreadyExited),
        Err(e) => Err(InvokeError::Io {
            context: format!("signal pid {pid}"),
            source: e.into(),
        }),
    }
}
