//! Log follower: stream a growing log to the console while the launched
//! process runs.
//!
//! Two tasks cooperate. The foreground waits for the child; a spawned task
//! tails the log. The child exiting fires a `Notify` (the tail drains what is
//! left, then stops). An operator interrupt cancels the tail through a
//! `CancellationToken` and leaves the child running.

use crate::constants::TAIL_POLL_MS;
use crate::error::{InvokeError, IoContext, Result};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::Arc;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Child;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowState {
    Idle,
    Streaming,
    Stopped,
}

/// Why following ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    /// the child exited; its status is informational only
    Exited(ExitStatus),
    /// the operator interrupted; the child keeps running
    Interrupted,
}

/// Incremental reader over an append-only file. Each call picks up where the
/// previous one stopped.
pub struct TailReader {
    file: File,
    offset: u64,
}

impl TailReader {
    /// Open at byte offset zero so existing content is replayed.
    pub async fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .await
            .io_context(|| format!("open {} for follow", path.display()))?;
        Ok(Self { file, offset: 0 })
    }

    /// Bytes appended since the last call; empty when nothing is new.
    pub async fn read_new(&mut self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let n = self
            .file
            .read_to_end(&mut buf)
            .await
            .io_context(|| "read log")?;
        self.offset += n as u64;
        Ok(buf)
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }
}

pub struct Follower<W> {
    log_path: PathBuf,
    sink: Option<W>,
    state: FollowState,
    poll: Duration,
}

impl<W> Follower<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(log_path: impl Into<PathBuf>, sink: W) -> Self {
        Self {
            log_path: log_path.into(),
            sink: Some(sink),
            state: FollowState::Idle,
            poll: Duration::from_millis(TAIL_POLL_MS),
        }
    }

    pub fn with_poll(mut self, poll: Duration) -> Self {
        self.poll = poll;
        self
    }

    pub fn state(&self) -> FollowState {
        self.state
    }

    /// Hand the sink back once following has stopped.
    pub fn into_sink(self) -> Option<W> {
        self.sink
    }

    /// Stream the log until `child` exits or `interrupt` resolves.
    ///
    /// Never kills the child. There is no timeout.
    pub async fn run<I>(&mut self, child: &mut Child, interrupt: I) -> Result<FollowOutcome>
    where
        I: Future<Output = ()>,
    {
        let sink = self.sink.take().ok_or_else(|| InvokeError::Io {
            context: "follower already ran".into(),
            source: std::io::Error::other("console sink was consumed"),
        })?;
        let reader = TailReader::open(&self.log_path).await?;

        let cancel = CancellationToken::new();
        let exited = Arc::new(Notify::new());
        let task = tokio::spawn(stream(
            reader,
            sink,
            cancel.clone(),
            exited.clone(),
            self.poll,
        ));
        self.state = FollowState::Streaming;
        tracing::debug!(log = %self.log_path.display(), "following");

        let outcome = tokio::select! {
            status = child.wait() => match status {
                Ok(status) => {
                    exited.notify_one();
                    Ok(FollowOutcome::Exited(status))
                }
                Err(e) => {
                    cancel.cancel();
                    Err(e).io_context(|| "wait for launched process")
                }
            },
            _ = interrupt => {
                cancel.cancel();
                Ok(FollowOutcome::Interrupted)
            }
        };

        let joined = task
            .await
            .map_err(|e| InvokeError::Io {
                context: "follow task".into(),
                source: std::io::Error::other(e),
            })
            .and_then(|r| r);
        self.state = FollowState::Stopped;

        let outcome = outcome?;
        self.sink = Some(joined?);
        tracing::debug!(?outcome, "follow stopped");
        Ok(outcome)
    }
}

async fn stream<W>(
    mut reader: TailReader,
    mut sink: W,
    cancel: CancellationToken,
    exited: Arc<Notify>,
    poll: Duration,
) -> Result<W>
where
    W: AsyncWrite + Unpin,
{
    loop {
        if cancel.is_cancelled() {
            break;
        }

        let chunk = reader.read_new().await?;
        if !chunk.is_empty() {
            emit(&mut sink, &chunk).await?;
            continue;
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = exited.notified() => {
                // writer is gone; whatever is on disk now is final
                let rest = reader.read_new().await?;
                emit(&mut sink, &rest).await?;
                break;
            }
            _ = tokio::time::sleep(poll) => {}
        }
    }
    Ok(sink)
}

async fn emit<W: AsyncWrite + Unpin>(sink: &mut W, bytes: &[u8]) -> Result<()> {
    if bytes.is_empty() {
        return Ok(());
    }
    sink.write_all(bytes).await.io_context(|| "write console")?;
    sink.flush().await.io_context(|| "flush console")
}
