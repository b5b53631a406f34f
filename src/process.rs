//! Packaging toolchain execution with streamed output.
//!
//! The toolchain runs as a single child process. A background task forwards
//! each stdout/stderr line to an [`OutputSink`] as it arrives, then reaps the
//! child and hands the exit status back over a oneshot channel.

use crate::error::BuildError;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::oneshot;

/// Log target of streamed toolchain output
pub const TOOLCHAIN_LOG_TARGET: &str = "cleep_distrib::toolchain";

/// Pipe a line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    /// Child standard output
    Stdout,
    /// Child standard error
    Stderr,
}

/// Receiver of streamed output lines
pub type OutputSink = Arc<dyn Fn(OutputStream, &str) + Send + Sync>;

/// Sink writing stdout at info level and stderr at warn level
pub fn log_sink() -> OutputSink {
    Arc::new(|stream, line| match stream {
        OutputStream::Stdout => log::info!(target: TOOLCHAIN_LOG_TARGET, "{}", line),
        OutputStream::Stderr => log::warn!(target: TOOLCHAIN_LOG_TARGET, "{}", line),
    })
}

/// Run `command` through `sh -c` in `root` and wait for it to finish.
///
/// Output is streamed to `sink` while the child runs. There is no timeout.
pub async fn run_packaging_procedure(
    root: &Path,
    command: &str,
    sink: OutputSink,
) -> Result<ExitStatus, BuildError> {
    log::debug!("Running '{}' in {}", command, root.display());

    let mut child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(root)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| BuildError::Spawn {
            command: command.to_string(),
            source,
        })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let (done_tx, done_rx) = oneshot::channel();

    tokio::spawn(async move {
        tokio::join!(
            forward_lines(stdout, OutputStream::Stdout, &sink),
            forward_lines(stderr, OutputStream::Stderr, &sink),
        );
        // Receiver only goes away if the caller was dropped
        let _ = done_tx.send(child.wait().await);
    });

    let waited = done_rx.await.map_err(|_| BuildError::Io {
        operation: "Lost completion signal of toolchain running in",
        path: root.to_path_buf(),
        source: std::io::Error::other("completion channel closed"),
    })?;

    waited.map_err(|source| BuildError::Io {
        operation: "Failed waiting for toolchain in",
        path: root.to_path_buf(),
        source,
    })
}

async fn forward_lines<R>(reader: Option<R>, stream: OutputStream, sink: &OutputSink)
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return;
    };
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                sink(stream, line.trim_end_matches(['\n', '\r']));
            }
            Err(e) => {
                log::warn!("Stopped reading toolchain {:?}: {}", stream, e);
                break;
            }
        }
    }
}
