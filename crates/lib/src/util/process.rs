//! Cancellable subprocess execution.
//!
//! Both external tools the deployer drives (`kustomize` and `kubectl`) are
//! run through [`run`], which captures their output and kills them as soon as
//! the caller's cancellation token fires.

use std::io;
use std::process::{Output, Stdio};

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Errors that can occur while running a subprocess.
#[derive(Debug, Error)]
pub enum ProcessError {
  /// The program could not be started.
  #[error("failed to start {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },

  /// I/O with the running process failed.
  #[error("io error while running {program}: {source}")]
  Io {
    program: String,
    #[source]
    source: io::Error,
  },

  /// The caller cancelled the operation; the process was killed.
  #[error("{program} was cancelled")]
  Cancelled { program: String },
}

/// Run `command` to completion, feeding it `stdin` and capturing stdout and stderr.
///
/// The exit status is not checked; callers decide what a failure means.
/// If `cancel` fires first, the child is killed and
/// [`ProcessError::Cancelled`] is returned.
pub async fn run(mut command: Command, stdin: Option<&[u8]>, cancel: &CancellationToken) -> Result<Output, ProcessError> {
  let program = command.as_std().get_program().to_string_lossy().into_owned();

  command
    .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .kill_on_drop(true);

  debug!(program = %program, args = ?command.as_std().get_args().collect::<Vec<_>>(), "spawning process");

  let mut child = command.spawn().map_err(|source| ProcessError::Spawn {
    program: program.clone(),
    source,
  })?;

  let pipe = child.stdin.take();
  let feed = async move {
    if let (Some(mut pipe), Some(data)) = (pipe, stdin) {
      pipe.write_all(data).await?;
      pipe.shutdown().await?;
    }
    Ok::<_, io::Error>(())
  };

  // Dropping the child on cancellation kills it (kill_on_drop).
  let result = tokio::select! {
    _ = cancel.cancelled() => {
      warn!(program = %program, "cancelled, killing process");
      return Err(ProcessError::Cancelled { program });
    }
    result = async { tokio::join!(feed, child.wait_with_output()) } => result,
  };

  let (fed, output) = result;
  let output = output.map_err(|source| ProcessError::Io {
    program: program.clone(),
    source,
  })?;

  // A process may legitimately exit before reading all of its input.
  if let Err(source) = fed
    && source.kind() != io::ErrorKind::BrokenPipe
  {
    return Err(ProcessError::Io { program, source });
  }

  debug!(program = %program, code = ?output.status.code(), "process exited");
  Ok(output)
}
