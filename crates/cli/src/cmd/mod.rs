mod cleanup;
mod deploy;
mod deps;

pub use cleanup::cmd_cleanup;
pub use deploy::cmd_deploy;
pub use deps::cmd_deps;

use anyhow::{Context, Result};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Create the async runtime and a token that is cancelled on Ctrl-C.
fn runtime() -> Result<(Runtime, CancellationToken)> {
  let rt = Runtime::new().context("Failed to create async runtime")?;
  let cancel = CancellationToken::new();

  let token = cancel.clone();
  rt.spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      warn!("interrupted, cancelling");
      token.cancel();
    }
  });

  Ok((rt, cancel))
}
