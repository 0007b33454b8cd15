//! Implementation of the `kdeploy cleanup` command.

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};

use kdeploy_lib::deploy::{DeployConfig, Deployer};
use kdeploy_lib::events::NoopEventSink;

use crate::output::print_success;

/// Execute the cleanup command.
///
/// Deletes every resource the configured overlay renders. Resources that are
/// already gone are ignored.
pub fn cmd_cleanup(config: &DeployConfig) -> Result<()> {
  let deployer = Deployer::new(config, Arc::new(NoopEventSink));

  let (rt, cancel) = super::runtime()?;
  let mut stdout = io::stdout();
  rt.block_on(deployer.cleanup(&cancel, &mut stdout))
    .context("Cleanup failed")?;

  print_success("Cleanup complete!");
  Ok(())
}
