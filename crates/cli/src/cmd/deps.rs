//! Implementation of the `kdeploy deps` command.

use std::sync::Arc;

use anyhow::{Context, Result};

use kdeploy_lib::deploy::{DeployConfig, Deployer};
use kdeploy_lib::events::NoopEventSink;

use crate::output::{OutputFormat, print_json};

/// Print every file the configured overlay depends on, bases first.
pub fn cmd_deps(config: &DeployConfig, format: OutputFormat) -> Result<()> {
  let deployer = Deployer::new(config, Arc::new(NoopEventSink));
  let deps = deployer
    .dependencies()
    .with_context(|| format!("Failed to resolve overlay {}", deployer.overlay().display()))?;

  if format.is_json() {
    print_json(&deps)?;
  } else {
    for path in &deps {
      println!("{}", path.display());
    }
  }

  Ok(())
}
