//! Implementation of the `kdeploy deploy` command.

use std::io;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};

use kdeploy_lib::deploy::{DeployConfig, DeployOutcome, Deployer};
use kdeploy_lib::events::TracingEventSink;
use kdeploy_lib::manifest::{Artifact, StaticLabeller};

use crate::output::{format_duration, print_info, print_stat, print_success};

/// Execute the deploy command.
///
/// Builds the configured overlay, substitutes `images`, adds `labels` on top
/// of the deployer's own label and applies the result. kubectl's output is
/// forwarded to stdout.
pub fn cmd_deploy(config: &DeployConfig, images: &[Artifact], labels: Vec<(String, String)>) -> Result<()> {
  let deployer = Deployer::new(config, Arc::new(TracingEventSink));
  let labeller = StaticLabeller(labels.into_iter().collect());
  let start = Instant::now();

  let (rt, cancel) = super::runtime()?;
  let mut stdout = io::stdout();
  let outcome = rt
    .block_on(deployer.deploy(&cancel, &mut stdout, images, &[&labeller]))
    .context("Deploy failed")?;

  match outcome {
    DeployOutcome::NothingToDeploy => print_info("Nothing to deploy."),
    DeployOutcome::Applied { manifests } => {
      print_success("Deploy complete!");
      print_stat("Overlay", &deployer.overlay().display().to_string());
      print_stat("Manifests", &manifests.to_string());
      print_stat("Duration", &format_duration(start.elapsed()));
    }
  }

  Ok(())
}
