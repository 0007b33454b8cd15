//! Configuration loading for the CLI.
//!
//! Settings come from a YAML file (`--config`, or `kdeploy.yaml` in the
//! working directory when present), then command-line flags override them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use kdeploy_lib::consts::CONFIG_FILENAME;
use kdeploy_lib::deploy::DeployConfig;

#[derive(Debug, Default, Args)]
pub struct ConfigArgs {
  /// Configuration file (default: kdeploy.yaml if present)
  #[arg(short, long, global = true, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Overlay directory to deploy
  #[arg(short, long, global = true, value_name = "DIR")]
  pub path: Option<PathBuf>,

  /// Namespace for every kubectl command
  #[arg(short, long, global = true)]
  pub namespace: Option<String>,

  /// Kubeconfig context for every kubectl command
  #[arg(long, global = true, value_name = "CONTEXT")]
  pub kube_context: Option<String>,

  /// Repository prefixed to substituted images
  #[arg(long, global = true, value_name = "REPO")]
  pub default_repo: Option<String>,
}

impl ConfigArgs {
  /// Load the configuration file, if any, and apply flag overrides.
  pub fn load(&self) -> Result<DeployConfig> {
    let mut config = match &self.config {
      Some(file) => read(file)?,
      None if Path::new(CONFIG_FILENAME).is_file() => read(Path::new(CONFIG_FILENAME))?,
      None => DeployConfig::default(),
    };

    self.apply(&mut config);
    Ok(config)
  }

  fn apply(&self, config: &mut DeployConfig) {
    if let Some(path) = &self.path {
      config.path = path.clone();
    }
    if let Some(namespace) = &self.namespace {
      config.namespace = Some(namespace.clone());
    }
    if let Some(context) = &self.kube_context {
      config.kube_context = Some(context.clone());
    }
    if let Some(repo) = &self.default_repo {
      config.default_repo = Some(repo.clone());
    }
  }
}

fn read(file: &Path) -> Result<DeployConfig> {
  debug!(path = %file.display(), "loading config");
  DeployConfig::load(file).with_context(|| format!("Failed to load config {}", file.display()))
}
