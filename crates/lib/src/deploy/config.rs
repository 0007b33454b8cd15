//! Deployer configuration.
//!
//! All settings are passed explicitly to [`Deployer::new`](super::Deployer::new);
//! nothing is read from the environment. The configuration can be loaded from
//! a YAML file:
//!
//! ```yaml
//! path: k8s/overlays/dev
//! namespace: dev
//! kubeContext: kind-dev
//! defaultRepo: gcr.io/my-project
//! kustomize:
//!   buildArgs: [--enable-helm]
//! kubectl:
//!   flags:
//!     apply: [--server-side]
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::kubectl::KubectlConfig;
use crate::kustomize::KustomizeConfig;

/// Settings for a kustomize deployer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeployConfig {
  /// Overlay directory to build and deploy.
  pub path: PathBuf,
  pub namespace: Option<String>,
  pub kube_context: Option<String>,
  /// Repository prefixed to rewritten image references.
  pub default_repo: Option<String>,
  pub kustomize: KustomizeConfig,
  pub kubectl: KubectlConfig,
}

impl Default for DeployConfig {
  fn default() -> Self {
    Self {
      path: PathBuf::from("."),
      namespace: None,
      kube_context: None,
      default_repo: None,
      kustomize: KustomizeConfig::default(),
      kubectl: KubectlConfig::default(),
    }
  }
}

/// Errors that can occur when loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse config {}: {source}", path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_yaml::Error,
  },
}

impl DeployConfig {
  /// Load a configuration file.
  ///
  /// A relative overlay `path` is taken relative to the file's directory.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    let mut config = Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })?;

    if config.path.is_relative()
      && let Some(dir) = path.parent()
    {
      config.path = dir.join(&config.path);
    }

    Ok(config)
  }

  /// Parse configuration from YAML text. Empty text yields the defaults.
  pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
    let value: serde_yaml::Value = serde_yaml::from_str(content)?;
    if value.is_null() {
      return Ok(Self::default());
    }
    serde_yaml::from_value(value)
  }
}
