//! Manifest loading through `kustomize build`.
//!
//! The compositing tool expands an overlay tree into a flat stream of YAML
//! documents. Its output is captured verbatim and only parsed later, when a
//! transform needs structured access.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::consts::KUSTOMIZE_PROGRAM;
use crate::manifest::ManifestList;
use crate::util::process::{self, ProcessError};

/// How to invoke the compositing tool.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KustomizeConfig {
  /// Program to run.
  pub program: String,
  /// Arguments placed before `build`, for wrapper commands.
  pub args: Vec<String>,
  /// Extra flags passed to `build`.
  pub build_args: Vec<String>,
}

impl Default for KustomizeConfig {
  fn default() -> Self {
    Self {
      program: KUSTOMIZE_PROGRAM.to_string(),
      args: Vec::new(),
      build_args: Vec::new(),
    }
  }
}

/// Errors that can occur while loading manifests.
#[derive(Debug, Error)]
pub enum LoadError {
  /// The tool could not be run to completion.
  #[error("kustomize build: {0}")]
  Process(#[from] ProcessError),

  /// The tool exited unsuccessfully.
  #[error("kustomize build failed with exit code {code:?}: {stderr}")]
  Failed { code: Option<i32>, stderr: String },
}

/// Runs `kustomize build` for an overlay.
#[derive(Debug, Clone)]
pub struct KustomizeBuilder {
  config: KustomizeConfig,
}

impl KustomizeBuilder {
  pub fn new(config: KustomizeConfig) -> Self {
    Self { config }
  }

  fn command(&self, overlay_dir: &Path) -> Command {
    let mut command = Command::new(&self.config.program);
    command
      .args(&self.config.args)
      .arg("build")
      .args(&self.config.build_args)
      .arg(overlay_dir);
    command
  }

  /// Build the overlay at `overlay_dir` and capture the resulting manifests.
  ///
  /// Empty output is not an error: it yields an empty list, meaning there is
  /// nothing to deploy.
  ///
  /// # Errors
  ///
  /// Returns [`LoadError`] if the tool cannot be started, is cancelled, or
  /// exits unsuccessfully. The error carries the tool's stderr.
  pub async fn load(&self, cancel: &CancellationToken, overlay_dir: &Path) -> Result<ManifestList, LoadError> {
    info!(overlay = %overlay_dir.display(), "running kustomize build");

    let output = process::run(self.command(overlay_dir), None, cancel).await?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
      debug!(stderr = %stderr, "kustomize stderr");
      return Err(LoadError::Failed {
        code: output.status.code(),
        stderr,
      });
    }

    let mut manifests = ManifestList::new();
    manifests.append(&String::from_utf8_lossy(&output.stdout));

    debug!(count = manifests.len(), "loaded manifests");
    Ok(manifests)
  }
}
