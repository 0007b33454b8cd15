//! Types for deploy orchestration.

use std::fmt;

use thiserror::Error;

use crate::kubectl::KubectlError;
use crate::kustomize::LoadError;
use crate::manifest::{LabelError, RewriteError};

/// Where a deploy or cleanup currently is.
///
/// ```text
/// Idle -> Loading -> Transforming -> Applying -> Complete
///            |             |             |
///            +-> Complete  +-------------+-> Failed
///            |   (nothing to deploy)     |
///            +-> Failed -----------------+
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeployPhase {
  /// Every deploy and cleanup starts here.
  #[default]
  Idle,
  Loading,
  Transforming,
  Applying,
  Complete,
  Failed,
}

impl fmt::Display for DeployPhase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      DeployPhase::Idle => "idle",
      DeployPhase::Loading => "loading",
      DeployPhase::Transforming => "transforming",
      DeployPhase::Applying => "applying",
      DeployPhase::Complete => "complete",
      DeployPhase::Failed => "failed",
    };
    f.write_str(name)
  }
}

/// Result of a successful deploy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployOutcome {
  /// The overlay rendered no manifests; nothing was submitted.
  NothingToDeploy,

  /// Manifests were applied.
  Applied { manifests: usize },
}

/// Errors that can occur during deploy or cleanup.
#[derive(Debug, Error)]
pub enum DeployError {
  /// Loading manifests failed.
  #[error("reading manifests: {0}")]
  Load(#[source] LoadError),

  /// Image rewriting failed.
  #[error("replacing images in manifests: {0}")]
  Rewrite(#[source] RewriteError),

  /// Label injection failed.
  #[error("setting labels in manifests: {0}")]
  Label(#[source] LabelError),

  /// The cluster rejected the apply.
  #[error("apply: {0}")]
  Apply(#[source] KubectlError),

  /// The cluster rejected the delete.
  #[error("delete: {0}")]
  Delete(#[source] KubectlError),
}

impl DeployError {
  /// The phase the operation was in when it failed.
  pub fn phase(&self) -> DeployPhase {
    match self {
      DeployError::Load(_) => DeployPhase::Loading,
      DeployError::Rewrite(_) | DeployError::Label(_) => DeployPhase::Transforming,
      DeployError::Apply(_) | DeployError::Delete(_) => DeployPhase::Applying,
    }
  }
}
