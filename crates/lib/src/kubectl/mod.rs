//! Cluster control.
//!
//! [`ClusterControl`] is the contract the deployer submits manifests through.
//! [`KubectlCli`] implements it by shelling out to `kubectl`.

mod cli;

use std::io::{self, Write};

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::manifest::ManifestList;
use crate::util::process::ProcessError;

pub use cli::{KubectlCli, KubectlConfig, KubectlFlags};

/// Errors reported by a cluster-control implementation.
#[derive(Debug, Error)]
pub enum KubectlError {
  /// kubectl could not be run to completion.
  #[error("{0}")]
  Process(#[from] ProcessError),

  /// kubectl exited unsuccessfully.
  #[error("kubectl {verb} failed with exit code {code:?}: {stderr}")]
  Failed {
    verb: &'static str,
    code: Option<i32>,
    stderr: String,
  },

  /// Forwarding kubectl output to the caller failed.
  #[error("failed to write kubectl output: {0}")]
  Output(#[source] io::Error),

  /// The client version could not be determined.
  #[error("unable to determine kubectl client version: {0}")]
  UnknownVersion(String),

  /// The client is too old to build kustomizations.
  #[error("kubectl {version} is too old, {minimum} or newer is recommended for kustomize")]
  VersionTooOld { version: String, minimum: String },
}

/// Operations the deployer needs from a cluster.
///
/// Implementations must honour `cancel` so an in-flight deploy or cleanup
/// can be aborted promptly.
#[allow(async_fn_in_trait)]
pub trait ClusterControl {
  /// Create or update the given resources. Progress output goes to `out`.
  async fn apply(
    &self,
    cancel: &CancellationToken,
    out: &mut dyn Write,
    manifests: &ManifestList,
  ) -> Result<(), KubectlError>;

  /// Delete the given resources. Progress output goes to `out`.
  async fn delete(
    &self,
    cancel: &CancellationToken,
    out: &mut dyn Write,
    manifests: &ManifestList,
  ) -> Result<(), KubectlError>;

  /// Human-readable client version, or `unknown`.
  async fn version(&self, cancel: &CancellationToken) -> String;

  /// Check that the client is recent enough to be used.
  async fn check_version(&self, cancel: &CancellationToken) -> Result<(), KubectlError>;
}
