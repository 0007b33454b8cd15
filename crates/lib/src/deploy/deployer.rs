//! The kustomize deployer.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::DeployConfig;
use super::types::{DeployError, DeployOutcome, DeployPhase};
use crate::consts::{DEPLOYER_LABEL, KUSTOMIZE_DEPLOYER};
use crate::events::{DeployEvent, DeployEventSink};
use crate::kubectl::{ClusterControl, KubectlCli};
use crate::kustomize::KustomizeBuilder;
use crate::manifest::{Artifact, Labeller, ManifestList, merge_labels};
use crate::overlay::{self, ResolveError};

/// Deploys a kustomize overlay through a cluster-control collaborator.
///
/// A deployer holds no per-call state; `deploy`, `cleanup` and
/// `dependencies` may run concurrently. Serialising a deploy and a cleanup
/// against the same cluster is up to the caller.
pub struct Deployer<C = KubectlCli> {
  overlay: PathBuf,
  default_repo: Option<String>,
  kustomize: KustomizeBuilder,
  cluster: C,
  events: Arc<dyn DeployEventSink>,
}

impl Deployer<KubectlCli> {
  /// Create a deployer that talks to the cluster through `kubectl`.
  pub fn new(config: &DeployConfig, events: Arc<dyn DeployEventSink>) -> Self {
    let kubectl = KubectlCli::new(
      config.kubectl.clone(),
      config.namespace.clone(),
      config.kube_context.clone(),
    );
    Self::with_cluster(config, kubectl, events)
  }
}

impl<C: ClusterControl> Deployer<C> {
  /// Create a deployer with a custom cluster-control implementation.
  pub fn with_cluster(config: &DeployConfig, cluster: C, events: Arc<dyn DeployEventSink>) -> Self {
    Self {
      overlay: config.path.clone(),
      default_repo: config.default_repo.clone(),
      kustomize: KustomizeBuilder::new(config.kustomize.clone()),
      cluster,
      events,
    }
  }

  /// The overlay directory this deployer builds.
  pub fn overlay(&self) -> &Path {
    &self.overlay
  }

  /// Build the overlay, rewrite images, inject labels and apply the result.
  ///
  /// Labels from this deployer are merged first, then those of `labellers`
  /// in order, so caller-provided labels win on collision.
  ///
  /// An overlay that renders nothing returns
  /// [`DeployOutcome::NothingToDeploy`] without emitting any event.
  ///
  /// # Errors
  ///
  /// Returns the first [`DeployError`] encountered. A
  /// [`DeployEvent::Failed`] is emitted before returning.
  pub async fn deploy(
    &self,
    cancel: &CancellationToken,
    out: &mut dyn Write,
    builds: &[Artifact],
    labellers: &[&dyn Labeller],
  ) -> Result<DeployOutcome, DeployError> {
    enter(DeployPhase::default());

    let version = self.cluster.version(cancel).await;
    info!(version = %version, "kubectl client version");
    if let Err(e) = self.cluster.check_version(cancel).await {
      warn!(error = %e, "kubectl version check failed");
    }

    let manifests = self.load(cancel).await.map_err(|e| self.fail(e))?;

    if manifests.is_empty() {
      info!(overlay = %self.overlay.display(), "nothing to deploy");
      enter(DeployPhase::Complete);
      return Ok(DeployOutcome::NothingToDeploy);
    }

    self.events.on_event(DeployEvent::InProgress);

    enter(DeployPhase::Transforming);
    let manifests = self
      .transform(&manifests, builds, labellers)
      .map_err(|e| self.fail(e))?;

    enter(DeployPhase::Applying);
    self
      .cluster
      .apply(cancel, out, &manifests)
      .await
      .map_err(|e| self.fail(DeployError::Apply(e)))?;

    self.events.on_event(DeployEvent::Complete);
    enter(DeployPhase::Complete);
    info!(count = manifests.len(), "deploy complete");

    Ok(DeployOutcome::Applied {
      manifests: manifests.len(),
    })
  }

  /// Delete what [`deploy`](Self::deploy) would create.
  ///
  /// The manifests are deleted exactly as the overlay renders them: deletion
  /// targets resource identity, which neither transform changes. No events
  /// are emitted.
  pub async fn cleanup(&self, cancel: &CancellationToken, out: &mut dyn Write) -> Result<(), DeployError> {
    enter(DeployPhase::default());
    let manifests = self.load(cancel).await?;

    enter(DeployPhase::Applying);
    self
      .cluster
      .delete(cancel, out, &manifests)
      .await
      .map_err(DeployError::Delete)?;

    enter(DeployPhase::Complete);
    info!(count = manifests.len(), "cleanup complete");
    Ok(())
  }

  /// Every file that can change what this deployer deploys.
  ///
  /// Paths are absolute; a relative overlay path is taken relative to the
  /// current directory.
  pub fn dependencies(&self) -> Result<Vec<PathBuf>, ResolveError> {
    let overlay = std::path::absolute(&self.overlay).map_err(|source| ResolveError::Read {
      path: self.overlay.clone(),
      source,
    })?;
    overlay::resolve(&overlay)
  }

  async fn load(&self, cancel: &CancellationToken) -> Result<ManifestList, DeployError> {
    enter(DeployPhase::Loading);
    self
      .kustomize
      .load(cancel, &self.overlay)
      .await
      .map_err(DeployError::Load)
  }

  fn transform(
    &self,
    manifests: &ManifestList,
    builds: &[Artifact],
    labellers: &[&dyn Labeller],
  ) -> Result<ManifestList, DeployError> {
    let manifests = manifests
      .replace_images(builds, self.default_repo.as_deref())
      .map_err(DeployError::Rewrite)?;

    let mut all: Vec<&dyn Labeller> = Vec::with_capacity(labellers.len() + 1);
    all.push(self);
    all.extend_from_slice(labellers);

    manifests.set_labels(&merge_labels(&all)).map_err(DeployError::Label)
  }

  fn fail(&self, err: DeployError) -> DeployError {
    debug!(phase = %err.phase(), "deploy failed");
    enter(DeployPhase::Failed);
    self.events.on_event(DeployEvent::Failed { error: err.to_string() });
    err
  }
}

impl<C> Labeller for Deployer<C> {
  fn labels(&self) -> BTreeMap<String, String> {
    BTreeMap::from([(DEPLOYER_LABEL.to_string(), KUSTOMIZE_DEPLOYER.to_string())])
  }
}

fn enter(phase: DeployPhase) {
  debug!(%phase, "deploy phase");
}
