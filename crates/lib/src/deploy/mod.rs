//! Deployment orchestration.
//!
//! The [`Deployer`] drives a kustomize overlay to a cluster:
//!
//! 1. Load manifests with `kustomize build`
//! 2. Replace image references with the built artifacts
//! 3. Inject labels
//! 4. Apply through the cluster-control collaborator
//!
//! Cleanup loads the same manifests and deletes them untransformed.

mod config;
mod deployer;
mod types;

pub use config::{ConfigError, DeployConfig};
pub use deployer::Deployer;
pub use types::{DeployError, DeployOutcome, DeployPhase};
