//! kdeploy-lib: Core types and logic for kdeploy
//!
//! This crate deploys kustomize overlays to a Kubernetes cluster:
//! - `overlay`: discovers every file an overlay depends on
//! - `kustomize`: renders an overlay into a `ManifestList`
//! - `manifest`: rewrites image references and injects labels
//! - `kubectl`: applies and deletes manifests on the cluster
//! - `deploy`: ties the pieces together and reports lifecycle events

pub mod consts;
pub mod deploy;
pub mod events;
pub mod kubectl;
pub mod kustomize;
pub mod manifest;
pub mod overlay;
pub mod util;
