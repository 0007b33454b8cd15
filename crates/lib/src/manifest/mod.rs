//! Rendered Kubernetes manifests and the transforms applied before deploy.
//!
//! A [`ManifestList`] holds the YAML documents produced by the compositing
//! tool. Transforms never mutate a list in place; each returns a new list so
//! that a failed stage leaves nothing half-rewritten behind.

mod images;
mod labels;
mod list;

pub use images::{Artifact, RewriteError, image_name};
pub use labels::{LabelError, Labeller, StaticLabeller, merge_labels};
pub use list::ManifestList;
