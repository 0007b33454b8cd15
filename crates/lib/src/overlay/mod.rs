//! Kustomize overlay descriptors and dependency resolution.
//!
//! An overlay is a directory holding a `kustomization.yaml` descriptor plus the
//! resource, patch and generator files it references. Overlays inherit from
//! other overlays through `bases`, forming a tree that [`resolve`] flattens into
//! the list of files that influence the composed output.

mod resolve;
mod types;

pub use resolve::{ResolveError, resolve};
pub use types::*;
