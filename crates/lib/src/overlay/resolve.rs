//! Overlay dependency resolution.
//!
//! # Resolution Algorithm
//!
//! For an overlay directory:
//! 1. Read and parse `kustomization.yaml`
//! 2. Recursively resolve each entry in `bases`, in declaration order
//! 3. Append the descriptor itself, then its resources, patches, CRDs,
//!    JSON 6902 patches, ConfigMap generator files and Secret generator files
//!
//! Base output always precedes local output. Paths are not deduplicated: a
//! base shared by two sibling bases contributes its files twice.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, trace};

use super::types::Kustomization;
use crate::consts::KUSTOMIZATION_FILENAME;

/// Errors that can occur while resolving overlay dependencies.
#[derive(Debug, Error)]
pub enum ResolveError {
  /// The overlay directory has no descriptor.
  #[error("kustomization not found: {}", path.display())]
  NotFound { path: PathBuf },

  /// The descriptor exists but could not be read.
  #[error("failed to read {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The descriptor is not valid YAML or has the wrong shape.
  #[error("failed to parse {}: {source}", path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_yaml::Error,
  },

  /// A base chain leads back to an overlay that is still being resolved.
  #[error("circular bases detected: {chain}")]
  Cycle { chain: String },
}

/// Resolve every file that can change the output of the overlay at `overlay_dir`.
///
/// Either the whole tree resolves or an error is returned; partial results are
/// never exposed.
///
/// # Errors
///
/// Returns [`ResolveError`] if any descriptor in the tree is missing,
/// unreadable or malformed, or if the `bases` chain is circular.
pub fn resolve(overlay_dir: &Path) -> Result<Vec<PathBuf>, ResolveError> {
  let mut chain = Vec::new();
  let deps = resolve_overlay(overlay_dir, &mut chain)?;
  info!(overlay = %overlay_dir.display(), count = deps.len(), "resolved overlay dependencies");
  Ok(deps)
}

/// Resolve one overlay. `chain` holds the canonical directories of the
/// overlays currently being expanded, outermost first.
fn resolve_overlay(dir: &Path, chain: &mut Vec<PathBuf>) -> Result<Vec<PathBuf>, ResolveError> {
  let path = dir.join(KUSTOMIZATION_FILENAME);
  let kustomization = read_kustomization(&path)?;

  // The descriptor was readable, so the directory exists and canonicalizes.
  let key = dunce::canonicalize(dir).map_err(|source| ResolveError::Read {
    path: dir.to_path_buf(),
    source,
  })?;

  if let Some(start) = chain.iter().position(|p| *p == key) {
    let chain = chain[start..]
      .iter()
      .chain(std::iter::once(&key))
      .map(|p| p.display().to_string())
      .collect::<Vec<_>>()
      .join(" -> ");
    debug!(%chain, "overlay cycle");
    return Err(ResolveError::Cycle { chain });
  }

  chain.push(key);

  let mut deps = Vec::new();
  for base in &kustomization.bases {
    trace!(overlay = %dir.display(), base, "resolving base");
    deps.extend(resolve_overlay(&dir.join(base), chain)?);
  }

  chain.pop();

  deps.push(path);
  deps.extend(join_paths(dir, &kustomization.resources));
  deps.extend(join_paths(dir, &kustomization.patches));
  deps.extend(join_paths(dir, &kustomization.crds));
  for patch in &kustomization.patches_json6902 {
    deps.push(dir.join(&patch.path));
  }
  for generator in &kustomization.config_map_generator {
    deps.extend(join_paths(dir, &generator.files));
  }
  for generator in &kustomization.secret_generator {
    deps.extend(join_paths(dir, &generator.files));
  }

  Ok(deps)
}

fn read_kustomization(path: &Path) -> Result<Kustomization, ResolveError> {
  let content = match fs::read_to_string(path) {
    Ok(content) => content,
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      debug!(path = %path.display(), "kustomization not found");
      return Err(ResolveError::NotFound {
        path: path.to_path_buf(),
      });
    }
    Err(source) => {
      debug!(path = %path.display(), error = %source, "failed to read kustomization");
      return Err(ResolveError::Read {
        path: path.to_path_buf(),
        source,
      });
    }
  };

  Kustomization::from_yaml(&content).map_err(|source| {
    debug!(path = %path.display(), error = %source, "failed to parse kustomization");
    ResolveError::Parse {
      path: path.to_path_buf(),
      source,
    }
  })
}

fn join_paths<'a>(root: &'a Path, paths: &'a [String]) -> impl Iterator<Item = PathBuf> + 'a {
  paths.iter().map(move |p| root.join(p))
}
