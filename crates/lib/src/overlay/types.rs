//! Overlay descriptor types.
//!
//! Only the keys that reference files on disk are modelled. Everything else in
//! a `kustomization.yaml` (name prefixes, images, common labels, ...) is left
//! to the compositing tool and ignored here.

use serde::Deserialize;

/// The content of a `kustomization.yaml` file.
///
/// Every field is optional and defaults to empty, so a descriptor containing
/// nothing but comments is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Kustomization {
  /// Overlay directories this overlay inherits from, relative to its own directory.
  pub bases: Vec<String>,
  pub resources: Vec<String>,
  pub patches: Vec<String>,
  pub crds: Vec<String>,
  #[serde(rename = "patchesJson6902")]
  pub patches_json6902: Vec<PatchJson6902>,
  pub config_map_generator: Vec<Generator>,
  pub secret_generator: Vec<Generator>,
}

/// A JSON 6902 patch reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PatchJson6902 {
  pub path: String,
}

/// A ConfigMap or Secret generator. Only its file sources matter for dependencies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Generator {
  pub files: Vec<String>,
}

impl Kustomization {
  /// Parse a descriptor from YAML text.
  ///
  /// Empty and comment-only documents parse to the default descriptor.
  pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
    let value: serde_yaml::Value = serde_yaml::from_str(content)?;
    if value.is_null() {
      return Ok(Self::default());
    }
    serde_yaml::from_value(value)
  }
}
