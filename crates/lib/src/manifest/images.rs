//! Image reference rewriting.
//!
//! Manifests reference images by whatever name and tag the author wrote
//! (`app:dev`). After a build, each image has a resolved, immutable reference
//! (`app@sha256:...`) which must replace the authored one before deploy.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use thiserror::Error;
use tracing::debug;

use super::list::ManifestList;

/// A built image: its name plus the fully resolved tag or digest reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
  pub image_name: String,
  pub tag: String,
}

impl Artifact {
  pub fn new(image_name: impl Into<String>, tag: impl Into<String>) -> Self {
    Self {
      image_name: image_name.into(),
      tag: tag.into(),
    }
  }
}

/// Errors that can occur while rewriting image references.
#[derive(Debug, Error)]
pub enum RewriteError {
  /// A manifest document is not valid YAML.
  #[error("manifest document {index} is not valid YAML: {source}")]
  Parse {
    index: usize,
    #[source]
    source: serde_yaml::Error,
  },

  /// An `image` field holds something other than a string.
  #[error("manifest document {index}: image field is {found}, expected a string")]
  NotAString { index: usize, found: &'static str },

  /// A rewritten document could not be serialized back to YAML.
  #[error("manifest document {index} could not be serialized: {source}")]
  Serialize {
    index: usize,
    #[source]
    source: serde_yaml::Error,
  },
}

/// Strip the tag and digest from an image reference, leaving the name.
///
/// A colon before the last `/` belongs to a registry port, not a tag:
/// `localhost:5000/app:dev` has the name `localhost:5000/app`.
pub fn image_name(reference: &str) -> &str {
  let name = reference.split_once('@').map_or(reference, |(name, _)| name);
  match name.rfind(':') {
    Some(i) if !name[i..].contains('/') => &name[..i],
    _ => name,
  }
}

struct ImageRewriter<'a> {
  builds: &'a [Artifact],
  default_repo: Option<&'a str>,
}

impl ImageRewriter<'_> {
  /// The replacement for `reference`, or `None` when no artifact matches.
  fn rewrite(&self, reference: &str) -> Option<String> {
    let name = image_name(reference);
    let artifact = self.builds.iter().find(|a| a.image_name == name)?;
    Some(self.with_default_repo(&artifact.tag))
  }

  fn with_default_repo(&self, tag: &str) -> String {
    match self.default_repo.map(|r| r.trim_end_matches('/')) {
      Some(repo) if !repo.is_empty() && !tag.starts_with(&format!("{repo}/")) => format!("{repo}/{tag}"),
      _ => tag.to_string(),
    }
  }

  /// Rewrite every `image` entry below `value`, returning how many changed.
  fn visit(&self, value: &mut Value, index: usize) -> Result<usize, RewriteError> {
    let mut replaced = 0;
    match value {
      Value::Mapping(map) => {
        for (key, child) in map.iter_mut() {
          if key.as_str() != Some("image") {
            replaced += self.visit(child, index)?;
            continue;
          }

          let Some(reference) = child.as_str() else {
            return Err(RewriteError::NotAString {
              index,
              found: value_kind(child),
            });
          };

          if let Some(new) = self.rewrite(reference) {
            debug!(from = reference, to = %new, "replacing image");
            *child = Value::String(new);
            replaced += 1;
          }
        }
      }
      Value::Sequence(seq) => {
        for child in seq {
          replaced += self.visit(child, index)?;
        }
      }
      Value::Tagged(tagged) => replaced += self.visit(&mut tagged.value, index)?,
      _ => {}
    }
    Ok(replaced)
  }
}

pub(super) fn value_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Sequence(_) => "a sequence",
    Value::Mapping(_) => "a mapping",
    Value::Tagged(_) => "a tagged value",
  }
}

impl ManifestList {
  /// Replace image references that match a built artifact by name.
  ///
  /// When `default_repo` is set, replacements are prefixed with it. Documents
  /// without a matching reference are passed through byte for byte.
  ///
  /// # Errors
  ///
  /// Returns [`RewriteError`] if a document is not valid YAML or holds an
  /// `image` field that is not a string.
  pub fn replace_images(&self, builds: &[Artifact], default_repo: Option<&str>) -> Result<ManifestList, RewriteError> {
    let rewriter = ImageRewriter { builds, default_repo };
    let mut docs = Vec::with_capacity(self.len());

    for (index, doc) in self.iter().enumerate() {
      let mut value: Value = serde_yaml::from_str(doc).map_err(|source| RewriteError::Parse { index, source })?;

      if rewriter.visit(&mut value, index)? == 0 {
        docs.push(doc.to_string());
        continue;
      }

      let rendered = serde_yaml::to_string(&value).map_err(|source| RewriteError::Serialize { index, source })?;
      docs.push(rendered);
    }

    Ok(ManifestList::from(docs))
  }
}
