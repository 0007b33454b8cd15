//! The manifest list type.

use std::fmt;

/// An ordered list of YAML manifest documents, kept as raw text until a
/// transform needs structured access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestList(Vec<String>);

impl ManifestList {
  pub fn new() -> Self {
    Self::default()
  }

  /// Split a multi-document YAML stream on `---` separator lines and append
  /// each non-blank document.
  pub fn append(&mut self, content: &str) {
    let mut current = String::new();
    for line in content.lines() {
      let line = match document_start(line) {
        Some(rest) => {
          self.push_document(std::mem::take(&mut current));
          if rest.is_empty() {
            continue;
          }
          rest
        }
        None => line,
      };
      current.push_str(line);
      current.push('\n');
    }
    self.push_document(current);
  }

  fn push_document(&mut self, doc: String) {
    if !doc.trim().is_empty() {
      self.0.push(doc);
    }
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.0.iter().map(String::as_str)
  }
}

/// A document start marker: `---` alone or followed by whitespace. Returns the
/// content that follows the marker on the same line, empty for a comment.
fn document_start(line: &str) -> Option<&str> {
  let rest = line.strip_prefix("---")?;
  if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
    return None;
  }
  let rest = rest.trim_start();
  Some(if rest.starts_with('#') { "" } else { rest })
}

impl From<Vec<String>> for ManifestList {
  fn from(docs: Vec<String>) -> Self {
    let mut list = Self::new();
    for doc in docs {
      list.push_document(doc);
    }
    list
  }
}

impl FromIterator<String> for ManifestList {
  fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
    Self::from(iter.into_iter().collect::<Vec<_>>())
  }
}

/// Renders the documents as a single stream suitable for `kubectl -f -`.
impl fmt::Display for ManifestList {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, doc) in self.0.iter().enumerate() {
      if i > 0 {
        f.write_str("---\n")?;
      }
      f.write_str(doc)?;
      if !doc.ends_with('\n') {
        f.write_str("\n")?;
      }
    }
    Ok(())
  }
}
