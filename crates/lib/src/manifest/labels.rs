//! Label injection.

use std::collections::BTreeMap;

use serde_yaml::{Mapping, Value};
use thiserror::Error;

use super::images::value_kind;
use super::list::ManifestList;

/// Something that contributes labels to every deployed resource.
pub trait Labeller {
  fn labels(&self) -> BTreeMap<String, String>;
}

/// A labeller contributing a fixed set of labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticLabeller(pub BTreeMap<String, String>);

impl Labeller for StaticLabeller {
  fn labels(&self) -> BTreeMap<String, String> {
    self.0.clone()
  }
}

/// Merge the labels of every labeller in order. When two labellers set the
/// same key, the later one wins.
pub fn merge_labels(labellers: &[&dyn Labeller]) -> BTreeMap<String, String> {
  labellers.iter().fold(BTreeMap::new(), |mut merged, labeller| {
    merged.extend(labeller.labels());
    merged
  })
}

/// Errors that can occur while setting labels.
#[derive(Debug, Error)]
pub enum LabelError {
  /// A manifest document is not valid YAML.
  #[error("manifest document {index} is not valid YAML: {source}")]
  Parse {
    index: usize,
    #[source]
    source: serde_yaml::Error,
  },

  /// A document, or a field that must hold labels, is not a mapping.
  #[error("manifest document {index}: {field} is {found}, expected a mapping")]
  NotAMapping {
    index: usize,
    field: &'static str,
    found: &'static str,
  },

  /// A labelled document could not be serialized back to YAML.
  #[error("manifest document {index} could not be serialized: {source}")]
  Serialize {
    index: usize,
    #[source]
    source: serde_yaml::Error,
  },
}

impl ManifestList {
  /// Set `labels` on every document and on its pod template, if it has one.
  ///
  /// Existing labels are kept; on a key collision the given value replaces
  /// the existing one.
  ///
  /// # Errors
  ///
  /// Returns [`LabelError`] if a document is not valid YAML, is not a
  /// mapping, or has a `metadata`, `labels` or pod `template` field that is
  /// not a mapping.
  pub fn set_labels(&self, labels: &BTreeMap<String, String>) -> Result<ManifestList, LabelError> {
    if labels.is_empty() {
      return Ok(self.clone());
    }

    let mut docs = Vec::with_capacity(self.len());

    for (index, doc) in self.iter().enumerate() {
      let mut value: Value = serde_yaml::from_str(doc).map_err(|source| LabelError::Parse { index, source })?;
      if value.is_null() {
        docs.push(doc.to_string());
        continue;
      }

      let found = value_kind(&value);
      let Value::Mapping(resource) = &mut value else {
        return Err(LabelError::NotAMapping {
          index,
          field: "document",
          found,
        });
      };

      add_labels(resource, labels, index)?;

      if let Some(spec) = resource.get_mut("spec")
        && let Some(template) = pod_template(spec, index)?
      {
        add_labels(template, labels, index)?;
      }

      let rendered = serde_yaml::to_string(&value).map_err(|source| LabelError::Serialize { index, source })?;
      docs.push(rendered);
    }

    Ok(ManifestList::from(docs))
  }
}

/// The pod template of a workload spec: `spec.template` for Deployments,
/// StatefulSets, DaemonSets, ReplicaSets and Jobs, or
/// `spec.jobTemplate.spec.template` for CronJobs.
///
/// A template that is present but not a mapping is an error.
fn pod_template(spec: &mut Value, index: usize) -> Result<Option<&mut Mapping>, LabelError> {
  let template = if spec.get("template").is_some() {
    spec.get_mut("template")
  } else {
    spec
      .get_mut("jobTemplate")
      .and_then(|job| job.get_mut("spec"))
      .and_then(|job_spec| job_spec.get_mut("template"))
  };

  let Some(template) = template else {
    return Ok(None);
  };

  let found = value_kind(template);
  template.as_mapping_mut().map(Some).ok_or(LabelError::NotAMapping {
    index,
    field: "template",
    found,
  })
}

/// Merge `labels` into `metadata.labels` of `object`, creating both if absent.
fn add_labels(object: &mut Mapping, labels: &BTreeMap<String, String>, index: usize) -> Result<(), LabelError> {
  let metadata = entry_mapping(object, "metadata", index)?;
  let existing = entry_mapping(metadata, "labels", index)?;

  for (key, value) in labels {
    existing.insert(Value::String(key.clone()), Value::String(value.clone()));
  }

  Ok(())
}

fn entry_mapping<'a>(map: &'a mut Mapping, field: &'static str, index: usize) -> Result<&'a mut Mapping, LabelError> {
  let entry = map
    .entry(Value::String(field.to_string()))
    .or_insert_with(|| Value::Mapping(Mapping::new()));

  if entry.is_null() {
    *entry = Value::Mapping(Mapping::new());
  }

  let found = value_kind(entry);
  entry
    .as_mapping_mut()
    .ok_or(LabelError::NotAMapping { index, field, found })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
  }

  fn parse(list: &ManifestList, index: usize) -> Value {
    serde_yaml::from_str(list.iter().nth(index).unwrap()).unwrap()
  }

  #[test]
  fn merge_is_last_wins() {
    let first = StaticLabeller(labels(&[("tier", "web"), ("env", "dev")]));
    let second = StaticLabeller(labels(&[("env", "prod")]));

    let merged = merge_labels(&[&first, &second]);

    assert_eq!(merged, labels(&[("tier", "web"), ("env", "prod")]));
  }

  #[test]
  fn merge_of_nothing_is_empty() {
    assert!(merge_labels(&[]).is_empty());
  }

  #[test]
  fn keeps_existing_labels() {
    let list = ManifestList::from(vec!["kind: Service\nmetadata:\n  name: web\n  labels:\n    app: x\n".to_string()]);

    let labelled = list.set_labels(&labels(&[("tier", "web")])).unwrap();

    let value = parse(&labelled, 0);
    assert_eq!(value["metadata"]["labels"]["app"], "x");
    assert_eq!(value["metadata"]["labels"]["tier"], "web");
    assert_eq!(value["metadata"]["name"], "web");
  }

  #[test]
  fn contributed_label_overwrites_existing() {
    let list = ManifestList::from(vec!["kind: Service\nmetadata:\n  labels:\n    app: x\n".to_string()]);

    let labelled = list.set_labels(&labels(&[("app", "y")])).unwrap();

    assert_eq!(parse(&labelled, 0)["metadata"]["labels"]["app"], "y");
  }

  #[test]
  fn creates_missing_metadata() {
    let list = ManifestList::from(vec!["kind: Namespace\n".to_string(), "kind: Pod\nmetadata:\n".to_string()]);

    let labelled = list.set_labels(&labels(&[("tier", "web")])).unwrap();

    assert_eq!(parse(&labelled, 0)["metadata"]["labels"]["tier"], "web");
    assert_eq!(parse(&labelled, 1)["metadata"]["labels"]["tier"], "web");
  }

  #[test]
  fn labels_pod_templates() {
    let deployment = r#"kind: Deployment
metadata:
  name: web
spec:
  template:
    metadata:
      labels:
        app: web
    spec:
      containers: []
"#;
    let cronjob = r#"kind: CronJob
metadata:
  name: nightly
spec:
  jobTemplate:
    spec:
      template:
        spec:
          containers: []
"#;
    let list = ManifestList::from(vec![deployment.to_string(), cronjob.to_string()]);

    let labelled = list.set_labels(&labels(&[("tier", "web")])).unwrap();

    let deployment = parse(&labelled, 0);
    assert_eq!(deployment["spec"]["template"]["metadata"]["labels"]["app"], "web");
    assert_eq!(deployment["spec"]["template"]["metadata"]["labels"]["tier"], "web");
    let cronjob = parse(&labelled, 1);
    assert_eq!(
      cronjob["spec"]["jobTemplate"]["spec"]["template"]["metadata"]["labels"]["tier"],
      "web"
    );
  }

  #[test]
  fn empty_label_set_is_a_no_op() {
    let list = ManifestList::from(vec!["# comment\nkind: Pod\n".to_string()]);

    assert_eq!(list.set_labels(&BTreeMap::new()).unwrap(), list);
  }

  #[test]
  fn scalar_document_is_an_error() {
    let list = ManifestList::from(vec!["just a string\n".to_string()]);

    let err = list.set_labels(&labels(&[("a", "b")])).unwrap_err();

    assert!(matches!(err, LabelError::NotAMapping { index: 0, field: "document", .. }));
  }

  #[test]
  fn non_mapping_pod_template_is_an_error() {
    let deployment = ManifestList::from(vec!["kind: Deployment\nspec:\n  template: nginx\n".to_string()]);
    let cronjob = ManifestList::from(vec![
      "kind: CronJob\nspec:\n  jobTemplate:\n    spec:\n      template:\n".to_string(),
    ]);

    let err = deployment.set_labels(&labels(&[("a", "b")])).unwrap_err();
    assert!(matches!(err, LabelError::NotAMapping { field: "template", found: "a string", .. }));

    let err = cronjob.set_labels(&labels(&[("a", "b")])).unwrap_err();
    assert!(matches!(err, LabelError::NotAMapping { field: "template", found: "null", .. }));
  }

  #[test]
  fn non_mapping_labels_is_an_error() {
    let list = ManifestList::from(vec!["kind: Pod\nmetadata:\n  labels: [a, b]\n".to_string()]);

    let err = list.set_labels(&labels(&[("a", "b")])).unwrap_err();

    assert!(matches!(err, LabelError::NotAMapping { field: "labels", found: "a sequence", .. }));
  }
}
