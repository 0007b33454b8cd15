//! `kubectl` command-line implementation of [`ClusterControl`].
//!
//! Every invocation has the shape
//! `kubectl [--context=C] [--namespace=N] <verb> [global flags] [verb flags] [args]`,
//! with manifests streamed on stdin via `-f -`.

use std::io::Write;

use serde::Deserialize;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{ClusterControl, KubectlError};
use crate::consts::{KUBECTL_PROGRAM, MIN_KUBECTL_MINOR};
use crate::manifest::ManifestList;
use crate::util::process;

/// Extra flags passed through to kubectl.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KubectlFlags {
  /// Added to every command.
  pub global: Vec<String>,
  /// Added to `kubectl apply`.
  pub apply: Vec<String>,
  /// Added to `kubectl delete`.
  pub delete: Vec<String>,
}

/// How to invoke kubectl.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KubectlConfig {
  pub program: String,
  /// Arguments placed before everything else, for wrapper commands such as
  /// `minikube kubectl --`.
  pub args: Vec<String>,
  pub flags: KubectlFlags,
}

impl Default for KubectlConfig {
  fn default() -> Self {
    Self {
      program: KUBECTL_PROGRAM.to_string(),
      args: Vec::new(),
      flags: KubectlFlags::default(),
    }
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionInfo {
  client_version: ClientVersion,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClientVersion {
  #[serde(default)]
  major: String,
  #[serde(default)]
  minor: String,
  #[serde(default)]
  git_version: String,
}

impl ClientVersion {
  /// Numeric (major, minor). Vendor builds report minors like `28+`.
  fn number(&self) -> Option<(u32, u32)> {
    let digits = |s: &str| -> Option<u32> {
      let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
      s[..end].parse().ok()
    };
    Some((digits(&self.major)?, digits(&self.minor)?))
  }
}

fn parse_client_version(stdout: &[u8]) -> Result<ClientVersion, KubectlError> {
  let info: VersionInfo =
    serde_json::from_slice(stdout).map_err(|e| KubectlError::UnknownVersion(e.to_string()))?;
  Ok(info.client_version)
}

/// Cluster control through the `kubectl` binary.
#[derive(Debug, Clone)]
pub struct KubectlCli {
  config: KubectlConfig,
  namespace: Option<String>,
  kube_context: Option<String>,
}

impl KubectlCli {
  pub fn new(config: KubectlConfig, namespace: Option<String>, kube_context: Option<String>) -> Self {
    Self {
      config,
      namespace,
      kube_context,
    }
  }

  fn args(&self, verb: &str, flags: &[String], extra: &[&str]) -> Vec<String> {
    let mut args = self.config.args.clone();
    if let Some(context) = &self.kube_context {
      args.push(format!("--context={context}"));
    }
    if let Some(namespace) = &self.namespace {
      args.push(format!("--namespace={namespace}"));
    }
    args.push(verb.to_string());
    args.extend(self.config.flags.global.iter().cloned());
    args.extend(flags.iter().cloned());
    args.extend(extra.iter().map(|s| s.to_string()));
    args
  }

  /// Run a kubectl command, returning its stdout on success.
  async fn run(
    &self,
    cancel: &CancellationToken,
    verb: &'static str,
    flags: &[String],
    extra: &[&str],
    stdin: Option<&[u8]>,
  ) -> Result<Vec<u8>, KubectlError> {
    let mut command = Command::new(&self.config.program);
    command.args(self.args(verb, flags, extra));

    let output = process::run(command, stdin, cancel).await?;

    if !output.status.success() {
      return Err(KubectlError::Failed {
        verb,
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      });
    }

    Ok(output.stdout)
  }

  async fn client_version(&self, cancel: &CancellationToken) -> Result<ClientVersion, KubectlError> {
    let stdout = self
      .run(cancel, "version", &[], &["--client", "-o", "json"], None)
      .await?;
    parse_client_version(&stdout)
  }
}

impl ClusterControl for KubectlCli {
  async fn apply(
    &self,
    cancel: &CancellationToken,
    out: &mut dyn Write,
    manifests: &ManifestList,
  ) -> Result<(), KubectlError> {
    if manifests.is_empty() {
      debug!("no manifests to apply");
      return Ok(());
    }

    info!(count = manifests.len(), "applying manifests");
    let rendered = manifests.to_string();
    let stdout = self
      .run(cancel, "apply", &self.config.flags.apply, &["-f", "-"], Some(rendered.as_bytes()))
      .await?;

    out.write_all(&stdout).map_err(KubectlError::Output)
  }

  async fn delete(
    &self,
    cancel: &CancellationToken,
    out: &mut dyn Write,
    manifests: &ManifestList,
  ) -> Result<(), KubectlError> {
    if manifests.is_empty() {
      debug!("no manifests to delete");
      return Ok(());
    }

    info!(count = manifests.len(), "deleting manifests");
    let rendered = manifests.to_string();
    let stdout = self
      .run(
        cancel,
        "delete",
        &self.config.flags.delete,
        &["--ignore-not-found=true", "-f", "-"],
        Some(rendered.as_bytes()),
      )
      .await?;

    out.write_all(&stdout).map_err(KubectlError::Output)
  }

  async fn version(&self, cancel: &CancellationToken) -> String {
    match self.client_version(cancel).await {
      Ok(version) if !version.git_version.is_empty() => version.git_version,
      Ok(_) => "unknown".to_string(),
      Err(e) => {
        debug!(error = %e, "failed to get kubectl version");
        "unknown".to_string()
      }
    }
  }

  async fn check_version(&self, cancel: &CancellationToken) -> Result<(), KubectlError> {
    let version = self.client_version(cancel).await?;
    let Some(number) = version.number() else {
      return Err(KubectlError::UnknownVersion(format!(
        "unparsable version {}.{}",
        version.major, version.minor
      )));
    };

    if number < (1, MIN_KUBECTL_MINOR) {
      return Err(KubectlError::VersionTooOld {
        version: version.git_version,
        minimum: format!("v1.{MIN_KUBECTL_MINOR}"),
      });
    }

    Ok(())
  }
}
