//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

pub const DEPLOYMENT: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
spec:
  template:
    metadata:
      labels:
        app: web
    spec:
      containers:
        - name: app
          image: app:dev
"#;

/// Stand-in for `kustomize build`: prints `all.yaml` from the overlay dir.
pub const KUSTOMIZE_CAT: &str = r#"cat "$2/all.yaml""#;

/// Stand-in for kubectl that echoes its arguments, then its stdin.
pub const KUBECTL_ECHO: &str = r#"echo "$@"; cat"#;

/// Isolated test environment.
///
/// Each test gets its own temporary working directory holding an overlay and
/// a `kdeploy.yaml`.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// Create an empty test environment.
  pub fn empty() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  /// An environment whose `overlay/` renders [`DEPLOYMENT`] through
  /// `kustomize_script` and submits it through `kubectl_script`.
  pub fn with_tools(kustomize_script: &str, kubectl_script: &str) -> Self {
    let env = Self::empty();
    env.write_file("overlay/kustomization.yaml", "resources:\n  - all.yaml\n");
    env.write_file("overlay/all.yaml", DEPLOYMENT);
    env.write_file(
      "kdeploy.yaml",
      &format!(
        r#"path: overlay
kustomize:
  program: /bin/sh
  args: ["-c", '{kustomize_script}', kustomize]
kubectl:
  program: /bin/sh
  args: ["-c", '{kubectl_script}', kubectl]
"#
      ),
    );
    env
  }

  /// An environment where both tools are `true`: nothing renders and every
  /// kubectl call succeeds silently.
  pub fn with_noop_tools() -> Self {
    let env = Self::empty();
    env.write_file(
      "kdeploy.yaml",
      "kustomize:\n  program: \"true\"\nkubectl:\n  program: \"true\"\n",
    );
    env
  }

  pub fn path(&self) -> &Path {
    self.temp.path()
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  pub fn join(&self, relative_path: &str) -> PathBuf {
    self.temp.path().join(relative_path)
  }

  /// Get a Command for the kdeploy binary running inside the environment.
  pub fn kdeploy_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("kdeploy");
    cmd.current_dir(self.path());
    cmd.env_remove("RUST_LOG");
    cmd
  }
}
