//! Cleanup command integration tests.

#![cfg(unix)]

use predicates::prelude::*;

use super::common::{KUBECTL_ECHO, KUSTOMIZE_CAT, TestEnv};

#[test]
fn cleanup_deletes_untransformed_manifests() {
  let env = TestEnv::with_tools(KUSTOMIZE_CAT, KUBECTL_ECHO);

  env
    .kdeploy_cmd()
    .arg("cleanup")
    .assert()
    .success()
    .stdout(predicate::str::contains("delete --ignore-not-found=true -f -"))
    .stdout(predicate::str::contains("image: app:dev"))
    .stdout(predicate::str::contains("kdeploy.dev/deployer").not())
    .stdout(predicate::str::contains("Cleanup complete!"));
}

#[test]
fn cleanup_with_empty_overlay_succeeds() {
  let env = TestEnv::with_noop_tools();

  env
    .kdeploy_cmd()
    .arg("cleanup")
    .assert()
    .success()
    .stdout(predicate::str::contains("Cleanup complete!"));
}

#[test]
fn cleanup_reports_delete_failure() {
  let env = TestEnv::with_tools(KUSTOMIZE_CAT, r#"echo "connection refused" >&2; exit 1"#);

  env
    .kdeploy_cmd()
    .arg("cleanup")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Cleanup failed: delete:"))
    .stderr(predicate::str::contains("connection refused"));
}
