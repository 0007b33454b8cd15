//! Deploy command integration tests.

#![cfg(unix)]

use predicates::prelude::*;

use super::common::{KUBECTL_ECHO, KUSTOMIZE_CAT, TestEnv};

#[test]
fn deploy_applies_rewritten_and_labelled_manifests() {
  let env = TestEnv::with_tools(KUSTOMIZE_CAT, KUBECTL_ECHO);

  env
    .kdeploy_cmd()
    .args(["--default-repo", "gcr.io/proj", "deploy"])
    .args(["--image", "app=app@sha256:abcd", "--label", "team=core"])
    .assert()
    .success()
    .stdout(predicate::str::contains("apply -f -"))
    .stdout(predicate::str::contains("image: gcr.io/proj/app@sha256:abcd"))
    .stdout(predicate::str::contains("kdeploy.dev/deployer: kustomize"))
    .stdout(predicate::str::contains("team: core"))
    .stdout(predicate::str::contains("Deploy complete!"));
}

#[test]
fn deploy_passes_namespace_and_context() {
  let env = TestEnv::with_tools(KUSTOMIZE_CAT, KUBECTL_ECHO);

  env
    .kdeploy_cmd()
    .args(["--namespace", "dev", "--kube-context", "kind-dev", "deploy"])
    .assert()
    .success()
    .stdout(predicate::str::contains("--context=kind-dev --namespace=dev apply -f -"));
}

#[test]
fn deploy_with_empty_overlay_does_nothing() {
  let env = TestEnv::with_noop_tools();

  env
    .kdeploy_cmd()
    .arg("deploy")
    .assert()
    .success()
    .stdout(predicate::str::contains("Nothing to deploy."));
}

#[test]
fn deploy_reports_kustomize_failure() {
  let env = TestEnv::with_tools(r#"echo "accumulating resources: missing" >&2; exit 1"#, KUBECTL_ECHO);

  env
    .kdeploy_cmd()
    .arg("deploy")
    .assert()
    .failure()
    .stdout(predicate::str::contains("apply").not())
    .stderr(predicate::str::contains("reading manifests"))
    .stderr(predicate::str::contains("accumulating resources: missing"));
}

#[test]
fn deploy_reports_apply_failure() {
  let env = TestEnv::with_tools(KUSTOMIZE_CAT, r#"echo "forbidden" >&2; exit 1"#);

  env
    .kdeploy_cmd()
    .arg("deploy")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Deploy failed: apply:"))
    .stderr(predicate::str::contains("forbidden"));
}

#[test]
fn deploy_rejects_malformed_image() {
  let env = TestEnv::with_noop_tools();

  env
    .kdeploy_cmd()
    .args(["deploy", "--image", "app"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("expected KEY=VALUE"));
}
