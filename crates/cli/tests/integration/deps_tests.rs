//! Deps command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

fn layered_overlay() -> TestEnv {
  let env = TestEnv::empty();
  env.write_file("base/kustomization.yaml", "resources: [service.yaml]\n");
  env.write_file(
    "overlay/kustomization.yaml",
    "bases: [../base]\nresources: [deployment.yaml]\nconfigMapGenerator:\n  - name: cfg\n    files: [app.properties]\n",
  );
  env
}

#[test]
fn deps_lists_base_files_first() {
  let env = layered_overlay();

  let output = env
    .kdeploy_cmd()
    .args(["--path", "overlay", "deps"])
    .output()
    .unwrap();

  assert!(output.status.success());
  let overlay = std::fs::canonicalize(env.join("overlay")).unwrap();
  let expected = vec![
    overlay.join("../base").join("kustomization.yaml"),
    overlay.join("../base").join("service.yaml"),
    overlay.join("kustomization.yaml"),
    overlay.join("deployment.yaml"),
    overlay.join("app.properties"),
  ];
  let expected: Vec<String> = expected.iter().map(|p| p.display().to_string()).collect();
  let stdout = String::from_utf8(output.stdout).unwrap();
  assert_eq!(stdout.lines().collect::<Vec<_>>(), expected);
}

#[test]
fn deps_json_is_an_array_of_paths() {
  let env = layered_overlay();

  let output = env
    .kdeploy_cmd()
    .args(["--path", "overlay", "deps", "--format", "json"])
    .output()
    .unwrap();

  assert!(output.status.success());
  let paths: Vec<String> = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(paths.len(), 5);
  assert!(paths.iter().all(|p| std::path::Path::new(p).is_absolute()));
}

#[test]
fn deps_reads_overlay_from_config_file() {
  let env = layered_overlay();
  env.write_file("kdeploy.yaml", "path: base\n");

  env
    .kdeploy_cmd()
    .arg("deps")
    .assert()
    .success()
    .stdout(predicate::str::contains("service.yaml"))
    .stdout(predicate::str::contains("deployment.yaml").not());
}

#[test]
fn deps_of_missing_overlay_fails() {
  let env = TestEnv::empty();

  env
    .kdeploy_cmd()
    .args(["--path", "nowhere", "deps"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("kustomization not found"));
}

#[test]
fn deps_reports_circular_bases() {
  let env = TestEnv::empty();
  env.write_file("a/kustomization.yaml", "bases: [../b]\n");
  env.write_file("b/kustomization.yaml", "bases: [../a]\n");

  env
    .kdeploy_cmd()
    .args(["--path", "a", "deps"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("circular bases"));
}
