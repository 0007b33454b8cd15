//! CLI integration tests for kdeploy.
//!
//! `kustomize` and `kubectl` are replaced by `/bin/sh` scripts configured in
//! `kdeploy.yaml`, so these tests never touch a real cluster.

mod cleanup_tests;
mod common;
mod deploy_tests;
mod deps_tests;
