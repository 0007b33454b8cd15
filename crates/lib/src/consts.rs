//! Well-known names shared across the crate.

/// File name of the overlay descriptor inside an overlay directory.
pub const KUSTOMIZATION_FILENAME: &str = "kustomization.yaml";

/// Default compositing tool binary.
pub const KUSTOMIZE_PROGRAM: &str = "kustomize";

/// Default cluster-control binary.
pub const KUBECTL_PROGRAM: &str = "kubectl";

/// Label key identifying which deployer produced a resource.
pub const DEPLOYER_LABEL: &str = "kdeploy.dev/deployer";

/// Value of [`DEPLOYER_LABEL`] for resources deployed through kustomize.
pub const KUSTOMIZE_DEPLOYER: &str = "kustomize";

/// Oldest kubectl minor version (1.x) with built-in kustomize support.
pub const MIN_KUBECTL_MINOR: u32 = 12;

/// Configuration file read from the working directory when present.
pub const CONFIG_FILENAME: &str = "kdeploy.yaml";
