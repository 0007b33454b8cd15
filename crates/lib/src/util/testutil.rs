//! Test utilities for kdeploy-lib.
//!
//! Tests stand in for `kustomize` and `kubectl` with small shell scripts.
//! The script is passed to `/bin/sh -c` with a dummy `$0`, so the arguments the
//! crate appends arrive as `$1`, `$2`, ... exactly as the real tool would see them.

/// Program and leading arguments that run `script` in place of a real tool.
#[cfg(unix)]
pub fn fake_tool(script: &str) -> (String, Vec<String>) {
  (
    "/bin/sh".to_string(),
    vec!["-c".to_string(), script.to_string(), "fake-tool".to_string()],
  )
}

/// A tool that copies its standard input to standard output.
#[cfg(unix)]
pub fn echo_stdin_tool() -> (String, Vec<String>) {
  fake_tool("cat")
}

/// A tool that prints `stderr` on standard error and exits with `code`.
#[cfg(unix)]
pub fn failing_tool(stderr: &str, code: i32) -> (String, Vec<String>) {
  fake_tool(&format!("echo '{}' >&2; exit {}", stderr, code))
}
