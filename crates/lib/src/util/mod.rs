//! Shared utilities.
//!
//! Common utilities used across the crate including subprocess execution and
//! test helpers.

pub mod process;

#[cfg(test)]
pub mod testutil;
