//! Deploy lifecycle notifications.
//!
//! The deployer reports progress to an observer through [`DeployEventSink`].
//! Notifications are fire-and-forget: a sink must not block, and the deployer
//! never looks at what the sink does with them.

use tracing::{error, info};

/// Lifecycle event emitted by a deploy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployEvent {
  /// Manifests were loaded and are being transformed and applied.
  InProgress,

  /// Manifests were applied successfully.
  Complete,

  /// The deploy failed.
  Failed { error: String },
}

/// Trait for receiving deploy events.
pub trait DeployEventSink: Send + Sync {
  fn on_event(&self, event: DeployEvent);
}

/// Sink that discards every event.
pub struct NoopEventSink;

impl DeployEventSink for NoopEventSink {
  fn on_event(&self, _event: DeployEvent) {}
}

/// Sink that records events in the log.
pub struct TracingEventSink;

impl DeployEventSink for TracingEventSink {
  fn on_event(&self, event: DeployEvent) {
    match event {
      DeployEvent::InProgress => info!(status = "in-progress", "deploy"),
      DeployEvent::Complete => info!(status = "complete", "deploy"),
      DeployEvent::Failed { error } => error!(status = "failed", %error, "deploy"),
    }
  }
}
