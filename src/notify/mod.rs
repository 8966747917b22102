//! Progress notification seam.
//!
//! The orchestrator reports checkpoints (task start, per-iteration
//! progress, completion, error) through this trait without depending on
//! any transport. Notification is best-effort by contract: a sink that
//! fails must swallow its own failure, never the task's.

use async_trait::async_trait;
use std::path::Path;

/// Sink for task progress messages and artifact delivery.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a short progress message.
    async fn notify(&self, text: &str);

    /// Deliver a file artifact (report, diagnostic log) with a caption.
    async fn deliver_file(&self, path: &Path, caption: &str);
}

/// Default sink that writes checkpoints to the tracing log.
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, text: &str) {
        tracing::info!(target: "delver::notify", "{text}");
    }

    async fn deliver_file(&self, path: &Path, caption: &str) {
        tracing::info!(target: "delver::notify", path = %path.display(), "{caption}");
    }
}
