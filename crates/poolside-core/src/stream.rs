// ── Reactive snapshot subscription ──
//
// Subscription handle vended by the Account. Wraps a `watch` receiver
// with a small convenience surface for consumers that want either
// polling (`current()`) or push (`changed()` / `into_stream()`).

use std::sync::Arc;

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::PollSnapshot;

/// Subscription to snapshot changes.
pub struct SnapshotStream {
    rx: watch::Receiver<Option<Arc<PollSnapshot>>>,
}

impl SnapshotStream {
    pub(crate) fn new(rx: watch::Receiver<Option<Arc<PollSnapshot>>>) -> Self {
        Self { rx }
    }

    /// The latest snapshot without waiting.
    pub fn current(&self) -> Option<Arc<PollSnapshot>> {
        self.rx.borrow().clone()
    }

    /// Wait for the next snapshot change and return the new value.
    /// Returns `None` when the account session has shut down.
    pub async fn changed(&mut self) -> Option<Arc<PollSnapshot>> {
        self.rx.changed().await.ok()?;
        self.rx.borrow_and_update().clone()
    }

    /// Adapt into a `futures` Stream for combinator-style consumers.
    pub fn into_stream(self) -> WatchStream<Option<Arc<PollSnapshot>>> {
        WatchStream::new(self.rx)
    }
}
