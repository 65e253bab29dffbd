// ── Refresh status streams ──
//
// Subscription types for consuming coordinator outcomes.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::coordinator::RefreshStatus;

/// A subscription to the coordinator's [`RefreshStatus`].
///
/// Provides point-in-time access and change notification via
/// [`changed()`](Self::changed) or by converting to a `Stream`.
pub struct StatusStream {
    current: RefreshStatus,
    receiver: watch::Receiver<RefreshStatus>,
}

impl StatusStream {
    pub(crate) fn new(receiver: watch::Receiver<RefreshStatus>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Status captured at creation or at the last `changed()`.
    pub fn current(&self) -> &RefreshStatus {
        &self.current
    }

    /// Latest status (may have changed since creation).
    pub fn latest(&self) -> RefreshStatus {
        self.receiver.borrow().clone()
    }

    /// Wait for the next cycle outcome.
    /// Returns `None` once the coordinator has been dropped.
    pub async fn changed(&mut self) -> Option<RefreshStatus> {
        self.receiver.changed().await.ok()?;
        let status = self.receiver.borrow_and_update().clone();
        self.current = status.clone();
        Some(status)
    }

    /// Convert into a `Stream` yielding the current status, then every change.
    pub fn into_stream(self) -> StatusWatchStream {
        StatusWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct StatusWatchStream {
    inner: WatchStream<RefreshStatus>,
}

impl Stream for StatusWatchStream {
    type Item = RefreshStatus;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
