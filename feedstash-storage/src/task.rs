//! Delivery plumbing for the caching use-cases.
//!
//! Use-case operations run on the store's schedule, not the caller's, so
//! their results come back through an [`InFlight`] handle. Two flags gate
//! delivery: the per-request cancellation flag on the handle, and the
//! [`Liveness`] flag shared with the owning use-case. A torn-down owner
//! or a cancelled request drops the in-flight result silently instead of
//! delivering it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use feedstash_core::Timestamp;
use tokio::sync::oneshot;

/// Injected time source for the feed-caching use-case.
///
/// Snapshot timestamps always come from here, never from a store.
pub type Clock = Arc<dyn Fn() -> Timestamp + Send + Sync>;

/// Clock backed by the system time.
pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// Clock pinned to a fixed instant. Intended for tests.
pub fn fixed_clock(at: Timestamp) -> Clock {
    Arc::new(move || at)
}

/// Shared liveness flag owned by a use-case and revoked when it drops.
///
/// Scheduled continuations capture a clone by value and check it before
/// delivering, so results issued against a released owner go nowhere.
#[derive(Debug, Clone)]
pub struct Liveness {
    live: Arc<AtomicBool>,
}

impl Liveness {
    pub fn new() -> Self {
        Self {
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Mark the owner as gone. All subsequent delivery attempts no-op.
    pub fn revoke(&self) {
        self.live.store(false, Ordering::SeqCst);
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to one in-flight use-case operation.
///
/// Cancelling suppresses delivery for this caller only; the underlying
/// store operation still runs to completion. [`InFlight::outcome`]
/// resolves to `None` when the request was cancelled or the owning
/// use-case was released before the result came back.
#[derive(Debug)]
pub struct InFlight<T> {
    rx: oneshot::Receiver<T>,
    cancelled: Arc<AtomicBool>,
}

impl<T> InFlight<T> {
    /// Build a connected delivery/handle pair.
    pub(crate) fn channel() -> (Delivery<T>, InFlight<T>) {
        let (tx, rx) = oneshot::channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let delivery = Delivery {
            tx,
            cancelled: Arc::clone(&cancelled),
        };
        (delivery, InFlight { rx, cancelled })
    }

    /// Prevent any further result delivery to this handle.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Wait for the result. `None` means the delivery was suppressed.
    pub async fn outcome(self) -> Option<T> {
        self.rx.await.ok()
    }
}

/// Sending half of an [`InFlight`] pair.
#[derive(Debug)]
pub(crate) struct Delivery<T> {
    tx: oneshot::Sender<T>,
    cancelled: Arc<AtomicBool>,
}

impl<T> Delivery<T> {
    /// Deliver `value` unless the request was cancelled or the owner is
    /// gone. A suppressed value is dropped, not queued.
    pub(crate) fn deliver(self, live: &Liveness, value: T) {
        if live.is_live() && !self.cancelled.load(Ordering::SeqCst) {
            let _ = self.tx.send(value);
        }
    }
}
