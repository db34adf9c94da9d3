//! Active-stream accounting (§4.6).
//!
//! Stream-close callbacks may arrive off the event-loop thread (they're
//! driven by the stream registry, not by us), so the counter itself is
//! atomic. Its zero-crossing is re-dispatched onto the event loop (via
//! `EventSink::stream_closed`) before being combined with any other state,
//! same as `proto/h2/ping.rs`'s `Arc<Mutex<Shared>>` is the single piece of
//! cross-task state in that module.

use std::sync::atomic::{AtomicIsize, Ordering};
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
pub(crate) struct ActiveStreams {
    count: Arc<AtomicIsize>,
}

impl ActiveStreams {
    pub(crate) fn new() -> Self {
        ActiveStreams::default()
    }

    /// Registers a new stream. Pair with exactly one `decrement` when that
    /// stream's close signal fires (§3 invariant: one +1 matched by one -1).
    pub(crate) fn increment(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    /// Returns `true` if this decrement brought the count to zero.
    pub(crate) fn decrement(&self) -> bool {
        let prev = self.count.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(prev > 0, "active stream count went negative");
        prev == 1
    }

    pub(crate) fn get(&self) -> isize {
        self.count.load(Ordering::SeqCst)
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.get() == 0
    }
}
