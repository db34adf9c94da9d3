//! EventDispatcher (§4.1): the event alphabet every public entrypoint
//! trampolines onto, and the handle used to submit events from any thread.
//!
//! Every entrypoint here unconditionally enqueues onto the manager's event
//! channel rather than executing inline when already on the event-loop
//! task. The source this spec was distilled from special-cases the
//! already-on-loop path to skip a hop; that's a latency micro-optimization
//! orthogonal to correctness (the single-consumer channel still serializes
//! every event exactly the same either way), so it's simplified away here —
//! see `DESIGN.md`.

use tokio::sync::{mpsc, oneshot};

use crate::error::Error;

pub(crate) type GracefulCloseResult = Result<(), Error>;

pub(crate) enum Event {
    PingAckReceived(u64),
    PingReceivedNeedsAck(u64),
    IdleDetected,
    StreamRegistered,
    StreamClosed,
    OutputHalfCloseObserved,
    InputHalfCloseObserved,
    UserInitiateGracefulClose {
        local: bool,
        when_initiated: Option<oneshot::Sender<()>>,
    },
    ChannelClosed,

    // Write-completion continuations. These never come from outside the
    // manager — they're re-injected by `Collaborators::spawn_write` once a
    // background write future resolves, so the event loop can react to them
    // the same way it reacts to everything else (§9 "Write-completion
    // callbacks").
    PingEchoCompleted(Result<(), Error>),
    KeepAlivePingWriteCompleted(Result<(), Error>),
    KeepAliveTimeoutGoAwayWriteCompleted(Result<(), Error>),
    GracefulFirstWriteCompleted(Result<(), Error>),
    GracefulSecondWriteCompleted(Result<(), Error>),
    EmptyFlushCompleted(Result<(), Error>),
    CloseNotifyCompleted(Result<(), Error>),
    OutputShutdownCompleted(Result<(), Error>),
}

/// A cloneable handle used to feed events into the manager's event loop
/// from any thread. Cheap to clone (wraps an `mpsc::UnboundedSender`).
#[derive(Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<Event>,
}

impl std::fmt::Debug for EventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSink").finish()
    }
}

impl EventSink {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Event>) -> Self {
        EventSink { tx }
    }

    fn send(&self, event: Event) {
        // The receiver only goes away once the manager has fully shut
        // down, at which point further events are legitimately dropped.
        let _ = self.tx.send(event);
    }

    /// A PING-ACK arrived on the connection.
    pub fn ping_ack_received(&self, payload: u64) {
        self.send(Event::PingAckReceived(payload));
    }

    /// A PING without the ACK flag arrived; the manager always echoes it
    /// back regardless of its own state (§4.3).
    pub fn ping_received_needs_ack(&self, payload: u64) {
        self.send(Event::PingReceivedNeedsAck(payload));
    }

    /// The transport's idle watchdog fired (§6 "IdlenessDetector").
    pub fn idle_detected(&self) {
        self.send(Event::IdleDetected);
    }

    /// The peer half-closed its output direction (we can no longer read).
    pub fn output_half_close_observed(&self) {
        self.send(Event::OutputHalfCloseObserved);
    }

    /// The peer reciprocated our own output shutdown by shutting down its
    /// write direction in turn (§4.8 step 4); also cancels the
    /// input-shutdown timer installed while waiting for it.
    pub fn input_half_close_observed(&self) {
        self.send(Event::InputHalfCloseObserved);
    }

    /// The underlying channel is fully closed.
    pub fn channel_closed(&self) {
        self.send(Event::ChannelClosed);
    }

    pub(crate) fn stream_registered(&self) {
        self.send(Event::StreamRegistered);
    }

    pub(crate) fn stream_closed(&self) {
        self.send(Event::StreamClosed);
    }

    pub(crate) fn user_initiate_graceful_close(
        &self,
        local: bool,
        when_initiated: Option<oneshot::Sender<()>>,
    ) {
        self.send(Event::UserInitiateGracefulClose {
            local,
            when_initiated,
        });
    }
}
