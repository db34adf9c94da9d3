//! The composition root: owns both state slots, the active-stream counter,
//! and the event loop that serializes every transition onto one task
//! (§4.1, §5 "Execution model").
//!
//! Grounded on `proto/h2/ping.rs`'s `channel()` constructor + `Ponger`
//! struct: a public, cheaply-cloneable handle (`Handle`, here; `Recorder`
//! there) paired with a private driver (`Driver`, here; `Ponger` there) that
//! the caller is expected to poll to completion — the same split hyper uses
//! between `Recorder` and the `Ponger` its `Connection` future drives.

use std::future::{poll_fn, Future};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::collaborators::Collaborators;
use crate::config::Config;
use crate::dispatch::{Event, EventSink};
use crate::error::Error;
use crate::outcome::Outcome;
use crate::ping::AckTarget;
use crate::rt::{Executor, Sleep, Timer};
use crate::state::Slot;
use crate::streams::ActiveStreams;
use crate::transport::{BoxFuture, Channel, Frame, IdlenessDetector, TlsCloseNotify};
use crate::{goaway, halfclose, keepalive, ping, shutdown};

/// An RAII registration for one active stream (§4.6). Constructed by
/// [`Handle::register_stream`]; dropping it is the close-listener firing.
#[derive(Debug)]
pub struct StreamGuard {
    sink: EventSink,
    streams: ActiveStreams,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        if self.streams.decrement() {
            self.sink.stream_closed();
        }
    }
}

/// A cloneable handle to a running manager. All clones share one event
/// loop; none of these methods block.
#[derive(Clone, Debug)]
pub struct Handle {
    sink: EventSink,
    streams: ActiveStreams,
}

impl Handle {
    /// Registers a new stream (§4.6). The returned guard must be dropped
    /// when the stream's own close signal fires — exactly once.
    pub fn register_stream(&self) -> StreamGuard {
        self.streams.increment();
        self.sink.stream_registered();
        StreamGuard {
            sink: self.sink.clone(),
            streams: self.streams.clone(),
        }
    }

    /// Begins the two-GOAWAY graceful close procedure (§4.5). Re-entrant
    /// calls after the first are swallowed. The returned receiver resolves
    /// once the first GOAWAY/PING pair has been queued — before either
    /// reaches the transport — which is the right moment for a caller to
    /// stop accepting new work.
    pub fn initiate_graceful_close(&self, local: bool) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        self.sink.user_initiate_graceful_close(local, Some(tx));
        rx
    }

    /// The raw event sink, for feeding transport-observed events (PINGs,
    /// half-closes, channel closure) into the manager.
    pub fn events(&self) -> EventSink {
        self.sink.clone()
    }
}

/// Drives the event loop. Callers `.await` this directly or hand it to
/// their own executor (`tokio::spawn(driver.run())`); the manager never
/// spawns itself onto a runtime it wasn't handed.
pub struct Driver {
    ctx: Collaborators,
    rx: mpsc::UnboundedReceiver<Event>,
    ka_slot: Slot,
    gc_slot: Slot,
    gc_cause: Option<Error>,
    input_shutdown_timer: Option<Pin<Box<dyn Sleep>>>,
    streams: ActiveStreams,
    draining: bool,
    closed: bool,
}

/// Constructs a manager bound to one connection. `idleness` is armed
/// immediately if `config.idle_duration` is set; otherwise keep-alive never
/// fires (§3 "idleDuration ≤0 disables keep-alive probing").
pub fn spawn(
    channel: Arc<dyn Channel>,
    config: Config,
    timer: Arc<dyn Timer + Send + Sync>,
    exec: Arc<dyn Executor<BoxFuture<()>> + Send + Sync>,
    idleness: Arc<dyn IdlenessDetector>,
    tls: Option<Arc<dyn TlsCloseNotify>>,
) -> (Handle, Driver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let sink = EventSink::new(tx.clone());

    if let Some(idle_duration) = config.idle_duration {
        idleness.watch(idle_duration, sink.clone());
    }

    debug!(?config, is_tls = channel.is_tls(), is_duplex = channel.is_duplex(), "manager constructed");

    let streams = ActiveStreams::new();
    let ctx = Collaborators {
        channel,
        timer,
        exec,
        tls,
        config,
        raw_tx: tx,
    };

    let handle = Handle {
        sink,
        streams: streams.clone(),
    };
    let driver = Driver {
        ctx,
        rx,
        ka_slot: Slot::Idle,
        gc_slot: Slot::Idle,
        gc_cause: None,
        input_shutdown_timer: None,
        streams,
        draining: false,
        closed: false,
    };
    (handle, driver)
}

impl std::fmt::Debug for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("keep_alive", &self.ka_slot)
            .field("graceful_close", &self.gc_slot)
            .field("active_streams", &self.streams.get())
            .field("draining", &self.draining)
            .field("closed", &self.closed)
            .finish()
    }
}

impl Driver {
    /// Runs the event loop to completion. Returns once `channelClosed` has
    /// been processed or the manager has fully closed the channel itself.
    pub async fn run(mut self) {
        while !self.closed {
            let outcome = self.next_outcome().await;
            self.apply(outcome);
        }
    }

    async fn next_outcome(&mut self) -> Outcome {
        let Driver {
            ctx,
            rx,
            ka_slot,
            gc_slot,
            gc_cause,
            input_shutdown_timer,
            streams,
            ..
        } = self;

        tokio::select! {
            event = rx.recv() => match event {
                Some(event) => handle_event(ctx, ka_slot, gc_slot, gc_cause, input_shutdown_timer, streams, event),
                None => Outcome::AlreadyClosed,
            },
            () = poll_fn(|cx| poll_slot_timer(ka_slot, cx)) => {
                keepalive::on_ack_timeout_fired(ka_slot, ctx)
            }
            () = poll_fn(|cx| poll_slot_timer(gc_slot, cx)) => {
                goaway::on_ack_timeout_fired(gc_slot, gc_cause, ctx)
            }
            () = poll_fn(|cx| poll_optional_timer(input_shutdown_timer, cx)) => {
                *input_shutdown_timer = None;
                shutdown::on_input_shutdown_timeout_fired()
            }
        }
    }

    fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::None => {}
            Outcome::AlreadyClosed => {
                keepalive::on_channel_closed(&mut self.ka_slot);
                goaway::on_channel_closed(&mut self.gc_slot);
                self.input_shutdown_timer = None;
                self.closed = true;
                debug!(active_streams = self.streams.get(), "channel already closed");
            }
            Outcome::Close(cause) if self.draining => self.finish_close(cause),
            Outcome::Close(cause) => self.close0(cause),
        }
    }

    /// `close0(cause)` (§4.8), idempotent: the first call forces both slots
    /// to `Closed` and either closes immediately (a cause is present) or
    /// starts the drain sequence; later calls while already closed/draining
    /// are no-ops, since `finish_close` handles the drain's own conclusion.
    fn close0(&mut self, cause: Option<Error>) {
        if self.closed || self.draining {
            return;
        }
        keepalive::on_channel_closed(&mut self.ka_slot);
        goaway::on_channel_closed(&mut self.gc_slot);

        match cause {
            Some(cause) => {
                debug!(%cause, "closing with cause");
                self.ctx.channel.close_with_cause(cause);
                self.closed = true;
            }
            None => {
                debug!("closing cleanly, starting drain");
                self.draining = true;
                shutdown::start_drain(&self.ctx);
            }
        }
    }

    fn finish_close(&mut self, cause: Option<Error>) {
        match cause {
            Some(cause) => {
                debug!(%cause, "hard-closing after drain");
                self.ctx.channel.close_with_cause(cause);
            }
            None => {
                debug!("drain complete, closing cleanly");
                self.ctx.channel.close();
            }
        }
        self.closed = true;
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_event(
    ctx: &Collaborators,
    ka_slot: &mut Slot,
    gc_slot: &mut Slot,
    gc_cause: &mut Option<Error>,
    input_shutdown_timer: &mut Option<Pin<Box<dyn Sleep>>>,
    streams: &ActiveStreams,
    event: Event,
) -> Outcome {
    match event {
        Event::PingAckReceived(payload) => match ping::classify_ack(payload) {
            AckTarget::KeepAlive => keepalive::on_ping_ack_received(ka_slot),
            AckTarget::GracefulClose => goaway::on_ping_ack_received(gc_slot, gc_cause, ctx),
            AckTarget::Unknown => {
                debug!(payload, "unknown PING-ACK payload ignored");
                Outcome::None
            }
        },
        Event::PingReceivedNeedsAck(payload) => {
            // The echo is unconditional (§4.3): the peer may probe us
            // regardless of our own state.
            let fut = ctx
                .channel
                .write_and_flush(Frame::Ping { payload, ack: true });
            ctx.spawn_write(fut, Event::PingEchoCompleted);
            Outcome::None
        }
        Event::PingEchoCompleted(result) => match result {
            Ok(()) => Outcome::None,
            Err(err) => Outcome::Close(Some(err)),
        },
        Event::IdleDetected => keepalive::on_idle_detected(ka_slot, ctx, streams),
        Event::StreamRegistered => Outcome::None,
        Event::StreamClosed => goaway::on_stream_count_reached_zero(gc_slot),
        Event::OutputHalfCloseObserved => halfclose::on_output_half_close_observed(ctx, gc_slot),
        Event::InputHalfCloseObserved => {
            halfclose::on_input_half_close_observed(input_shutdown_timer, ctx, gc_slot)
        }
        Event::UserInitiateGracefulClose {
            local,
            when_initiated,
        } => goaway::on_user_initiate(gc_slot, ctx, local, when_initiated),
        Event::ChannelClosed => Outcome::AlreadyClosed,
        Event::KeepAlivePingWriteCompleted(result) => {
            keepalive::on_ping_write_completed(ka_slot, ctx, result)
        }
        Event::KeepAliveTimeoutGoAwayWriteCompleted(result) => {
            keepalive::on_timeout_go_away_write_completed(result)
        }
        Event::GracefulFirstWriteCompleted(result) => {
            goaway::on_first_write_completed(gc_slot, ctx, result)
        }
        Event::GracefulSecondWriteCompleted(result) => {
            goaway::on_second_write_completed(gc_cause, streams, result)
        }
        Event::EmptyFlushCompleted(_) | Event::CloseNotifyCompleted(_) => {
            // Folded into the single drain chain in `shutdown::start_drain`;
            // these variants are reserved for a future split of that chain
            // into independently-observable steps.
            Outcome::None
        }
        Event::OutputShutdownCompleted(result) => {
            let (outcome, timer) = shutdown::on_output_shutdown_completed(ctx, result);
            *input_shutdown_timer = timer;
            outcome
        }
    }
}

fn poll_slot_timer(slot: &mut Slot, cx: &mut Context<'_>) -> Poll<()> {
    match slot {
        Slot::InFlight { timer: Some(timer) } => timer.as_mut().poll(cx),
        _ => Poll::Pending,
    }
}

fn poll_optional_timer(timer: &mut Option<Pin<Box<dyn Sleep>>>, cx: &mut Context<'_>) -> Poll<()> {
    match timer {
        Some(timer) => timer.as_mut().poll(cx),
        None => Poll::Pending,
    }
}
