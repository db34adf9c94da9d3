//! KeepAliveFSM (§4.4): idle detection → PING → ACK-or-timeout → GOAWAY +
//! close.
//!
//! Grounded directly on `proto/h2/ping.rs`'s `KeepAlive` struct: the same
//! "set the provisional state before the write, confirm in the write's
//! completion callback" shape as `KeepAlive::maybe_ping`, just generalized
//! from BDP-probing to liveness-probing.

use tracing::{debug, trace};

use crate::collaborators::Collaborators;
use crate::dispatch::Event;
use crate::error::{Error, Result};
use crate::outcome::Outcome;
use crate::ping::{self, KA_TIMEOUT_GO_AWAY_CONTENT};
use crate::state::Slot;
use crate::streams::ActiveStreams;
use crate::transport::{Frame, MAX_STREAM_ID};

/// `idleDetected` (§4.4 transition 1 and 4).
pub(crate) fn on_idle_detected(slot: &mut Slot, ctx: &Collaborators, streams: &ActiveStreams) -> Outcome {
    if !slot.is_idle() {
        // A probe is already in flight or has already failed; no-op.
        return Outcome::None;
    }
    if streams.is_zero() && !ctx.config.without_active_streams {
        return Outcome::None;
    }

    debug!("keep-alive: idleness detected, sending PING");
    // Provisional state set *before* the write so a synchronously-racing
    // ACK is never lost (§4.4 "Rationale").
    *slot = Slot::InFlight { timer: None };

    let payload = ping::keep_alive_ping_content();
    let fut = ctx
        .channel
        .write_and_flush(Frame::Ping { payload, ack: false });
    ctx.spawn_write(fut, Event::KeepAlivePingWriteCompleted);
    Outcome::None
}

/// `pingWriteCompleted(result)` for the keep-alive probe write.
pub(crate) fn on_ping_write_completed(slot: &mut Slot, ctx: &Collaborators, result: Result<()>) -> Outcome {
    match result {
        Err(err) => Outcome::Close(Some(err)),
        Ok(()) => {
            // Only install the timer if no ACK raced us while the write
            // was in flight — the slot would no longer be the provisional
            // `InFlight { timer: None }` otherwise.
            if matches!(slot, Slot::InFlight { timer: None }) {
                let timer = ctx.timer.sleep(ctx.config.ack_timeout);
                *slot = Slot::InFlight { timer: Some(timer) };
            }
            Outcome::None
        }
    }
}

/// `pingAckReceived(KEEP_ALIVE_PING_CONTENT)` (§4.4 transition 2). The
/// caller is responsible for classifying the payload first — this just
/// applies the transition once it's known to belong to this FSM.
pub(crate) fn on_ping_ack_received(slot: &mut Slot) -> Outcome {
    if matches!(slot, Slot::InFlight { .. }) {
        slot.cancel_timer();
        *slot = Slot::Idle;
        trace!("keep-alive: PING-ACK received");
    }
    Outcome::None
}

/// `ackTimeoutFired` (§4.4 transition 3).
pub(crate) fn on_ack_timeout_fired(slot: &mut Slot, ctx: &Collaborators) -> Outcome {
    if !matches!(slot, Slot::InFlight { .. }) {
        return Outcome::None;
    }
    debug!("keep-alive: PING-ACK timed out");
    *slot = Slot::TimedOut;

    let fut = ctx.channel.write_and_flush(Frame::GoAway {
        last_stream_id: MAX_STREAM_ID,
        error_code: h2::Reason::NO_ERROR,
        debug_data: KA_TIMEOUT_GO_AWAY_CONTENT,
    });
    ctx.spawn_write(fut, Event::KeepAliveTimeoutGoAwayWriteCompleted);
    Outcome::None
}

/// Completion of the timeout GOAWAY write: either way the connection is
/// done, with the timeout as primary cause and any write failure suppressed.
pub(crate) fn on_timeout_go_away_write_completed(result: Result<()>) -> Outcome {
    let write_failure = result.err();
    let cause = Error::new_keep_alive_timeout().with_suppressed(write_failure);
    Outcome::Close(Some(cause))
}

/// `channelClosed` (§4.4 transition 5).
pub(crate) fn on_channel_closed(slot: &mut Slot) {
    slot.cancel_timer();
    *slot = Slot::Closed;
}
