//! GracefulCloseFSM (§4.5): GOAWAY₁ + PING → ACK (or timeout) → GOAWAY₂ →
//! await drain → flush → close.
//!
//! No teacher file implements this directly — `h2`'s own graceful-GOAWAY
//! dance is internal to that crate, not exposed as public API. Shaped after
//! `keepalive.rs`'s FSM (itself grounded on `proto/h2/ping.rs`): slot plus
//! collaborators in, `Outcome` out.

use tokio::sync::oneshot;
use tracing::{debug, trace};

use crate::collaborators::Collaborators;
use crate::dispatch::Event;
use crate::error::{Error, Result};
use crate::outcome::Outcome;
use crate::ping::{self, GC_TIMEOUT_GO_AWAY_CONTENT, LOCAL_GO_AWAY_CONTENT, REMOTE_GO_AWAY_CONTENT, SECOND_GO_AWAY_CONTENT};
use crate::state::Slot;
use crate::streams::ActiveStreams;
use crate::transport::{Frame, MAX_STREAM_ID};

/// `userInitiate(local)` (§4.5 transitions 1 and 7).
pub(crate) fn on_user_initiate(
    slot: &mut Slot,
    ctx: &Collaborators,
    local: bool,
    when_initiated: Option<oneshot::Sender<()>>,
) -> Outcome {
    if !slot.is_idle() {
        debug!("graceful close: re-entrant initiation ignored");
        return Outcome::None;
    }

    // Must run before any frame is written.
    if let Some(tx) = when_initiated {
        let _ = tx.send(());
    }

    debug!(local, "graceful close: initiating");
    *slot = Slot::Started;

    let debug_data = if local {
        LOCAL_GO_AWAY_CONTENT
    } else {
        REMOTE_GO_AWAY_CONTENT
    };
    ctx.channel.write(Frame::GoAway {
        last_stream_id: MAX_STREAM_ID,
        error_code: h2::Reason::NO_ERROR,
        debug_data,
    });

    let payload = ping::graceful_close_ping_content();
    let fut = ctx
        .channel
        .write_and_flush(Frame::Ping { payload, ack: false });
    ctx.spawn_write(fut, Event::GracefulFirstWriteCompleted);
    Outcome::None
}

/// `firstWriteCompleted(result)` (§4.5 transitions 2 and 3).
pub(crate) fn on_first_write_completed(slot: &mut Slot, ctx: &Collaborators, result: Result<()>) -> Outcome {
    match result {
        Err(err) => Outcome::Close(Some(err)),
        Ok(()) => {
            // If the ACK already raced us past `Started`, the timer would
            // just be cancelled again for nothing — skip installing it.
            if matches!(slot, Slot::Started) {
                let timer = ctx.timer.sleep(ctx.config.ack_timeout);
                *slot = Slot::InFlight { timer: Some(timer) };
            }
            Outcome::None
        }
    }
}

/// `pingAckReceived(GRACEFUL_CLOSE_PING_CONTENT)` (§4.5 transition 4).
pub(crate) fn on_ping_ack_received(
    slot: &mut Slot,
    pending_cause: &mut Option<Error>,
    ctx: &Collaborators,
) -> Outcome {
    if !matches!(slot, Slot::Started | Slot::InFlight { .. }) {
        return Outcome::None;
    }
    slot.cancel_timer();
    trace!("graceful close: PING-ACK received");
    write_second_go_away(slot, pending_cause, ctx, None, SECOND_GO_AWAY_CONTENT)
}

/// `ackTimeoutFired` (§4.5 transition 5).
pub(crate) fn on_ack_timeout_fired(
    slot: &mut Slot,
    pending_cause: &mut Option<Error>,
    ctx: &Collaborators,
) -> Outcome {
    if !matches!(slot, Slot::InFlight { .. }) {
        return Outcome::None;
    }
    debug!("graceful close: PING-ACK timed out");
    let cause = Error::new_graceful_close_timeout();
    write_second_go_away(slot, pending_cause, ctx, Some(cause), GC_TIMEOUT_GO_AWAY_CONTENT)
}

/// Write second GOAWAY (§4.5 transition 6), idempotent: a no-op once the
/// slot is already `SecondGoAwaySent`, since both the ACK path and the
/// timeout path can reach here and only one may win.
fn write_second_go_away(
    slot: &mut Slot,
    pending_cause: &mut Option<Error>,
    ctx: &Collaborators,
    cause: Option<Error>,
    debug_data: &'static [u8],
) -> Outcome {
    if matches!(slot, Slot::SecondGoAwaySent) {
        return Outcome::None;
    }
    *slot = Slot::SecondGoAwaySent;
    *pending_cause = cause;

    let last_stream_id = ctx.channel.highest_accepted_stream_id();
    let fut = ctx.channel.write_and_flush(Frame::GoAway {
        last_stream_id,
        error_code: h2::Reason::NO_ERROR,
        debug_data,
    });
    ctx.spawn_write(fut, Event::GracefulSecondWriteCompleted);
    Outcome::None
}

/// `secondGoAwayWriteCompleted(result)` (§4.5 transition 6 continued).
pub(crate) fn on_second_write_completed(
    pending_cause: &mut Option<Error>,
    streams: &ActiveStreams,
    result: Result<()>,
) -> Outcome {
    let cause = pending_cause.take();
    match result {
        Err(write_err) => Outcome::Close(Some(write_err.with_suppressed(cause))),
        Ok(()) => {
            if cause.is_some() || streams.is_zero() {
                Outcome::Close(cause)
            } else {
                // Stay in `SecondGoAwaySent`; the last stream to close will
                // drive the close procedure (§4.6).
                Outcome::None
            }
        }
    }
}

/// `streamCountReachedZero` (§4.6): only meaningful while waiting to drain.
pub(crate) fn on_stream_count_reached_zero(slot: &Slot) -> Outcome {
    if matches!(slot, Slot::SecondGoAwaySent) {
        Outcome::Close(None)
    } else {
        Outcome::None
    }
}

/// `channelClosed`.
pub(crate) fn on_channel_closed(slot: &mut Slot) {
    slot.cancel_timer();
    *slot = Slot::Closed;
}
