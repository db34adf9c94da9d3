//! HalfCloseCoordinator (§4.7): reacts to input/output half-close, deciding
//! force-close vs. tolerate-as-expected-mid-drain.
//!
//! Grounded in spec text; borrows the half-close/draining vocabulary from
//! `common/drain.rs` (the teacher's own half-close-during-shutdown module).

use std::pin::Pin;

use crate::collaborators::Collaborators;
use crate::error::Error;
use crate::outcome::Outcome;
use crate::rt::Sleep;
use crate::state::Slot;

/// Shared rule for both directions: non-duplex transports always fully
/// close on any half-close; duplex ones tolerate it only once the
/// graceful-close protocol has reached `SecondGoAwaySent`, or if the peer
/// had already shut down the other direction too.
fn half_close_observed(ctx: &Collaborators, graceful_close: &Slot, other_direction_already_shutdown: bool) -> Outcome {
    if !ctx.channel.is_duplex() {
        return Outcome::Close(None);
    }
    if other_direction_already_shutdown {
        return Outcome::Close(None);
    }
    if !matches!(graceful_close, Slot::SecondGoAwaySent) {
        return Outcome::Close(Some(Error::new_unexpected_half_close()));
    }
    Outcome::None
}

/// Output half-close observed (§4.7, direction 1).
pub(crate) fn on_output_half_close_observed(ctx: &Collaborators, graceful_close: &Slot) -> Outcome {
    let input_already_shutdown = ctx.channel.is_input_shutdown();
    half_close_observed(ctx, graceful_close, input_already_shutdown)
}

/// Input half-close observed (§4.7, direction 2). Also cancels the
/// input-shutdown timer installed by `shutdown::close0`, since the peer
/// just reciprocated.
pub(crate) fn on_input_half_close_observed(
    input_shutdown_timer: &mut Option<Pin<Box<dyn Sleep>>>,
    ctx: &Collaborators,
    graceful_close: &Slot,
) -> Outcome {
    *input_shutdown_timer = None;
    let output_already_shutdown = ctx.channel.is_output_shutdown();
    half_close_observed(ctx, graceful_close, output_already_shutdown)
}
