//! ShutdownSequencer (§4.8): `close0`'s tail — empty-flush drain, TLS
//! `close_notify`, output shutdown, bounded wait for the peer's reciprocal
//! input shutdown.
//!
//! `manager.rs` owns forcing both slots to `Closed` and the cause-present
//! short-circuit (§4.8 steps 1-2); this module is steps 3-4, the part that
//! actually touches the transport.

use std::io;
use std::pin::Pin;

use tracing::debug;

use crate::collaborators::Collaborators;
use crate::dispatch::Event;
use crate::error::{Error, Result};
use crate::outcome::Outcome;
use crate::rt::Sleep;
use crate::transport::BoxFuture;

/// Kicks off step 3: drain any writes still queued behind the last GOAWAY
/// with an empty flush, then (if TLS is active) `close_notify`, then shut
/// down output. Reported back as a single `OutputShutdownCompleted` event —
/// nothing in the FSMs reacts to intermediate progress within this chain,
/// only to its outcome or to a racing peer half-close (handled
/// independently by `halfclose.rs`).
pub(crate) fn start_drain(ctx: &Collaborators) {
    let channel = ctx.channel.clone();
    let tls = ctx.tls.clone();
    let fut: BoxFuture<io::Result<()>> = Box::pin(async move {
        // The empty flush is a correctness requirement (§4.8 "Rationale"):
        // the encoder may have buffered frames behind the second GOAWAY.
        channel.flush().await?;
        if let Some(tls) = tls {
            tls.close_outbound().await?;
        }
        channel.shutdown_output().await
    });
    ctx.spawn_write(fut, Event::OutputShutdownCompleted);
}

/// Step 4, first half: react to the drain chain completing.
pub(crate) fn on_output_shutdown_completed(
    ctx: &Collaborators,
    result: Result<()>,
) -> (Outcome, Option<Pin<Box<dyn Sleep>>>) {
    match result {
        Err(err) => (Outcome::Close(Some(err)), None),
        Ok(()) => {
            if ctx.channel.is_input_shutdown() {
                (Outcome::Close(None), None)
            } else {
                debug!("shutdown: output closed, awaiting peer input shutdown");
                let timer = ctx.timer.sleep(ctx.config.ack_timeout);
                (Outcome::None, Some(timer))
            }
        }
    }
}

/// Step 4, second half: the bounded wait for the peer's reciprocal input
/// shutdown expired without it arriving.
pub(crate) fn on_input_shutdown_timeout_fired() -> Outcome {
    debug!("shutdown: peer did not shut down input in time");
    Outcome::Close(Some(Error::new_input_shutdown_timeout()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::mock::{MockChannel, MockExecutor, MockTimer};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn collaborators() -> (Collaborators, Arc<MockChannel>) {
        let channel = Arc::new(MockChannel::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        let ctx = Collaborators {
            channel: channel.clone(),
            timer: Arc::new(MockTimer::new()),
            exec: Arc::new(MockExecutor),
            tls: None,
            config: Config::new(),
            raw_tx: tx,
        };
        (ctx, channel)
    }

    #[test]
    fn output_shutdown_success_with_input_already_down_closes_cleanly() {
        let (ctx, channel) = collaborators();
        channel.set_input_shutdown(true);
        let (outcome, timer) = on_output_shutdown_completed(&ctx, Ok(()));
        assert!(matches!(outcome, Outcome::Close(None)));
        assert!(timer.is_none());
    }

    #[test]
    fn output_shutdown_success_without_input_down_installs_timer() {
        let (ctx, _channel) = collaborators();
        let (outcome, timer) = on_output_shutdown_completed(&ctx, Ok(()));
        assert!(matches!(outcome, Outcome::None));
        assert!(timer.is_some());
    }

    #[test]
    fn output_shutdown_failure_closes_with_cause() {
        let (ctx, _channel) = collaborators();
        let err = Error::new_write(io::Error::new(io::ErrorKind::Other, "boom"));
        let (outcome, timer) = on_output_shutdown_completed(&ctx, Err(err));
        assert!(matches!(outcome, Outcome::Close(Some(_))));
        assert!(timer.is_none());
    }

    #[test]
    fn input_shutdown_timeout_produces_timeout_cause() {
        let outcome = on_input_shutdown_timeout_fired();
        match outcome {
            Outcome::Close(Some(err)) => assert!(err.is_timeout()),
            other => panic!("expected timeout close, got {:?}", other),
        }
    }
}
