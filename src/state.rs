//! The tagged-sum state slot shared by the keep-alive and graceful-close
//! FSMs (§3 "State slots", §9 "Dynamically-typed state slot").
//!
//! The source this was distilled from overloads a single field with four
//! unrelated runtime shapes (`null`, an enum constant, a timer handle,
//! another enum constant). Here it's one enum with explicit variants;
//! `KeepAliveFsm` only ever produces `Idle`, `InFlight`, and `Closed`,
//! while `GracefulCloseFsm` additionally uses `Started`, `SecondGoAwaySent`
//! and (on timeout) `TimedOut`.

use std::pin::Pin;

use crate::rt::Sleep;

pub(crate) enum Slot {
    /// No activity of this kind in progress.
    Idle,
    /// GOAWAY₁ + PING written; the ACK-timeout timer isn't installed yet
    /// (graceful-close only, a brief window between write submission and
    /// write completion).
    Started,
    /// A PING has been written; `timer` is `None` during the identical
    /// brief window for the keep-alive FSM, `Some` once the write settles.
    InFlight { timer: Option<Pin<Box<dyn Sleep>>> },
    /// The ACK did not arrive in time; terminal for this cycle.
    TimedOut,
    /// GOAWAY₂ has been written; waiting for streams to drain
    /// (graceful-close only).
    SecondGoAwaySent,
    /// The manager has terminated. No further transitions are legal.
    Closed,
}

impl Slot {
    /// If `self` is `InFlight` with an installed timer, drop it (cancelling
    /// it); any other variant is left untouched. Dropping a `tokio::time`
    /// sleep is itself the cancellation — there's nothing that can fail,
    /// but the source's "cancel if timer" helper tolerated cancellation
    /// errors, so this returns `()` unconditionally to keep call sites
    /// identical in shape.
    pub(crate) fn cancel_timer(&mut self) {
        if let Slot::InFlight { timer } = self {
            *timer = None;
        }
    }

    pub(crate) fn is_idle(&self) -> bool {
        matches!(self, Slot::Idle)
    }

    pub(crate) fn is_closed(&self) -> bool {
        matches!(self, Slot::Closed)
    }
}

impl std::fmt::Debug for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Slot::Idle => "Idle",
            Slot::Started => "Started",
            Slot::InFlight { timer: None } => "InFlight(provisional)",
            Slot::InFlight { timer: Some(_) } => "InFlight(timed)",
            Slot::TimedOut => "TimedOut",
            Slot::SecondGoAwaySent => "SecondGoAwaySent",
            Slot::Closed => "Closed",
        };
        f.write_str(name)
    }
}
