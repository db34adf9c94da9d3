//! What an FSM transition asks the orchestrator to do next. Keeping this
//! separate from the transition functions themselves is what makes
//! `keepalive.rs` and `goaway.rs` testable without a real `ShutdownSequencer`
//! — tests just assert on the returned `Outcome`.

use crate::error::Error;

#[derive(Debug)]
pub(crate) enum Outcome {
    /// Nothing further to do; the transition only updated local state
    /// and/or wrote a frame.
    None,
    /// Run the common close procedure (§4.8), with `cause` attached if the
    /// close was triggered by a failure (`None` means a clean close). The
    /// manager interprets this differently depending on whether it's
    /// already mid-drain (§4.8 step 3-4): the first time, it's the trigger
    /// that starts the procedure; afterwards, it's that procedure's own
    /// conclusion and is applied directly with no further flushing.
    Close(Option<Error>),
    /// The transport told us it is already closed (`channelClosed`); force
    /// local state to `Closed` without writing anything further.
    AlreadyClosed,
}
