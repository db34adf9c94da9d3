//! The collaborators every FSM transition needs a handle to: the transport
//! channel, the timer, an executor for write-completion continuations, and
//! the tuning config. Bundled here so transition functions in
//! `keepalive.rs`/`goaway.rs` take one reference instead of four.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::Config;
use crate::dispatch::Event;
use crate::rt::{Executor, Timer};
use crate::transport::{BoxFuture, Channel, TlsCloseNotify};

pub(crate) struct Collaborators {
    pub(crate) channel: Arc<dyn Channel>,
    pub(crate) timer: Arc<dyn Timer + Send + Sync>,
    pub(crate) exec: Arc<dyn Executor<BoxFuture<()>> + Send + Sync>,
    pub(crate) tls: Option<Arc<dyn TlsCloseNotify>>,
    pub(crate) config: Config,
    pub(crate) raw_tx: mpsc::UnboundedSender<Event>,
}

impl Collaborators {
    /// Runs `fut` to completion on the executor, then feeds `to_event(result)`
    /// back into the manager's own event channel. This is how write
    /// completions and other async continuations re-enter the FSMs as
    /// ordinary events instead of nested callbacks (§9 "Write-completion
    /// callbacks").
    pub(crate) fn spawn_write<F>(
        &self,
        fut: BoxFuture<std::io::Result<()>>,
        to_event: F,
    ) where
        F: FnOnce(crate::error::Result<()>) -> Event + Send + 'static,
    {
        let raw_tx = self.raw_tx.clone();
        self.exec.execute(Box::pin(async move {
            let result = fut.await.map_err(crate::error::Error::new_write);
            let _ = raw_tx.send(to_event(result));
        }));
    }
}
