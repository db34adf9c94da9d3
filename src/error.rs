//! Error and Result module.

use std::error::Error as StdError;
use std::fmt;
use std::io;

/// Result type returned from methods that can have manager `Error`s.
pub type Result<T> = std::result::Result<T, Error>;

type Cause = Box<dyn StdError + Send + Sync>;

/// Represents errors that can occur while keeping a connection alive or
/// closing it gracefully.
pub struct Error {
    inner: Box<ErrorImpl>,
}

struct ErrorImpl {
    kind: Kind,
    cause: Option<Cause>,
}

#[derive(Debug)]
pub(crate) enum Kind {
    /// A PING or GOAWAY frame write failed.
    Write,
    /// A PING-ACK did not arrive within `ack_timeout`.
    KeepAliveTimeout,
    /// The graceful-close PING-ACK did not arrive within `ack_timeout`.
    GracefulCloseTimeout,
    /// The peer half-closed its output before the graceful-close protocol
    /// reached `SecondGoAwaySent`.
    UnexpectedHalfClose,
    /// The peer did not reciprocate input-shutdown after our output
    /// shutdown within `ack_timeout`.
    InputShutdownTimeout,
    /// The manager was asked to act after the connection already closed.
    Closed,
}

// Sentinel type whose presence in the `source()` chain marks an error as
// having been caused by a timeout, mirroring hyper's `error::TimedOut`.
#[derive(Debug)]
pub(crate) struct TimedOut;

impl Error {
    pub(crate) fn new(kind: Kind) -> Error {
        Error {
            inner: Box::new(ErrorImpl { kind, cause: None }),
        }
    }

    pub(crate) fn with<C: Into<Cause>>(mut self, cause: C) -> Error {
        self.inner.cause = Some(cause.into());
        self
    }

    pub(crate) fn kind(&self) -> &Kind {
        &self.inner.kind
    }

    pub(crate) fn new_write(cause: io::Error) -> Error {
        Error::new(Kind::Write).with(cause)
    }

    pub(crate) fn new_keep_alive_timeout() -> Error {
        Error::new(Kind::KeepAliveTimeout).with(TimedOut)
    }

    pub(crate) fn new_graceful_close_timeout() -> Error {
        Error::new(Kind::GracefulCloseTimeout).with(TimedOut)
    }

    pub(crate) fn new_input_shutdown_timeout() -> Error {
        Error::new(Kind::InputShutdownTimeout).with(TimedOut)
    }

    pub(crate) fn new_unexpected_half_close() -> Error {
        Error::new(Kind::UnexpectedHalfClose).with(IllegalState(
            "input shutdown while graceful closure is in progress",
        ))
    }

    pub(crate) fn new_closed() -> Error {
        Error::new(Kind::Closed)
    }

    /// Attaches `suppressed` to `self` as an additional cause, used when a
    /// write failure happens while an ack-timeout was already the reason
    /// for closing: the write failure becomes the primary cause and the
    /// timeout is preserved as a suppressed one.
    pub(crate) fn with_suppressed(self, suppressed: Option<Error>) -> Error {
        match suppressed {
            None => self,
            Some(suppressed) => {
                let kind = self.inner.kind;
                let cause = self.inner.cause;
                let primary: Cause = match cause {
                    Some(cause) => Box::new(Suppressed {
                        primary: cause,
                        suppressed: Box::new(suppressed),
                    }),
                    None => Box::new(suppressed),
                };
                Error::new(kind).with(primary)
            }
        }
    }

    /// Returns true if this error was caused by a timeout (keep-alive,
    /// graceful-close, or input-shutdown ack wait).
    pub fn is_timeout(&self) -> bool {
        self.find_source::<TimedOut>().is_some()
    }

    /// Returns true if this error is the unexpected-half-close protocol
    /// violation described in §4.7.
    pub fn is_unexpected_half_close(&self) -> bool {
        matches!(self.inner.kind, Kind::UnexpectedHalfClose)
    }

    pub(crate) fn find_source<E: StdError + 'static>(&self) -> Option<&E> {
        let mut cause = self.source();
        while let Some(err) = cause {
            if let Some(typed) = err.downcast_ref() {
                return Some(typed);
            }
            cause = err.source();
        }
        None
    }

    fn description(&self) -> &str {
        match self.inner.kind {
            Kind::Write => "frame write failed",
            Kind::KeepAliveTimeout => "keep-alive PING-ACK timed out",
            Kind::GracefulCloseTimeout => "graceful-close PING-ACK timed out",
            Kind::UnexpectedHalfClose => "unexpected half-close during graceful closure",
            Kind::InputShutdownTimeout => "peer did not shut down input in time",
            Kind::Closed => "manager already closed",
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_tuple("h2_keepalive::Error");
        f.field(&self.inner.kind);
        if let Some(ref cause) = self.inner.cause {
            f.field(cause);
        }
        f.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref cause) = self.inner.cause {
            write!(f, "{}: {}", self.description(), cause)
        } else {
            f.write_str(self.description())
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .cause
            .as_ref()
            .map(|cause| &**cause as &(dyn StdError + 'static))
    }
}

impl fmt::Display for TimedOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("operation timed out")
    }
}

impl StdError for TimedOut {}

/// A synthesized protocol-violation cause (§7.3).
#[derive(Debug)]
pub(crate) struct IllegalState(pub(crate) &'static str);

impl fmt::Display for IllegalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "illegal state: {}", self.0)
    }
}

impl StdError for IllegalState {}

/// Pairs a primary cause with a suppressed one so both survive in the
/// `Display` output and the `source()` chain finds both.
#[derive(Debug)]
struct Suppressed {
    primary: Cause,
    suppressed: Cause,
}

impl fmt::Display for Suppressed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (suppressed: {})",
            self.primary, self.suppressed
        )
    }
}

impl StdError for Suppressed {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.suppressed)
    }
}

#[doc(hidden)]
trait AssertSendSync: Send + Sync + 'static {}
#[doc(hidden)]
impl AssertSendSync for Error {}
