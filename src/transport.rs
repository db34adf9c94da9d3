//! External collaborator interfaces (§6). Frame parsing/encoding, stream
//! multiplexing, the TLS engine, and the I/O event loop itself are all
//! deliberately out of scope (§1) — the manager only ever talks to them
//! through these traits, the same way `proto/h2/ping.rs` only ever talks
//! to an `h2::PingPong` and never touches a socket directly.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::time::Duration;

use crate::dispatch::EventSink;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// A PING or GOAWAY frame the manager wants written. Bit-exact shapes are
/// specified in §6 "Wire protocol"; encoding those into actual HTTP/2 bytes
/// is the transport's job, not the manager's.
#[derive(Debug, Clone)]
pub enum Frame {
    /// `payload` is one of the two magic constants from [`crate::ping`];
    /// `ack` mirrors the HTTP/2 PING ACK flag.
    Ping { payload: u64, ack: bool },
    /// `last_stream_id` is `2^31 - 1` for the first GOAWAY (fencing new
    /// streams) and the real highest-accepted stream id for the second.
    /// `error_code` is always `NO_ERROR` for GOAWAYs this component emits.
    GoAway {
        last_stream_id: u32,
        error_code: h2::Reason,
        debug_data: &'static [u8],
    },
}

/// The maximum HTTP/2 stream id, used as `last_stream_id` on the first,
/// fencing GOAWAY (§4.5 transition 1).
pub const MAX_STREAM_ID: u32 = (1u32 << 31) - 1;

/// The duplex transport channel the manager drives (§6 "Transport
/// Channel"). Implementations are expected to serialize writes themselves;
/// the manager never issues two writes concurrently without awaiting the
/// first.
pub trait Channel: Send + Sync {
    /// Write a frame without forcing a flush.
    fn write(&self, frame: Frame);

    /// Write a frame and flush, resolving once the flush completes.
    fn write_and_flush(&self, frame: Frame) -> BoxFuture<io::Result<()>>;

    /// Write an empty buffer and flush, draining anything still queued
    /// behind a prior write (§4.8 step 3).
    fn flush(&self) -> BoxFuture<io::Result<()>>;

    /// Immediately close the channel with no cause.
    fn close(&self);

    /// Immediately close the channel, attributing the closure to `cause`.
    fn close_with_cause(&self, cause: crate::Error);

    /// Whether this transport supports independent half-close of input and
    /// output (§4.7). Channels that don't treat any observed half-close as
    /// a full close.
    fn is_duplex(&self) -> bool;

    /// Whether TLS is in use on this connection (§4.8 step 3a).
    fn is_tls(&self) -> bool;

    /// Shut down the output direction only. Only called on duplex
    /// transports.
    fn shutdown_output(&self) -> BoxFuture<io::Result<()>>;

    fn is_input_shutdown(&self) -> bool;

    fn is_output_shutdown(&self) -> bool;

    /// The highest stream id the transport has accepted so far, used as
    /// `last_stream_id` on the second, non-fencing GOAWAY (§6 "Wire
    /// protocol"). Stream multiplexing itself is out of scope (§1), but the
    /// transport still has to hand the manager this one number — it's the
    /// only piece of stream-id bookkeeping the core needs.
    fn highest_accepted_stream_id(&self) -> u32;
}

/// The TLS engine's half of `close_notify` (RFC 5246 §7.2.1), consumed
/// only when [`Channel::is_tls`] is true.
pub trait TlsCloseNotify: Send + Sync {
    fn close_outbound(&self) -> BoxFuture<io::Result<()>>;
}

/// Installs a transport-level idle watchdog (§6 "IdlenessDetector"). Fires
/// `sink.idle_detected()` on the event-loop thread every time
/// `idle_threshold` elapses with no read **and** no write activity on the
/// channel — not just manager-initiated activity, any traffic at all.
pub trait IdlenessDetector: Send + Sync {
    fn watch(&self, idle_threshold: Duration, sink: EventSink);
}
