//! PING payload demultiplexing (§3 "PING payload magic", §4.3).
//!
//! hyper's own `proto::h2::ping` module generates a fresh random nonce per
//! BDP probe because each BDP ping is independent and short-lived. Here the
//! two purposes (keep-alive, graceful-close) each get one payload chosen
//! once per process and reused for every probe they send, so a PING-ACK's
//! payload alone says which sub-protocol it answers to — no correlation
//! table needed.

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};
use std::sync::OnceLock;

/// Five-byte-or-so ASCII markers carried in GOAWAY.debug_data so operators
/// can tell which code path emitted a given frame from a hex trace alone
/// (§3 "GOAWAY debug payloads").
pub(crate) const LOCAL_GO_AWAY_CONTENT: &[u8] = b"0.local";
pub(crate) const REMOTE_GO_AWAY_CONTENT: &[u8] = b"1.remote";
pub(crate) const SECOND_GO_AWAY_CONTENT: &[u8] = b"2.second";
pub(crate) const GC_TIMEOUT_GO_AWAY_CONTENT: &[u8] = b"3.graceful-close-timeout";
pub(crate) const KA_TIMEOUT_GO_AWAY_CONTENT: &[u8] = b"4.keep-alive-timeout";

/// The keep-alive PING payload: random, low bit cleared (even).
pub(crate) fn keep_alive_ping_content() -> u64 {
    static CONTENT: OnceLock<u64> = OnceLock::new();
    *CONTENT.get_or_init(|| random_u64() & !1)
}

/// The graceful-close PING payload: random, low bit set (odd).
pub(crate) fn graceful_close_ping_content() -> u64 {
    static CONTENT: OnceLock<u64> = OnceLock::new();
    *CONTENT.get_or_init(|| random_u64() | 1)
}

/// Demultiplexes an incoming PING-ACK payload to the FSM it belongs to.
/// Unknown payloads (a stale ACK from before a process restart, or a peer
/// bug) are `Unknown` and ignored by the caller — logged, not propagated
/// (§8 "A PING-ACK with unknown payload is a no-op").
pub(crate) enum AckTarget {
    KeepAlive,
    GracefulClose,
    Unknown,
}

pub(crate) fn classify_ack(payload: u64) -> AckTarget {
    if payload == keep_alive_ping_content() {
        AckTarget::KeepAlive
    } else if payload == graceful_close_ping_content() {
        AckTarget::GracefulClose
    } else {
        AckTarget::Unknown
    }
}

// No external RNG crate is pulled in for an 8-byte nonce: `RandomState`'s
// SipHash keys are themselves seeded from the OS CSPRNG, so hashing
// anything through a fresh `RandomState` yields OS-derived randomness
// without adding a dependency the rest of the stack doesn't already need.
fn random_u64() -> u64 {
    RandomState::new().build_hasher().finish()
}
