#![deny(missing_debug_implementations)]

//! # h2-keepalive
//!
//! A connection-agnostic core for keeping an HTTP/2 connection alive with
//! PING probes and tearing it down with the two-GOAWAY procedure from
//! [RFC 7540 §6.8](https://httpwg.org/specs/rfc7540.html#GOAWAY).
//!
//! This crate does not parse or encode HTTP/2 frames, multiplex streams,
//! terminate TLS, or drive an I/O event loop — it only decides *when* to
//! emit a PING or GOAWAY and *what* to do about the answer. Frame
//! parsing/encoding, stream multiplexing, the TLS engine, and the I/O event
//! loop itself are external collaborators, consumed through the traits in
//! [`mod@transport`].
//!
//! ## Usage
//!
//! Build a [`Config`], then call [`manager::spawn`] with your transport
//! [`Channel`](transport::Channel), a [`rt::Timer`], an [`rt::Executor`],
//! an [`transport::IdlenessDetector`], and optionally a
//! [`transport::TlsCloseNotify`]. That returns a [`manager::Handle`] (for
//! registering streams and initiating graceful close) and a
//! [`manager::Driver`] that must be polled to completion — typically by
//! spawning `driver.run()` onto your own runtime, the same way callers
//! drive a `hyper::client::conn::Connection`.
//!
//! ```ignore
//! let (handle, driver) = h2_keepalive::manager::spawn(
//!     channel, config, timer, executor, idleness, tls,
//! );
//! tokio::spawn(driver.run());
//! let guard = handle.register_stream();
//! ```

mod collaborators;
mod config;
mod dispatch;
mod error;
mod goaway;
mod halfclose;
mod keepalive;
#[cfg(test)]
mod mock;
mod outcome;
mod ping;
pub mod manager;
pub mod rt;
mod shutdown;
mod state;
mod streams;
pub mod transport;

pub use crate::config::Config;
pub use crate::dispatch::EventSink;
pub use crate::error::{Error, Result};
pub use crate::manager::{Handle, StreamGuard};
