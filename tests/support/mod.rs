//! Shared fakes for the scenario tests, analogous to the teacher's own
//! `tests/support/mock.rs`: in-memory stand-ins for the external
//! collaborators of `h2_keepalive::transport`, scaled to what this crate
//! actually needs from a transport.

pub mod mock;
