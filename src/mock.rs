//! In-memory fakes for the external collaborators of §6, used by unit tests
//! throughout the crate and by the integration tests under `tests/`.
//! Analogous to `tests/support/mock.rs` in the teacher, scaled down to this
//! crate's narrower collaborator surface.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};
use std::time::{Duration, Instant};

use crate::error::Error;
use crate::rt::{Executor, Sleep, Timer};
use crate::transport::{BoxFuture, Channel, Frame, TlsCloseNotify};

/// Records every frame written and every lifecycle call made against it, so
/// tests can assert on exactly what the FSMs emitted.
#[derive(Default)]
pub(crate) struct MockChannel {
    frames: Mutex<Vec<Frame>>,
    closed: Mutex<Option<Option<Error>>>,
    duplex: std::sync::atomic::AtomicBool,
    tls: std::sync::atomic::AtomicBool,
    input_shutdown: std::sync::atomic::AtomicBool,
    output_shutdown: std::sync::atomic::AtomicBool,
    highest_stream_id: std::sync::atomic::AtomicU32,
    fail_next_write: std::sync::atomic::AtomicBool,
}

impl MockChannel {
    pub(crate) fn new() -> Self {
        MockChannel::default()
    }

    pub(crate) fn duplex(self: Arc<Self>) -> Arc<Self> {
        self.duplex.store(true, std::sync::atomic::Ordering::SeqCst);
        self
    }

    pub(crate) fn tls(self: Arc<Self>) -> Arc<Self> {
        self.tls.store(true, std::sync::atomic::Ordering::SeqCst);
        self
    }

    pub(crate) fn set_input_shutdown(&self, value: bool) {
        self.input_shutdown
            .store(value, std::sync::atomic::Ordering::SeqCst);
    }

    pub(crate) fn set_highest_accepted_stream_id(&self, id: u32) {
        self.highest_stream_id
            .store(id, std::sync::atomic::Ordering::SeqCst);
    }

    pub(crate) fn fail_next_write(&self) {
        self.fail_next_write
            .store(true, std::sync::atomic::Ordering::SeqCst);
    }

    pub(crate) fn written_frames(&self) -> Vec<Frame> {
        self.frames.lock().unwrap().clone()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.lock().unwrap().is_some()
    }

    pub(crate) fn close_cause(&self) -> Option<Option<Error>> {
        self.closed.lock().unwrap().clone()
    }

    fn maybe_fail(&self) -> io::Result<()> {
        if self
            .fail_next_write
            .swap(false, std::sync::atomic::Ordering::SeqCst)
        {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "mock write failure"))
        } else {
            Ok(())
        }
    }
}

impl Channel for MockChannel {
    fn write(&self, frame: Frame) {
        self.frames.lock().unwrap().push(frame);
    }

    fn write_and_flush(&self, frame: Frame) -> BoxFuture<io::Result<()>> {
        self.frames.lock().unwrap().push(frame);
        let result = self.maybe_fail();
        Box::pin(async move { result })
    }

    fn flush(&self) -> BoxFuture<io::Result<()>> {
        let result = self.maybe_fail();
        Box::pin(async move { result })
    }

    fn close(&self) {
        *self.closed.lock().unwrap() = Some(None);
    }

    fn close_with_cause(&self, cause: Error) {
        *self.closed.lock().unwrap() = Some(Some(cause));
    }

    fn is_duplex(&self) -> bool {
        self.duplex.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn is_tls(&self) -> bool {
        self.tls.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn shutdown_output(&self) -> BoxFuture<io::Result<()>> {
        self.output_shutdown
            .store(true, std::sync::atomic::Ordering::SeqCst);
        Box::pin(async { Ok(()) })
    }

    fn is_input_shutdown(&self) -> bool {
        self.input_shutdown.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn is_output_shutdown(&self) -> bool {
        self.output_shutdown.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn highest_accepted_stream_id(&self) -> u32 {
        self.highest_stream_id.load(std::sync::atomic::Ordering::SeqCst)
    }
}

/// A [`Sleep`] that never resolves on its own; tests drive timeouts by
/// calling FSM transition functions directly rather than by waiting on the
/// mock timer.
struct PendingSleep;

impl Future for PendingSleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        Poll::Pending
    }
}

impl Sleep for PendingSleep {}

#[derive(Default)]
pub(crate) struct MockTimer;

impl MockTimer {
    pub(crate) fn new() -> Self {
        MockTimer
    }
}

impl Timer for MockTimer {
    fn sleep(&self, _duration: Duration) -> Pin<Box<dyn Sleep>> {
        Box::pin(PendingSleep)
    }

    fn sleep_until(&self, _deadline: Instant) -> Pin<Box<dyn Sleep>> {
        Box::pin(PendingSleep)
    }

    fn reset(&self, sleep: &mut Pin<Box<dyn Sleep>>, _new_deadline: Instant) {
        *sleep = Box::pin(PendingSleep);
    }
}

/// Runs a future to completion by hand, without a `tokio` runtime. Every
/// future `MockChannel` returns resolves on its very first poll, so a
/// single poll under a no-op waker is always enough.
pub(crate) struct MockExecutor;

impl<F> Executor<F> for MockExecutor
where
    F: Future<Output = ()> + 'static,
{
    fn execute(&self, fut: F) {
        let mut fut = Box::pin(fut);
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        match fut.as_mut().poll(&mut cx) {
            Poll::Ready(()) => {}
            Poll::Pending => panic!("MockExecutor only supports futures ready on first poll"),
        }
    }
}

fn noop_waker() -> Waker {
    fn clone(_: *const ()) -> RawWaker {
        raw_waker()
    }
    fn no_op(_: *const ()) {}
    fn raw_waker() -> RawWaker {
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }
    unsafe { Waker::from_raw(raw_waker()) }
}

/// A no-op TLS collaborator for tests that don't exercise the TLS branch of
/// the shutdown sequence.
pub(crate) struct MockTls;

impl TlsCloseNotify for MockTls {
    fn close_outbound(&self) -> BoxFuture<io::Result<()>> {
        Box::pin(async { Ok(()) })
    }
}
