use std::io;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use h2_keepalive::transport::{BoxFuture, Channel, Frame, IdlenessDetector, TlsCloseNotify};
use h2_keepalive::{EventSink, Error};

/// Records every frame written and every lifecycle call made against it, so
/// a test can assert on exactly what the manager emitted.
#[derive(Default)]
pub struct MockChannel {
    frames: Mutex<Vec<Frame>>,
    closed: Mutex<Option<Option<Error>>>,
    duplex: AtomicBool,
    tls: AtomicBool,
    input_shutdown: AtomicBool,
    output_shutdown: AtomicBool,
    highest_stream_id: AtomicU32,
    fail_next_write: AtomicBool,
}

impl MockChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(MockChannel::default())
    }

    pub fn duplex(self: Arc<Self>) -> Arc<Self> {
        self.duplex.store(true, Ordering::SeqCst);
        self
    }

    pub fn tls(self: Arc<Self>) -> Arc<Self> {
        self.tls.store(true, Ordering::SeqCst);
        self
    }

    pub fn set_input_shutdown(&self, value: bool) {
        self.input_shutdown.store(value, Ordering::SeqCst);
    }

    pub fn set_highest_accepted_stream_id(&self, id: u32) {
        self.highest_stream_id.store(id, Ordering::SeqCst);
    }

    pub fn fail_next_write(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }

    pub fn written_frames(&self) -> Vec<Frame> {
        self.frames.lock().unwrap().clone()
    }

    pub fn ping_payloads(&self) -> Vec<(u64, bool)> {
        self.written_frames()
            .into_iter()
            .filter_map(|frame| match frame {
                Frame::Ping { payload, ack } => Some((payload, ack)),
                Frame::GoAway { .. } => None,
            })
            .collect()
    }

    pub fn go_away_frames(&self) -> Vec<Frame> {
        self.written_frames()
            .into_iter()
            .filter(|frame| matches!(frame, Frame::GoAway { .. }))
            .collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.lock().unwrap().is_some()
    }

    pub fn close_cause(&self) -> Option<Option<Error>> {
        self.closed.lock().unwrap().clone()
    }

    fn maybe_fail(&self) -> io::Result<()> {
        if self.fail_next_write.swap(false, Ordering::SeqCst) {
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
        self.duplex.load(Ordering::SeqCst)
    }

    fn is_tls(&self) -> bool {
        self.tls.load(Ordering::SeqCst)
    }

    fn shutdown_output(&self) -> BoxFuture<io::Result<()>> {
        self.output_shutdown.store(true, Ordering::SeqCst);
        Box::pin(async { Ok(()) })
    }

    fn is_input_shutdown(&self) -> bool {
        self.input_shutdown.load(Ordering::SeqCst)
    }

    fn is_output_shutdown(&self) -> bool {
        self.output_shutdown.load(Ordering::SeqCst)
    }

    fn highest_accepted_stream_id(&self) -> u32 {
        self.highest_stream_id.load(Ordering::SeqCst)
    }
}

/// A no-op TLS collaborator for scenarios that don't exercise `close_notify`.
pub struct MockTls;

impl TlsCloseNotify for MockTls {
    fn close_outbound(&self) -> BoxFuture<io::Result<()>> {
        Box::pin(async { Ok(()) })
    }
}

/// An idleness detector a test drives by hand instead of by real inactivity:
/// `watch` just spawns a task that re-fires `idle_detected` on a fixed
/// period, forever, the way a real detector would keep firing as long as
/// nothing resets it.
#[derive(Default)]
pub struct RepeatingIdlenessDetector;

impl IdlenessDetector for RepeatingIdlenessDetector {
    fn watch(&self, idle_threshold: Duration, sink: EventSink) {
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(idle_threshold).await;
                sink.idle_detected();
            }
        });
    }
}

/// An idleness detector that never fires, for scenarios that drive
/// `idle_detected` themselves via the handle's `EventSink`.
#[derive(Default)]
pub struct NeverIdlenessDetector;

impl IdlenessDetector for NeverIdlenessDetector {
    fn watch(&self, _idle_threshold: Duration, _sink: EventSink) {}
}
