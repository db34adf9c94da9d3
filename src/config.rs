use std::time::Duration;

/// Tuning knobs for the keep-alive and graceful-close manager (§3
/// "Configuration").
#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub(crate) idle_duration: Option<Duration>,
    pub(crate) ack_timeout: Duration,
    pub(crate) without_active_streams: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            idle_duration: None,
            ack_timeout: Duration::from_secs(20),
            without_active_streams: false,
        }
    }
}

impl Config {
    /// Starts from the defaults: keep-alive disabled, a 20 second ACK
    /// timeout, and probes suppressed while there are no active streams.
    pub fn new() -> Self {
        Config::default()
    }

    /// Idleness threshold after which a keep-alive PING is emitted. Passing
    /// a non-positive duration disables keep-alive probing entirely.
    pub fn idle_duration(mut self, idle_duration: Duration) -> Self {
        self.idle_duration = if idle_duration.is_zero() {
            None
        } else {
            Some(idle_duration)
        };
        self
    }

    /// How long to wait for a PING-ACK. Shared by the keep-alive probe,
    /// the graceful-close probe, and the post-output-shutdown wait for the
    /// peer's reciprocal input shutdown (§5 "Timeouts").
    pub fn ack_timeout(mut self, ack_timeout: Duration) -> Self {
        self.ack_timeout = ack_timeout;
        self
    }

    /// If `true`, keep-alive PINGs are sent even while `active_streams` is
    /// zero. Defaults to `false`.
    pub fn keep_alive_while_idle(mut self, without_active_streams: bool) -> Self {
        self.without_active_streams = without_active_streams;
        self
    }

    pub(crate) fn keep_alive_enabled(&self) -> bool {
        self.idle_duration.is_some()
    }
}
