//! Runtime components the manager needs from its host: a timer and an
//! executor for background continuations.
//!
//! The manager never calls `tokio::spawn` or `tokio::time::sleep` directly,
//! so it can be driven by any executor. A `tokio`-backed implementation of
//! both traits is provided behind the `runtime` feature.

mod timer;

pub use timer::{Sleep, Timer};

/// Runs futures to completion in the background.
///
/// Used for two things: awaiting a frame write without blocking the event
/// loop (so a racing PING-ACK can still be processed while the write is
/// in flight), and driving the bounded wait after output shutdown.
pub trait Executor<Fut> {
    /// Place the future onto the executor to be run.
    fn execute(&self, fut: Fut);
}

#[cfg(feature = "runtime")]
mod tokio_impl {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::{Duration, Instant};

    use pin_project_lite::pin_project;

    use super::{Executor, Sleep, Timer};

    /// A [`Timer`] and [`Executor`] backed by the `tokio` runtime.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct TokioTimer;

    impl Timer for TokioTimer {
        fn sleep(&self, duration: Duration) -> Pin<Box<dyn Sleep>> {
            Box::pin(TokioSleep {
                inner: tokio::time::sleep(duration),
            })
        }

        fn sleep_until(&self, deadline: Instant) -> Pin<Box<dyn Sleep>> {
            Box::pin(TokioSleep {
                inner: tokio::time::sleep_until(deadline.into()),
            })
        }

        fn reset(&self, sleep: &mut Pin<Box<dyn Sleep>>, new_deadline: Instant) {
            if let Some(sleep) = sleep.as_mut().downcast_mut_pin::<TokioSleep>() {
                sleep.reset(new_deadline);
            } else {
                *sleep = self.sleep_until(new_deadline);
            }
        }
    }

    pin_project! {
        struct TokioSleep {
            #[pin]
            inner: tokio::time::Sleep,
        }
    }

    impl Future for TokioSleep {
        type Output = ();

        fn poll(self: Pin<&mut Self>, cx: &mut std::task::Context<'_>) -> std::task::Poll<()> {
            self.project().inner.poll(cx)
        }
    }

    impl Sleep for TokioSleep {}

    impl TokioSleep {
        fn reset(self: Pin<&mut Self>, deadline: Instant) {
            self.project().inner.as_mut().reset(deadline.into());
        }
    }

    /// An [`Executor`] that spawns onto the current `tokio` runtime.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct TokioExecutor;

    impl<F> Executor<F> for TokioExecutor
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        fn execute(&self, fut: F) {
            tokio::spawn(fut);
        }
    }
}

#[cfg(feature = "runtime")]
pub use tokio_impl::{TokioExecutor, TokioTimer};
