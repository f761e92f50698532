use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use super::sample::lifecycle_event;
use super::status::StatusBoard;
use crate::config::MonitorConfig;
use crate::services::events::{EventSink, Severity};

#[derive(Debug, Default)]
struct RunStateInner {
    stop_requested: AtomicBool,
    notify: Notify,
}

/// Process-wide stop flag.
/// Goes from false to true at most once and never back.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    inner: Arc<RunStateInner>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_stop_requested(&self) -> bool {
        self.inner.stop_requested.load(Ordering::SeqCst)
    }

    /// Returns `true` only for the call that actually flipped the flag
    pub fn request_stop(&self) -> bool {
        let first = !self.inner.stop_requested.swap(true, Ordering::SeqCst);
        if first {
            self.inner.notify.notify_waiters();
        }
        first
    }

    /// Resolves once stop has been requested
    pub async fn stopped(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register before checking the flag so a concurrent request is not lost
            notified.as_mut().enable();
            if self.is_stop_requested() {
                return;
            }
            notified.await;
        }
    }

    /// Sleep for `duration` unless stop is requested first.
    /// Returns `true` when the sleep was cut short by a stop request.
    pub async fn sleep(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = self.stopped() => true,
            _ = tokio::time::sleep(duration) => self.is_stop_requested(),
        }
    }
}

/// Stop requests still announcing themselves
#[derive(Debug, Default)]
struct InFlight {
    count: AtomicUsize,
    idle: Notify,
}

struct InFlightGuard<'a>(&'a InFlight);

impl<'a> InFlightGuard<'a> {
    fn enter(in_flight: &'a InFlight) -> Self {
        in_flight.count.fetch_add(1, Ordering::SeqCst);
        Self(in_flight)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.0.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

/// Turns termination requests into the single stop transition of a [`RunState`]
#[derive(Clone)]
pub struct ShutdownController {
    run_state: RunState,
    sink: Arc<dyn EventSink>,
    config: Arc<MonitorConfig>,
    status: Option<StatusBoard>,
    in_flight: Arc<InFlight>,
}

impl ShutdownController {
    pub fn new(run_state: RunState, sink: Arc<dyn EventSink>, config: Arc<MonitorConfig>) -> Self {
        Self {
            run_state,
            sink,
            config,
            status: None,
            in_flight: Arc::new(InFlight::default()),
        }
    }

    pub fn with_status(mut self, status: StatusBoard) -> Self {
        self.status = Some(status);
        self
    }

    pub fn run_state(&self) -> &RunState {
        &self.run_state
    }

    /// Request a cooperative stop. Only the first request emits an event;
    /// later ones are no-ops. Returns whether this call initiated the stop.
    pub async fn request_stop(&self) -> bool {
        // Entered before the flag flips, so whoever observes the stop can wait
        // for the announcement through `settled`
        let _guard = InFlightGuard::enter(&self.in_flight);
        if !self.run_state.request_stop() {
            return false;
        }

        if let Some(status) = &self.status {
            status.mark_stopping().await;
        }
        self.sink
            .emit(lifecycle_event(&self.config, Severity::Warning, "Trying to stop..."))
            .await;
        true
    }

    /// Resolves once no [`Self::request_stop`] call is still emitting
    pub async fn settled(&self) {
        loop {
            let idle = self.in_flight.idle.notified();
            tokio::pin!(idle);
            idle.as_mut().enable();
            if self.in_flight.count.load(Ordering::SeqCst) == 0 {
                return;
            }
            idle.await;
        }
    }

    /// Route SIGINT and SIGTERM (Ctrl+C elsewhere) to [`Self::request_stop`].
    /// Handlers are installed before this returns.
    pub fn listen_for_signals(&self) -> std::io::Result<JoinHandle<()>> {
        let controller = self.clone();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            let mut interrupt = signal(SignalKind::interrupt())?;
            let mut terminate = signal(SignalKind::terminate())?;

            Ok(tokio::spawn(async move {
                loop {
                    let name = tokio::select! {
                        Some(_) = interrupt.recv() => "SIGINT",
                        Some(_) = terminate.recv() => "SIGTERM",
                        else => break,
                    };
                    tracing::debug!("Received {}", name);
                    controller.request_stop().await;
                }
            }))
        }

        #[cfg(not(unix))]
        {
            Ok(tokio::spawn(async move {
                while tokio::signal::ctrl_c().await.is_ok() {
                    tracing::debug!("Received Ctrl+C");
                    controller.request_stop().await;
                }
            }))
        }
    }
}
