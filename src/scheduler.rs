//! Cancellable recurring timer.
//!
//! A [`RefreshScheduler`] runs one action at a fixed period on a Tokio task.
//! Changing the period is always `stop()` followed by `start(period)`; the
//! scheduler state is guarded by a mutex so at most one timer is armed.
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use photo_cycler::RefreshScheduler;
//!
//! let scheduler = RefreshScheduler::new(|| tracing::info!("tick"));
//! scheduler.start(Duration::from_secs(5));
//! // ...
//! scheduler.stop();
//! ```

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{MAX_TIMER_PERIOD, MIN_TIMER_PERIOD};

type Action = Arc<dyn Fn() + Send + Sync>;

/// Observable scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No timer armed
    Stopped,
    /// A timer is armed and fires every `period`
    Running {
        /// Effective timer period
        period: Duration,
    },
}

struct Armed {
    period: Duration,
    cancel: CancellationToken,
}

/// Recurring timer driving a single action.
pub struct RefreshScheduler {
    action: Action,
    runtime: Handle,
    armed: Mutex<Option<Armed>>,
}

impl std::fmt::Debug for RefreshScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshScheduler")
            .field("state", &self.state())
            .finish()
    }
}

impl RefreshScheduler {
    /// Create a stopped scheduler that will run `action` on every tick.
    ///
    /// Timers are spawned on the runtime current at construction, so
    /// [`start`](Self::start) and [`stop`](Self::stop) may later be called
    /// from any thread.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new<F>(action: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::with_handle(Handle::current(), action)
    }

    /// Create a stopped scheduler whose timers run on `runtime`.
    pub fn with_handle<F>(runtime: Handle, action: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            action: Arc::new(action),
            runtime,
            armed: Mutex::new(None),
        }
    }

    /// Arm the timer at `period`, replacing any running timer.
    ///
    /// The first tick fires one full period after this call. The period is
    /// clamped to [`MIN_TIMER_PERIOD`]..=[`MAX_TIMER_PERIOD`].
    pub fn start(&self, period: Duration) {
        let mut armed = self.lock();
        Self::disarm(&mut armed);

        let period = period.clamp(MIN_TIMER_PERIOD, MAX_TIMER_PERIOD);
        let cancel = CancellationToken::new();
        self.runtime
            .spawn(run_timer(period, cancel.clone(), self.action.clone()));
        tracing::debug!(period_secs = period.as_secs_f64(), "refresh timer armed");

        *armed = Some(Armed { period, cancel });
    }

    /// Cancel the running timer. Does nothing if already stopped.
    pub fn stop(&self) {
        let mut armed = self.lock();
        Self::disarm(&mut armed);
    }

    /// Current state.
    pub fn state(&self) -> SchedulerState {
        match &*self.lock() {
            Some(armed) => SchedulerState::Running {
                period: armed.period,
            },
            None => SchedulerState::Stopped,
        }
    }

    /// Whether a timer is currently armed.
    pub fn is_running(&self) -> bool {
        matches!(self.state(), SchedulerState::Running { .. })
    }

    fn disarm(armed: &mut Option<Armed>) {
        if let Some(old) = armed.take() {
            old.cancel.cancel();
            tracing::debug!(
                period_secs = old.period.as_secs_f64(),
                "refresh timer cancelled"
            );
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Armed>> {
        // The guarded state stays consistent even if a holder panicked
        self.armed.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_timer(period: Duration, cancel: CancellationToken, action: Action) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => run_tick(&action).await,
        }
    }
}

/// Runs the action on the blocking pool and waits, so ticks never overlap.
async fn run_tick(action: &Action) {
    let action = action.clone();
    if let Err(e) = tokio::task::spawn_blocking(move || action()).await {
        tracing::warn!("refresh tick aborted: {}", e);
    }
}
