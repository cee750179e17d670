//! Wall-clock aligned trigger for poll cycles.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::poll::PollCycle;

/// Cycles start at every full and half hour.
pub const POLL_PERIOD: Duration = Duration::from_secs(30 * 60);

/// Time left until the next multiple of `period` since the Unix epoch.
///
/// A `now` exactly on a boundary waits a full period.
pub fn delay_until_next_tick(now: DateTime<Utc>, period: Duration) -> Duration {
    let period_ms = (period.as_millis() as i64).max(1);
    let now_ms = now.timestamp_millis();
    let next_ms = (now_ms.div_euclid(period_ms) + 1) * period_ms;
    Duration::from_millis((next_ms - now_ms) as u64)
}

/// Lets at most one cycle run at a time.
#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    running: Arc<AtomicBool>,
}

/// Held while a cycle runs; releases the slot on drop.
#[derive(Debug)]
pub struct FlightGuard {
    running: Arc<AtomicBool>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the slot, or `None` if a cycle is already running.
    pub fn try_start(&self) -> Option<FlightGuard> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightGuard {
                running: self.running.clone(),
            })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Triggers a [`PollCycle`] on every tick, skipping ticks that land while
/// the previous cycle is still running.
pub struct Scheduler {
    cycle: Arc<PollCycle>,
    period: Duration,
    flight: SingleFlight,
}

impl Scheduler {
    pub fn new(cycle: Arc<PollCycle>) -> Self {
        Self::with_period(cycle, POLL_PERIOD)
    }

    pub fn with_period(cycle: Arc<PollCycle>, period: Duration) -> Self {
        Self {
            cycle,
            period,
            flight: SingleFlight::new(),
        }
    }

    /// Run forever.
    pub async fn run(&self) {
        info!(period_secs = self.period.as_secs(), "Starting vigilance scheduler");

        loop {
            let delay = delay_until_next_tick(Utc::now(), self.period);
            debug!(delay_secs = delay.as_secs(), "Waiting for next tick");
            tokio::time::sleep(delay).await;
            self.tick();
        }
    }

    /// Start one cycle in the background unless one is already running.
    pub fn tick(&self) -> Option<JoinHandle<()>> {
        let Some(guard) = self.flight.try_start() else {
            warn!("Previous poll cycle still running, skipping tick");
            return None;
        };

        let cycle = self.cycle.clone();
        Some(tokio::spawn(async move {
            let _guard = guard;
            match cycle.run().await {
                Ok(report) => debug!(?report, "Poll cycle finished"),
                Err(e) => error!("Poll cycle aborted: {}", e),
            }
        }))
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("period", &self.period)
            .field("running", &self.flight.is_running())
            .finish()
    }
}
