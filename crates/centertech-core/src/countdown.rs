//! Countdown to the next draw.
//!
//! [`Countdown`] is the pure computation: remaining time from "now" to a
//! target instant, split into days/hours/minutes/seconds. [`CountdownTicker`]
//! owns a background task that recomputes it on a fixed period and is
//! cancelled when the ticker is stopped or dropped.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Default recompute period.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

const MS_PER_SECOND: u64 = 1_000;
const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3_600;
const SECONDS_PER_DAY: u64 = 86_400;

/// Naive date-time layouts accepted besides RFC 3339, read as local time.
const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<F> Clock for F
where
    F: Fn() -> DateTime<Utc> + Send + Sync,
{
    fn now(&self) -> DateTime<Utc> {
        self()
    }
}

/// Decomposed remaining time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountdownSnapshot {
    pub remaining_ms: u64,
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub finished: bool,
}

impl CountdownSnapshot {
    pub const fn from_remaining_ms(remaining_ms: u64) -> Self {
        let total_seconds = remaining_ms / MS_PER_SECOND;
        Self {
            remaining_ms,
            days: total_seconds / SECONDS_PER_DAY,
            hours: (total_seconds % SECONDS_PER_DAY) / SECONDS_PER_HOUR,
            minutes: (total_seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE,
            seconds: total_seconds % SECONDS_PER_MINUTE,
            finished: remaining_ms == 0,
        }
    }
}

impl fmt::Display for CountdownSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}d {:02}h {:02}m {:02}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// A parsed countdown target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    target: DateTime<Utc>,
}

impl Countdown {
    pub const fn new(target: DateTime<Utc>) -> Self {
        Self { target }
    }

    /// Parse a target timestamp.
    ///
    /// Accepts RFC 3339 (`2026-12-24T20:00:00-03:00`), a date-time without
    /// offset (local time) or a bare date (midnight UTC).
    pub fn parse(input: &str) -> Result<Self> {
        let s = input.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self::new(dt.with_timezone(&Utc)));
        }
        for format in LOCAL_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, format)
                && let Some(local) = Local.from_local_datetime(&naive).earliest()
            {
                return Ok(Self::new(local.with_timezone(&Utc)));
            }
        }
        if let Some(midnight) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return Ok(Self::new(Utc.from_utc_datetime(&midnight)));
        }
        Err(Error::InvalidTarget(input.to_string()))
    }

    pub const fn target(&self) -> DateTime<Utc> {
        self.target
    }

    /// Remaining time at `now`, clamped at zero.
    pub fn at(&self, now: DateTime<Utc>) -> CountdownSnapshot {
        let remaining = (self.target - now).num_milliseconds().max(0);
        CountdownSnapshot::from_remaining_ms(u64::try_from(remaining).unwrap_or_default())
    }
}

/// Background recompute of a [`Countdown`].
///
/// The task runs until [`CountdownTicker::stop`] is called or the ticker is
/// dropped. Subscribers only see a new value when the snapshot changes.
pub struct CountdownTicker {
    snapshots: watch::Receiver<CountdownSnapshot>,
    targets: watch::Sender<Countdown>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl fmt::Debug for CountdownTicker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountdownTicker")
            .field("snapshot", &*self.snapshots.borrow())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl CountdownTicker {
    /// Start ticking with the wall clock and [`TICK_PERIOD`].
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_default(countdown: Countdown) -> Self {
        Self::start(countdown, Arc::new(SystemClock), TICK_PERIOD)
    }

    /// Start ticking. The first snapshot is computed immediately.
    pub fn start(countdown: Countdown, clock: Arc<dyn Clock>, period: Duration) -> Self {
        let (snapshot_tx, snapshots) = watch::channel(countdown.at(clock.now()));
        let (targets, target_rx) = watch::channel(countdown);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run_ticker(
            clock,
            period,
            target_rx,
            snapshot_tx,
            cancel.clone(),
        ));

        Self {
            snapshots,
            targets,
            cancel,
            task: Some(task),
        }
    }

    /// The latest snapshot.
    pub fn snapshot(&self) -> CountdownSnapshot {
        *self.snapshots.borrow()
    }

    /// An independent receiver of snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<CountdownSnapshot> {
        self.snapshots.clone()
    }

    /// Wait for the next snapshot change. `None` once the ticker has stopped.
    pub async fn changed(&mut self) -> Option<CountdownSnapshot> {
        self.snapshots.changed().await.ok()?;
        Some(*self.snapshots.borrow_and_update())
    }

    /// Point the countdown at a new target; recomputed right away.
    pub fn retarget(&self, countdown: Countdown) {
        self.targets.send_replace(countdown);
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Cancel the background task and wait for it to exit.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for CountdownTicker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_ticker(
    clock: Arc<dyn Clock>,
    period: Duration,
    mut targets: watch::Receiver<Countdown>,
    snapshots: watch::Sender<CountdownSnapshot>,
    cancel: CancellationToken,
) {
    let mut timer = tokio::time::interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately and the initial snapshot is
    // already published.
    timer.tick().await;

    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                debug!("Countdown ticker stopped");
                return;
            }
            changed = targets.changed() => {
                if changed.is_err() {
                    return;
                }
                timer.reset();
            }
            _ = timer.tick() => {}
        }

        let countdown = *targets.borrow_and_update();
        let next = countdown.at(clock.now());
        snapshots.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            if next.finished && !current.finished {
                info!(target_at = %countdown.target(), "Countdown finished");
            }
            *current = next;
            true
        });
    }
}
