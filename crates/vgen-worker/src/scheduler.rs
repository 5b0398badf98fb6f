//! Daily scheduler loop.
//!
//! A single cooperative loop: check the clock, run the job when the daily
//! trigger fires, sleep for the poll interval. Runs never overlap and a
//! missed day is not made up.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, Local, NaiveDateTime, NaiveTime};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::runner::JobRunner;

/// Source of local wall-clock time and of sleeping.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current local date and time.
    fn now(&self) -> NaiveDateTime;

    /// Wait for the given duration.
    async fn sleep(&self, duration: Duration);
}

/// Real clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Fires once per calendar day at a fixed time of day.
#[derive(Debug, Clone)]
pub struct DailyTrigger {
    at: NaiveTime,
    next_fire: NaiveDateTime,
}

impl DailyTrigger {
    /// Create a trigger. If `now` is already past today's time, the first
    /// fire is tomorrow.
    pub fn new(at: NaiveTime, now: NaiveDateTime) -> Self {
        Self {
            at,
            next_fire: Self::next_after(at, now),
        }
    }

    /// First occurrence of `at` strictly after `now`.
    fn next_after(at: NaiveTime, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date().and_time(at);
        if now < today {
            today
        } else {
            (now.date() + Days::new(1)).and_time(at)
        }
    }

    pub fn next_fire(&self) -> NaiveDateTime {
        self.next_fire
    }

    /// Check the trigger at `now`. Returns true when the job should run.
    ///
    /// The job runs on the first poll at or after the scheduled time of the
    /// current day, however late that poll is. Earlier days whose fire was
    /// never polled (the loop was blocked or the machine slept) are skipped,
    /// never made up.
    pub fn poll(&mut self, now: NaiveDateTime) -> bool {
        if now < self.next_fire {
            return false;
        }

        let due = self.next_fire;
        self.next_fire = Self::next_after(self.at, now);

        if due.date() < now.date() {
            warn!("Missed scheduled run at {}, not making it up", due);
        }
        now >= now.date().and_time(self.at)
    }
}

/// Scheduler states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Waiting for the trigger
    Idle,
    /// Executing a job run
    Running,
    /// Shut down, terminal
    Stopped,
}

/// Runs the job once a day until shutdown is signalled.
pub struct Scheduler<C: Clock> {
    runner: JobRunner,
    clock: C,
    trigger: DailyTrigger,
    poll_interval: Duration,
    state: SchedulerState,
}

impl<C: Clock> Scheduler<C> {
    /// Create a scheduler firing daily at `at`.
    pub fn new(runner: JobRunner, clock: C, at: NaiveTime, poll_interval: Duration) -> Self {
        let trigger = DailyTrigger::new(at, clock.now());
        Self {
            runner,
            clock,
            trigger,
            poll_interval,
            state: SchedulerState::Idle,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn next_fire(&self) -> NaiveDateTime {
        self.trigger.next_fire()
    }

    /// Run until `shutdown` becomes true. Returns the number of job runs.
    ///
    /// Shutdown is observed between polls; a run in progress is allowed to
    /// finish.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> u32 {
        info!(
            "Scheduler started, next run at {} (poll interval: {:?})",
            self.next_fire(),
            self.poll_interval
        );

        let mut runs = 0u32;

        loop {
            if *shutdown.borrow() {
                break;
            }

            let now = self.clock.now();
            if self.trigger.poll(now) {
                self.state = SchedulerState::Running;
                let report = self.runner.run_for_date(now.date()).await;
                runs += 1;
                self.state = SchedulerState::Idle;

                info!(
                    success = report.is_success(),
                    "Scheduled run finished, next run at {}",
                    self.next_fire()
                );
            }

            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        warn!("Shutdown channel closed, stopping scheduler");
                        break;
                    }
                }
                _ = self.clock.sleep(self.poll_interval) => {}
            }
        }

        self.state = SchedulerState::Stopped;
        info!("Scheduler stopped after {} run(s)", runs);
        runs
    }
}
