//! Clock
//!
//! Business operations read the time through [`Clock`], never from a timer.
//! The once-a-second display refresh is a separate [`Ticker`] that only
//! publishes timestamps.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use jiff::{SignedDuration, Timestamp};
use mockall::automock;
use tokio::{
    runtime::{Handle, TryCurrentError},
    sync::watch,
    task::AbortHandle,
    time::{MissedTickBehavior, interval},
};

/// Source of the current time.
#[automock]
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to. Clones share the same time, so a
/// driver can keep one handle while the session owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    /// Start the clock at `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Move time forward (or back) by `by`, returning the new time.
    ///
    /// # Errors
    ///
    /// Returns a [`jiff::Error`] if the result is out of range. The clock is
    /// left unchanged.
    pub fn advance(&self, by: SignedDuration) -> Result<Timestamp, jiff::Error> {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now = now.checked_add(by)?;
        Ok(*now)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Periodic clock subscription for refreshing displayed time.
///
/// The background task is aborted when the ticker is dropped.
#[derive(Debug)]
pub struct Ticker {
    rx: watch::Receiver<Timestamp>,
    task: AbortHandle,
}

impl Ticker {
    /// Start publishing `clock.now()` every `period` on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`TryCurrentError`] when called outside a tokio runtime.
    pub fn spawn(period: Duration, clock: Arc<dyn Clock>) -> Result<Self, TryCurrentError> {
        let handle = Handle::try_current()?;
        let (tx, rx) = watch::channel(clock.now());

        let task = handle
            .spawn(async move {
                let mut ticks = interval(period);
                ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

                loop {
                    ticks.tick().await;

                    if tx.send(clock.now()).is_err() {
                        // Every subscriber is gone.
                        break;
                    }
                }
            })
            .abort_handle();

        Ok(Self { rx, task })
    }

    /// A receiver that sees every tick from now on.
    pub fn subscribe(&self) -> watch::Receiver<Timestamp> {
        self.rx.clone()
    }

    /// The most recently published time.
    pub fn latest(&self) -> Timestamp {
        *self.rx.borrow()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.task.abort();
    }
}
