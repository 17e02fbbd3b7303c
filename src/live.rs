//! Live session
//!
//! Wraps a [`Session`] for use on a tokio runtime. Every notification a
//! mutation raises gets its own timer task that removes exactly that
//! notification once its TTL is up. Shutting the session down aborts every
//! pending timer.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use rustc_hash::{FxHashMap, FxHashSet};
use tokio::{
    runtime::{Handle, TryCurrentError},
    task::AbortHandle,
    time::sleep,
};
use tracing::debug;

use crate::{
    notifications::{Notification, NotificationKey},
    session::Session,
};

type Timers = Arc<Mutex<FxHashMap<NotificationKey, AbortHandle>>>;

/// A [`Session`] with self-expiring notifications.
#[derive(Debug)]
pub struct LiveSession {
    session: Arc<Mutex<Session>>,
    timers: Timers,
    runtime: Handle,
    delay: Duration,
}

impl LiveSession {
    /// Take ownership of `session` on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`TryCurrentError`] when called outside a tokio runtime.
    pub fn new(session: Session) -> Result<Self, TryCurrentError> {
        let runtime = Handle::try_current()?;
        let delay = session.config().notification_delay();

        let live = Self {
            session: Arc::new(Mutex::new(session)),
            timers: Arc::new(Mutex::new(FxHashMap::default())),
            runtime,
            delay,
        };

        // Anything already queued gets a timer too.
        let existing: Vec<NotificationKey> = live.lock().notifications().keys().collect();
        for key in existing {
            live.schedule(key);
        }

        Ok(live)
    }

    /// Read from the session.
    pub fn read<R>(&self, f: impl FnOnce(&Session) -> R) -> R {
        f(&self.lock())
    }

    /// Mutate the session. Notifications raised by `f` get expiry timers;
    /// notifications `f` removed have theirs cancelled.
    pub fn update<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        let (result, added, removed) = {
            let mut session = self.lock();
            let before: FxHashSet<NotificationKey> = session.notifications().keys().collect();

            let result = f(&mut session);

            let after: FxHashSet<NotificationKey> = session.notifications().keys().collect();
            let added: Vec<NotificationKey> = after.difference(&before).copied().collect();
            let removed: Vec<NotificationKey> = before.difference(&after).copied().collect();

            (result, added, removed)
        };

        for key in removed {
            self.cancel(key);
        }

        for key in added {
            self.schedule(key);
        }

        result
    }

    /// Close a notification by hand, cancelling its timer.
    pub fn dismiss(&self, key: NotificationKey) -> Option<Notification> {
        self.update(|session| session.dismiss_notification(key))
    }

    /// Number of expiry timers still pending.
    pub fn pending_timers(&self) -> usize {
        lock(&self.timers).len()
    }

    /// Cancel every pending expiry timer. Notifications already showing stay
    /// until dismissed.
    pub fn shutdown(&self) {
        let timers: Vec<AbortHandle> = lock(&self.timers).drain().map(|(_, t)| t).collect();

        if !timers.is_empty() {
            debug!(count = timers.len(), "cancelling notification timers");
        }

        for timer in timers {
            timer.abort();
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        lock(&self.session)
    }

    fn schedule(&self, key: NotificationKey) {
        let session = Arc::clone(&self.session);
        let timers = Arc::clone(&self.timers);
        let delay = self.delay;

        // Hold the timer map while spawning so the task can't finish and
        // remove its entry before it has been inserted.
        let mut pending = lock(&self.timers);

        let task = self
            .runtime
            .spawn(async move {
                sleep(delay).await;

                let expired = lock(&session).dismiss_notification(key);

                if expired.is_some() {
                    debug!(?key, "notification expired");
                }

                lock(&timers).remove(&key);
            })
            .abort_handle();

        if let Some(previous) = pending.insert(key, task) {
            previous.abort();
        }
    }

    fn cancel(&self, key: NotificationKey) {
        if let Some(timer) = lock(&self.timers).remove(&key) {
            timer.abort();
        }
    }
}

impl Drop for LiveSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        catalog::MenuItemId,
        config::Flow,
        session::{
            SessionError,
            checkout::{AutoConfirm, Checkout},
            test_support::registered_student,
        },
    };

    use super::*;

    fn place(live: &LiveSession) -> Result<Checkout, SessionError> {
        live.update(|session| -> Result<Checkout, SessionError> {
            session.add_to_cart(MenuItemId(1))?;
            session.place_order(&AutoConfirm(true))
        })
    }

    fn showing(live: &LiveSession) -> usize {
        live.read(|session| session.notifications().len())
    }

    #[test]
    fn needs_a_runtime() -> TestResult {
        let session = registered_student(Flow::Kitchen)?;

        assert!(LiveSession::new(session).is_err());

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn notification_disappears_after_ttl() -> TestResult {
        let live = LiveSession::new(registered_student(Flow::Kitchen)?)?;

        place(&live)?;

        assert_eq!(showing(&live), 1);
        assert_eq!(live.pending_timers(), 1);

        sleep(Duration::from_secs(4)).await;
        assert_eq!(showing(&live), 1);

        sleep(Duration::from_millis(1_001)).await;
        assert_eq!(showing(&live), 0);
        assert_eq!(live.pending_timers(), 0);

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn each_notification_has_its_own_timer() -> TestResult {
        let live = LiveSession::new(registered_student(Flow::Kitchen)?)?;

        place(&live)?;
        sleep(Duration::from_secs(3)).await;
        place(&live)?;

        assert_eq!(showing(&live), 2);
        assert_eq!(live.pending_timers(), 2);

        sleep(Duration::from_millis(2_500)).await;
        assert_eq!(showing(&live), 1);

        sleep(Duration::from_secs(3)).await;
        assert_eq!(showing(&live), 0);

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn dismissing_cancels_the_timer() -> TestResult {
        let live = LiveSession::new(registered_student(Flow::Kitchen)?)?;

        let Checkout::Placed { notification, .. } = place(&live)? else {
            panic!("order not placed");
        };

        assert!(live.dismiss(notification).is_some());
        assert_eq!(live.pending_timers(), 0);
        assert!(live.dismiss(notification).is_none());

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_pending_timers() -> TestResult {
        let live = LiveSession::new(registered_student(Flow::Kitchen)?)?;

        place(&live)?;
        live.shutdown();

        assert_eq!(live.pending_timers(), 0);

        sleep(Duration::from_secs(10)).await;
        assert_eq!(showing(&live), 1);

        Ok(())
    }
}
