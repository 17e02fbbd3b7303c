//! Integration tests for notification expiry

use std::{fs, sync::Arc, time::Duration};

use jiff::{SignedDuration, Timestamp};
use testresult::TestResult;
use tokio::time::sleep;

use canteen::{
    catalog::{Catalog, MenuItemId},
    clock::{Clock, ManualClock},
    config::{Flow, SessionConfig},
    fixtures::Fixture,
    live::LiveSession,
    profile::Role,
    session::{
        Session, SessionError,
        checkout::{AutoConfirm, Checkout},
        kitchen::ReadyOutcome,
    },
};

/// A one-item menu written to a scratch fixture directory.
fn scratch_catalog() -> TestResult<Arc<Catalog>> {
    let dir = tempfile::tempdir()?;
    fs::create_dir(dir.path().join("menu"))?;
    fs::write(
        dir.path().join("menu").join("snack.yml"),
        "all_label: Все\nitems:\n  - id: 1\n    name: Пирожок\n    category: Выпечка\n    price: 45 RUB\n",
    )?;

    Ok(Arc::new(Fixture::with_base_path(dir.path()).load_catalog("snack")?))
}

fn config(ttl_seconds: u32) -> SessionConfig {
    SessionConfig {
        notification_ttl_seconds: ttl_seconds,
        ..SessionConfig::for_flow(Flow::Kitchen)
    }
}

fn register_and_order(session: &mut Session) -> Result<Checkout, SessionError> {
    session.select_role(Role::Student)?;
    session.set_registration_name("Анна")?;
    session.set_registration_group("ИТ-21")?;
    session.register()?;
    session.add_to_cart(MenuItemId(1))?;
    session.place_order(&AutoConfirm(true))
}

#[test]
fn notifications_expire_on_the_session_clock() -> TestResult {
    let clock = ManualClock::new(Timestamp::from_second(1_700_000_000)?);
    let mut session = Session::with_clock(scratch_catalog()?, config(10), clock.clone());

    let Checkout::Placed { notification, .. } = register_and_order(&mut session)? else {
        panic!("order not placed");
    };

    let Some(expires_at) = session
        .notifications()
        .get(notification)
        .map(|n| n.expires_at)
         else {
        panic!("notification missing");
    };

    assert_eq!(expires_at, clock.now().checked_add(SignedDuration::from_secs(10))?);

    clock.advance(SignedDuration::from_secs(9))?;
    assert!(session.expire_notifications().is_empty());

    clock.advance(SignedDuration::from_secs(1))?;
    assert_eq!(session.expire_notifications().as_slice(), [notification]);
    assert!(session.notifications().is_empty());

    // Expiring again is a no-op.
    assert!(session.expire_notifications().is_empty());

    Ok(())
}

#[test]
fn expiry_removes_only_what_is_due() -> TestResult {
    let clock = ManualClock::new(Timestamp::from_second(1_700_000_000)?);
    let mut session = Session::with_clock(scratch_catalog()?, config(5), clock.clone());

    register_and_order(&mut session)?;

    clock.advance(SignedDuration::from_secs(3))?;
    session.add_to_cart(MenuItemId(1))?;
    let Checkout::Placed { notification: later, .. } = session.place_order(&AutoConfirm(true))? else {
        panic!("second order not placed");
    };

    clock.advance(SignedDuration::from_secs(2))?;
    let expired = session.expire_notifications();

    assert_eq!(expired.len(), 1);
    assert!(!expired.contains(&later));
    assert!(session.notifications().contains(later));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn live_session_expires_each_notification_on_its_own() -> TestResult {
    let catalog = scratch_catalog()?;
    let live = LiveSession::new(Session::new(catalog, config(5)))?;

    let Checkout::Placed { order, .. } = live.update(register_and_order)? else {
        panic!("order not placed");
    };

    sleep(Duration::from_secs(2)).await;

    let outcome = live.update(|session| -> Result<ReadyOutcome, SessionError> {
        session.logout();
        session.select_role(Role::Cook)?;
        session.mark_order_ready(order)
    })?;

    assert!(matches!(outcome, ReadyOutcome::Marked { .. }));
    assert_eq!(live.read(|s| s.notifications().len()), 2);
    assert_eq!(live.pending_timers(), 2);

    sleep(Duration::from_millis(3_500)).await;
    assert_eq!(live.read(|s| s.notifications().len()), 1);

    sleep(Duration::from_secs(2)).await;
    assert_eq!(live.read(|s| s.notifications().len()), 0);
    assert_eq!(live.pending_timers(), 0);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn dropping_the_live_session_cancels_its_timers() -> TestResult {
    let live = LiveSession::new(Session::new(scratch_catalog()?, config(5)))?;
    live.update(register_and_order)?;

    assert_eq!(live.pending_timers(), 1);

    drop(live);

    // Nothing left to fire; advancing time must not panic or hang.
    sleep(Duration::from_secs(10)).await;

    Ok(())
}
