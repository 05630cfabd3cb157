//! Integration tests for `ReminderScheduler` and the countdown ticker.
//!
//! The wall clock is a `ManualClock`; tokio's timer runs paused so sleeps
//! complete as soon as every task is idle.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};

use kal_alarm::{
    AlarmState, Anchor, Event, EventId, FiredAlarm, ManualClock, Recurrence, ReminderScheduler,
    SchedulerConfig,
};
use kal_core::Error;
use kal_time::{DateValue, German};

fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn at(y: i32, m: u8, d: u8, h: u8, mi: u8) -> DateValue {
    DateValue::from_ymd_hm(y, m, d, h, mi).unwrap()
}

fn wall(y: i32, m: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, mi, 0)
        .unwrap()
}

fn start() -> (
    ReminderScheduler,
    Arc<ManualClock>,
    mpsc::UnboundedReceiver<FiredAlarm>,
) {
    start_at(noon())
}

fn start_at(
    now: NaiveDateTime,
) -> (
    ReminderScheduler,
    Arc<ManualClock>,
    mpsc::UnboundedReceiver<FiredAlarm>,
) {
    let clock = Arc::new(ManualClock::new(now));
    let (tx, rx) = mpsc::unbounded_channel();
    let scheduler = ReminderScheduler::start(SchedulerConfig::default(), clock.clone(), tx);
    (scheduler, clock, rx)
}

async fn next_fired(rx: &mut mpsc::UnboundedReceiver<FiredAlarm>) -> FiredAlarm {
    timeout(Duration::from_secs(600), rx.recv())
        .await
        .expect("an alarm should fire")
        .expect("scheduler alive")
}

// ─── One-shot alarms ──────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn past_one_shot_fires_once_and_leaves_registry() {
    let (scheduler, _clock, mut rx) = start();
    let missed = at(2024, 5, 31, 9, 0);
    let trigger = scheduler
        .arm(Event::new(EventId(1), "missed", Anchor::Date(missed)))
        .unwrap();
    assert_eq!(trigger, missed);

    let fired = next_fired(&mut rx).await;
    assert_eq!(fired.event_id, EventId(1));
    assert_eq!(fired.occurrence, missed);
    assert_eq!(fired.rearmed_for, None);
    assert_eq!(scheduler.status(EventId(1)), AlarmState::Fired);
    assert!(scheduler.is_empty());
    assert!(!scheduler.cancel(EventId(1)));

    sleep(Duration::from_secs(3600)).await;
    assert!(rx.try_recv().is_err(), "fired twice");
    scheduler.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn future_alarm_fires_when_clock_reaches_trigger() {
    let (scheduler, clock, mut rx) = start();
    let event = Event::new(EventId(2), "meeting", Anchor::Date(at(2024, 6, 1, 12, 30)))
        .with_lead_time(15);
    assert_eq!(scheduler.arm(event).unwrap(), at(2024, 6, 1, 12, 15));
    assert_eq!(scheduler.status(EventId(2)), AlarmState::Armed);

    sleep(Duration::from_secs(120)).await;
    assert!(rx.try_recv().is_err(), "fired early");

    clock.advance_minutes(15);
    let fired = next_fired(&mut rx).await;
    assert_eq!(fired.trigger, at(2024, 6, 1, 12, 15));
    assert_eq!(fired.occurrence, at(2024, 6, 1, 12, 30));
    scheduler.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn cancelled_alarm_never_fires() {
    let (scheduler, clock, mut rx) = start();
    scheduler
        .arm(Event::new(EventId(3), "call", Anchor::Date(at(2024, 6, 1, 12, 30))))
        .unwrap();
    assert_eq!(scheduler.trigger_of(EventId(3)), Some(at(2024, 6, 1, 12, 30)));

    assert!(scheduler.cancel(EventId(3)));
    assert_eq!(scheduler.status(EventId(3)), AlarmState::Destroyed);
    assert_eq!(scheduler.trigger_of(EventId(3)), None);

    clock.advance_minutes(60);
    sleep(Duration::from_secs(180)).await;
    assert!(rx.try_recv().is_err());
    assert!(!scheduler.cancel(EventId(3)));
    scheduler.shutdown().await;
}

// ─── Recurring alarms ─────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn recurring_alarm_rearms_for_next_occurrence() {
    let (scheduler, clock, mut rx) = start();
    let event = Event::new(EventId(4), "pills", Anchor::Date(at(2024, 6, 1, 12, 0)))
        .with_recurrence(Recurrence::Daily);
    scheduler.arm(event).unwrap();

    let first = next_fired(&mut rx).await;
    assert_eq!(first.occurrence, at(2024, 6, 1, 12, 0));
    assert_eq!(first.rearmed_for, Some(at(2024, 6, 2, 12, 0)));
    assert_eq!(scheduler.status(EventId(4)), AlarmState::Armed);
    assert_eq!(scheduler.trigger_of(EventId(4)), Some(at(2024, 6, 2, 12, 0)));

    clock.advance_minutes(24 * 60);
    let second = next_fired(&mut rx).await;
    assert_eq!(second.occurrence, at(2024, 6, 2, 12, 0));
    assert_eq!(second.rearmed_for, Some(at(2024, 6, 3, 12, 0)));
    assert_eq!(scheduler.len(), 1);
    scheduler.shutdown().await;
}

// ─── Clock shifts ─────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn skipped_hour_fires_once_after_spring_forward() {
    // 31.3.2024: local clocks in Central Europe jump from 02:00 to 03:00.
    let (scheduler, clock, mut rx) = start_at(wall(2024, 3, 31, 1, 59));
    let trigger = scheduler
        .arm(Event::new(EventId(20), "skipped", Anchor::Date(at(2024, 3, 31, 2, 30))))
        .unwrap();
    assert_eq!(trigger, at(2024, 3, 31, 2, 30));

    sleep(Duration::from_secs(30)).await;
    assert!(rx.try_recv().is_err(), "fired early");

    clock.set(wall(2024, 3, 31, 3, 0));
    let fired = next_fired(&mut rx).await;
    assert_eq!(fired.event_id, EventId(20));
    assert_eq!(fired.occurrence, at(2024, 3, 31, 2, 30));

    sleep(Duration::from_secs(3600)).await;
    assert!(rx.try_recv().is_err(), "fired twice");
    assert_eq!(scheduler.status(EventId(20)), AlarmState::Fired);
    scheduler.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn repeated_hour_does_not_fire_daily_alarm_twice() {
    // 27.10.2024: local clocks fall back from 03:00 to 02:00.
    let (scheduler, clock, mut rx) = start_at(wall(2024, 10, 27, 2, 0));
    let event = Event::new(EventId(21), "night shift", Anchor::Date(at(2024, 10, 27, 2, 30)))
        .with_recurrence(Recurrence::Daily);
    scheduler.arm(event).unwrap();

    clock.set(wall(2024, 10, 27, 2, 30));
    let fired = next_fired(&mut rx).await;
    assert_eq!(fired.occurrence, at(2024, 10, 27, 2, 30));
    assert_eq!(fired.rearmed_for, Some(at(2024, 10, 28, 2, 30)));

    clock.set(wall(2024, 10, 27, 2, 59));
    sleep(Duration::from_secs(120)).await;
    // The repeated hour replays 02:00 to 02:59.
    clock.set(wall(2024, 10, 27, 2, 0));
    sleep(Duration::from_secs(120)).await;
    clock.set(wall(2024, 10, 27, 2, 30));
    sleep(Duration::from_secs(120)).await;
    clock.set(wall(2024, 10, 27, 2, 45));
    sleep(Duration::from_secs(120)).await;

    assert!(rx.try_recv().is_err(), "fired twice in the repeated hour");
    assert_eq!(scheduler.trigger_of(EventId(21)), Some(at(2024, 10, 28, 2, 30)));
    assert_eq!(scheduler.status(EventId(21)), AlarmState::Armed);
    scheduler.shutdown().await;
}

// ─── Registry operations ──────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn rearming_an_id_replaces_its_alarm() {
    let (scheduler, _clock, _rx) = start();
    scheduler
        .arm(Event::new(EventId(5), "lunch", Anchor::Date(at(2024, 6, 1, 13, 0))))
        .unwrap();
    scheduler
        .arm(Event::new(EventId(5), "late lunch", Anchor::Date(at(2024, 6, 1, 14, 0))))
        .unwrap();
    assert_eq!(scheduler.len(), 1);
    assert_eq!(scheduler.trigger_of(EventId(5)), Some(at(2024, 6, 1, 14, 0)));
    scheduler.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn failed_event_is_skipped_and_others_arm() {
    let (scheduler, _clock, _rx) = start();
    let ancient = Event::new(
        EventId(6),
        "ancient",
        Anchor::Date(DateValue::from_ymd(1, 1, 1).unwrap()),
    )
    .with_lead_time(1);
    let later = Event::new(EventId(7), "later", Anchor::Date(at(2024, 6, 2, 8, 0)));
    let sooner = Event::new(EventId(8), "sooner", Anchor::Date(at(2024, 6, 1, 18, 0)));

    let errors = scheduler.arm_all([ancient, later, sooner]);
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], Error::SchedulingFailure { event, .. } if event == "ancient"));
    assert_eq!(scheduler.status(EventId(6)), AlarmState::Idle);
    assert_eq!(scheduler.active_ids(), vec![EventId(8), EventId(7)]);
    scheduler.shutdown().await;
}

// ─── Countdown ────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn countdown_refreshes_on_minute_boundary() {
    let (scheduler, clock, _rx) = start();
    let mut countdown = scheduler.countdown(at(2024, 6, 1, 13, 5), Arc::new(German));
    assert_eq!(countdown.label(), "in 1h 5min");

    clock.advance_minutes(5);
    let label = timeout(Duration::from_secs(120), countdown.changed())
        .await
        .expect("tick within two minutes");
    assert_eq!(label.as_deref(), Some("in 1h 0min"));

    clock.advance_minutes(60);
    assert_eq!(countdown.changed().await.as_deref(), Some("JETZT"));

    clock.advance_minutes(3);
    assert_eq!(countdown.changed().await.as_deref(), Some("vor 3min"));
    scheduler.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn countdown_stops_with_scheduler() {
    let (scheduler, _clock, _rx) = start();
    let mut countdown = scheduler.countdown(at(2024, 6, 1, 12, 10), Arc::new(German));
    assert_eq!(countdown.label(), "in 10min");
    scheduler.shutdown().await;
    assert_eq!(countdown.changed().await, None);
}
