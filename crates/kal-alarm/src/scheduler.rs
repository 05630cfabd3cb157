//! The reminder scheduler.
//!
//! A single tokio task drives every alarm.  Armed alarms live in a registry
//! (id → alarm) next to a min-heap of `(trigger, generation, id)`; re-arming
//! or cancelling an id bumps its generation, so stale heap entries are
//! skipped when they surface instead of being searched for.
//!
//! # Firing
//! Under the registry lock the driver removes every due alarm and, for
//! recurring events, inserts the successor.  Only after the lock is
//! released are the [`Notifier`] callbacks run.  A `cancel` racing with the
//! firing step therefore either removes the alarm before it fires or finds
//! nothing to remove; an alarm is never delivered twice.
//!
//! # Waiting
//! The driver sleeps until the earliest trigger, but never longer than
//! [`SchedulerConfig::recheck`], so wall-clock jumps (suspend, manual
//! adjustment, daylight-saving shifts) are picked up within one interval.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use kal_core::errors::{Error, Result};
use kal_core::settings::{Settings, DEFAULT_SCHEDULER_RECHECK};
use kal_time::{DateValue, TextProvider};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::countdown::Countdown;
use crate::event::{Event, EventId, Occurrence};
use crate::notify::{FiredAlarm, Notifier};

// ── Configuration ─────────────────────────────────────────────────────────────

/// Scheduler tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Longest single wait of the driver task.
    pub recheck: Duration,
}

impl SchedulerConfig {
    /// Take the recheck interval from `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            recheck: settings.scheduler_recheck,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            recheck: DEFAULT_SCHEDULER_RECHECK,
        }
    }
}

// ── Alarm state ───────────────────────────────────────────────────────────────

/// Lifecycle of the alarm belonging to one event id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlarmState {
    /// Never armed.
    Idle,
    /// Waiting for its trigger instant.
    Armed,
    /// A one-shot alarm that has been delivered.
    Fired,
    /// Cancelled, or a recurring alarm without a further occurrence.
    Destroyed,
}

#[derive(Debug)]
struct Alarm {
    event: Event,
    next: Occurrence,
    generation: u64,
}

/// Retired ids remembered for [`ReminderScheduler::status`]; beyond this the
/// oldest half is forgotten and reports `Idle` again.
const RETIRED_LIMIT: usize = 4096;

/// Heap entries tolerated beyond the live alarms before the heap is rebuilt.
const STALE_SLACK: usize = 64;

#[derive(Debug, Default)]
struct Registry {
    alarms: HashMap<EventId, Alarm>,
    queue: BinaryHeap<Reverse<(DateValue, u64, EventId)>>,
    retired: HashMap<EventId, (u64, AlarmState)>,
    generation: u64,
}

impl Registry {
    fn insert(&mut self, event: Event, next: Occurrence) {
        self.generation += 1;
        let id = event.id();
        self.queue
            .push(Reverse((next.trigger, self.generation, id)));
        self.alarms.insert(
            id,
            Alarm {
                event,
                next,
                generation: self.generation,
            },
        );
        self.retired.remove(&id);
        self.compact();
    }

    fn remove(&mut self, id: EventId, state: AlarmState) -> Option<Alarm> {
        let alarm = self.alarms.remove(&id)?;
        self.retire(id, state);
        self.compact();
        Some(alarm)
    }

    fn retire(&mut self, id: EventId, state: AlarmState) {
        self.generation += 1;
        self.retired.insert(id, (self.generation, state));
        if self.retired.len() > RETIRED_LIMIT {
            let mut stamps: Vec<u64> = self.retired.values().map(|&(stamp, _)| stamp).collect();
            let (_, &mut cutoff, _) = stamps.select_nth_unstable(RETIRED_LIMIT / 2);
            self.retired.retain(|_, &mut (stamp, _)| stamp >= cutoff);
        }
    }

    /// Rebuild the heap from the live alarms once stale entries dominate.
    fn compact(&mut self) {
        if self.queue.len() <= 2 * self.alarms.len() + STALE_SLACK {
            return;
        }
        self.queue = self
            .alarms
            .iter()
            .map(|(&id, a)| Reverse((a.next.trigger, a.generation, id)))
            .collect();
    }

    fn is_current(&self, id: EventId, generation: u64) -> bool {
        self.alarms
            .get(&id)
            .is_some_and(|a| a.generation == generation)
    }

    /// Drop stale heap entries and return the earliest live trigger.
    fn earliest(&mut self) -> Option<DateValue> {
        while let Some(&Reverse((trigger, generation, id))) = self.queue.peek() {
            if self.is_current(id, generation) {
                return Some(trigger);
            }
            self.queue.pop();
        }
        None
    }

    fn state(&self, id: EventId) -> AlarmState {
        if self.alarms.contains_key(&id) {
            AlarmState::Armed
        } else {
            self.retired
                .get(&id)
                .map_or(AlarmState::Idle, |&(_, state)| state)
        }
    }
}

// ── Scheduler ─────────────────────────────────────────────────────────────────

struct Inner {
    registry: Mutex<Registry>,
    changed: Notify,
    cancel: CancellationToken,
    clock: Arc<dyn Clock>,
    notifier: Box<dyn Notifier>,
    config: SchedulerConfig,
}

/// Arms events and fires their alarms at the right wall-clock minute.
///
/// Dropping the scheduler stops its driver task; [`shutdown`](Self::shutdown)
/// additionally waits for it to finish.
pub struct ReminderScheduler {
    inner: Arc<Inner>,
    driver: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for ReminderScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReminderScheduler")
            .field("armed", &self.len())
            .field("config", &self.inner.config)
            .finish()
    }
}

impl ReminderScheduler {
    /// Spawn the driver task on the current tokio runtime.
    pub fn start(
        config: SchedulerConfig,
        clock: Arc<dyn Clock>,
        notifier: impl Notifier,
    ) -> Self {
        let inner = Arc::new(Inner {
            registry: Mutex::new(Registry::default()),
            changed: Notify::new(),
            cancel: CancellationToken::new(),
            clock,
            notifier: Box::new(notifier),
            config,
        });
        let driver = tokio::spawn(drive(Arc::clone(&inner)));
        info!(recheck = ?config.recheck, "reminder scheduler started");
        Self {
            inner,
            driver: Some(driver),
        }
    }

    /// Arm (or re-arm) the alarm for `event` and return its trigger instant.
    ///
    /// Any alarm already armed for the same id is cancelled first, so this
    /// is also how an edited event is rescheduled.  A one-shot event whose
    /// trigger is already past fires on the driver's next pass.
    ///
    /// # Errors
    /// `SchedulingFailure` if no trigger instant can be computed.  The
    /// event is then left unarmed and every other alarm is unaffected.
    pub fn arm(&self, event: Event) -> Result<DateValue> {
        let computed = self
            .now()
            .and_then(|now| event.next_occurrence(&now, None));
        let mut registry = self.registry();
        registry.remove(event.id(), AlarmState::Destroyed);
        let next = match computed {
            Ok(next) => next,
            Err(e) => {
                drop(registry);
                let err = e.into_scheduling(event.name());
                warn!(event = %event.id(), error = %err, "alarm not armed");
                return Err(err);
            }
        };
        debug!(event = %event.id(), name = event.name(), trigger = %next.trigger, "alarm armed");
        registry.insert(event, next);
        drop(registry);
        self.inner.changed.notify_one();
        Ok(next.trigger)
    }

    /// Arm every event; failures are logged and returned, the rest are armed.
    pub fn arm_all(&self, events: impl IntoIterator<Item = Event>) -> Vec<Error> {
        events
            .into_iter()
            .filter_map(|event| self.arm(event).err())
            .collect()
    }

    /// Cancel the alarm for `id`.  Returns `false` if none was armed, for
    /// example because it has already fired.
    pub fn cancel(&self, id: EventId) -> bool {
        let removed = self.registry().remove(id, AlarmState::Destroyed).is_some();
        if removed {
            debug!(event = %id, "alarm cancelled");
        }
        removed
    }

    /// Current state of the alarm for `id`.
    pub fn status(&self, id: EventId) -> AlarmState {
        self.registry().state(id)
    }

    /// Trigger instant of the armed alarm for `id`.
    pub fn trigger_of(&self, id: EventId) -> Option<DateValue> {
        self.registry().alarms.get(&id).map(|a| a.next.trigger)
    }

    /// Ids of all armed alarms, earliest trigger first.
    pub fn active_ids(&self) -> Vec<EventId> {
        let registry = self.registry();
        let mut armed: Vec<_> = registry
            .alarms
            .values()
            .map(|a| (a.next.trigger, a.event.id()))
            .collect();
        armed.sort();
        armed.into_iter().map(|(_, id)| id).collect()
    }

    /// Number of armed alarms.
    pub fn len(&self) -> usize {
        self.registry().alarms.len()
    }

    /// Return `true` if no alarm is armed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start a countdown ticker for `target` on this scheduler's clock.
    ///
    /// The ticker also stops when the scheduler shuts down.
    pub fn countdown(&self, target: DateValue, text: Arc<dyn TextProvider>) -> Countdown {
        Countdown::spawn(
            target,
            Arc::clone(&self.inner.clock),
            text,
            self.inner.cancel.child_token(),
        )
    }

    /// Stop the driver task and wait for it to exit.
    pub async fn shutdown(mut self) {
        self.inner.cancel.cancel();
        if let Some(driver) = self.driver.take() {
            if let Err(e) = driver.await {
                warn!(error = %e, "scheduler task ended abnormally");
            }
        }
    }

    fn now(&self) -> Result<DateValue> {
        DateValue::from_naive(self.inner.clock.now())
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.inner.registry()
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        self.inner.cancel.cancel();
    }
}

impl Inner {
    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Remove every due alarm, re-arm recurring ones, and return the fired
    /// alarms together with the time to sleep.
    fn take_due(&self) -> (Vec<FiredAlarm>, Duration) {
        let now_naive = self.clock.now();
        let now = match DateValue::from_naive(now_naive) {
            Ok(now) => now,
            Err(e) => {
                warn!(error = %e, "wall clock outside the supported range");
                return (Vec::new(), self.config.recheck);
            }
        };

        let mut fired = Vec::new();
        let mut registry = self.registry();
        while let Some(trigger) = registry.earliest() {
            if trigger > now {
                break;
            }
            let Some(Reverse((_, _, id))) = registry.queue.pop() else {
                break;
            };
            let Some(alarm) = registry.remove(id, AlarmState::Fired) else {
                continue;
            };
            let rearmed_for = if alarm.event.recurring() {
                match alarm.event.next_occurrence(&now, Some(&alarm.next.occurrence)) {
                    Ok(next) => {
                        registry.insert(alarm.event.clone(), next);
                        Some(next.occurrence)
                    }
                    Err(e) => {
                        warn!(event = %id, error = %e, "recurring alarm not re-armed");
                        registry.retire(id, AlarmState::Destroyed);
                        None
                    }
                }
            } else {
                None
            };
            fired.push(FiredAlarm {
                event_id: id,
                name: alarm.event.name().to_owned(),
                occurrence: alarm.next.occurrence,
                trigger: alarm.next.trigger,
                rearmed_for,
            });
        }

        let wait = registry
            .earliest()
            .and_then(|trigger| (trigger.to_naive() - now_naive).to_std().ok())
            .map_or(self.config.recheck, |wait| wait.min(self.config.recheck));
        (fired, wait)
    }
}

async fn drive(inner: Arc<Inner>) {
    loop {
        let (fired, wait) = inner.take_due();
        for alarm in fired {
            info!(
                event = %alarm.event_id,
                name = %alarm.name,
                occurrence = %alarm.occurrence,
                rearmed_for = ?alarm.rearmed_for,
                "alarm fired"
            );
            inner.notifier.notify(alarm);
        }
        tokio::select! {
            _ = inner.cancel.cancelled() => break,
            _ = inner.changed.notified() => {}
            _ = tokio::time::sleep(wait) => {}
        }
    }
    debug!("reminder scheduler stopped");
}
