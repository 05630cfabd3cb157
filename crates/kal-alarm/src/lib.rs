//! # kal-alarm
//!
//! Reminder scheduling on top of `kal-time`: events and their recurrence, a
//! single heap-driven scheduler task, the minute-aligned countdown ticker,
//! and the filesystem-polling single-instance guard.
//!
//! Everything here runs on tokio.  Constructors that spawn background work
//! ([`ReminderScheduler::start`], [`Countdown::spawn`],
//! [`SingleInstanceGuard::acquire`]) must be called from within a runtime.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Wall-clock source.
pub mod clock;

/// Minute-aligned relative-time labels.
pub mod countdown;

/// Events, anchors and recurrence.
pub mod event;

/// Single-instance guard over lock and wake markers.
pub mod guard;

/// Delivery of fired alarms.
pub mod notify;

/// The reminder scheduler.
pub mod scheduler;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use clock::{Clock, ManualClock, SystemClock};
pub use countdown::{relative_label, Countdown};
pub use event::{Anchor, Event, EventId, Occurrence, Recurrence};
pub use guard::{GuardConfig, SingleInstanceGuard, Startup, WindowHost};
pub use notify::{FiredAlarm, Notifier};
pub use scheduler::{AlarmState, ReminderScheduler, SchedulerConfig};
