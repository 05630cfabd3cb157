//! Minute-aligned relative-time labels.
//!
//! A [`Countdown`] republishes a label such as `in 1h 5min` on a watch
//! channel.  The first refresh happens on the next wall-clock minute
//! boundary, later ones every 60 seconds, so the label flips together with
//! the minute shown on the system clock.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDateTime, Timelike};
use kal_time::{DateValue, TextProvider};
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::debug;

use crate::clock::Clock;

const MINUTE: Duration = Duration::from_secs(60);

/// Relative label for a signed minute difference (positive = future).
///
/// The hour segment is omitted when zero; zero minutes is "now".
pub fn relative_label(minutes: i64, text: &dyn TextProvider) -> String {
    if minutes == 0 {
        return text.relative_now().to_owned();
    }
    let total = minutes.unsigned_abs();
    let (hours, rest) = (total / 60, total % 60);
    let span = if hours == 0 {
        format!("{rest}min")
    } else {
        format!("{hours}h {rest}min")
    };
    text.relative_phrase(minutes > 0, &span)
}

/// Label for `target` as seen at wall-clock `now`.
fn label_at(target: &DateValue, now: NaiveDateTime, text: &dyn TextProvider) -> String {
    match DateValue::from_naive(now) {
        Ok(now) => relative_label(target.min_diff(&now), text),
        Err(_) => String::new(),
    }
}

/// Time left until the next full minute of `now`.
fn until_next_minute(now: NaiveDateTime) -> Duration {
    let into_minute = Duration::new(
        u64::from(now.second()),
        now.nanosecond().min(999_999_999),
    );
    MINUTE.saturating_sub(into_minute)
}

/// A running countdown ticker.  Dropping it stops the ticker.
#[derive(Debug)]
pub struct Countdown {
    labels: watch::Receiver<String>,
    _stop: DropGuard,
}

impl Countdown {
    /// Publish the label for `target` now and on every minute boundary
    /// until dropped or until `token` is cancelled.
    pub fn spawn(
        target: DateValue,
        clock: Arc<dyn Clock>,
        text: Arc<dyn TextProvider>,
        token: CancellationToken,
    ) -> Self {
        let now = clock.now();
        let (tx, rx) = watch::channel(label_at(&target, now, &*text));
        let first = Instant::now() + until_next_minute(now);
        let stop = token.clone();
        tokio::spawn(async move {
            let mut ticks = interval_at(first, MINUTE);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    _ = ticks.tick() => {
                        let label = label_at(&target, clock.now(), &*text);
                        if tx.send(label).is_err() {
                            break;
                        }
                    }
                }
            }
            debug!(%target, "countdown stopped");
        });
        Self {
            labels: rx,
            _stop: token.drop_guard(),
        }
    }

    /// The most recently published label.
    pub fn label(&self) -> String {
        self.labels.borrow().clone()
    }

    /// Wait for the next refresh; `None` once the ticker has stopped.
    pub async fn changed(&mut self) -> Option<String> {
        self.labels.changed().await.ok()?;
        Some(self.labels.borrow_and_update().clone())
    }

    /// An extra receiver for the label stream.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.labels.clone()
    }
}
