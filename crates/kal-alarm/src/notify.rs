//! Delivery of fired alarms.

use kal_time::DateValue;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use crate::event::EventId;

/// A fired alarm, handed to the [`Notifier`] after the scheduler has already
/// removed it from its registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredAlarm {
    /// The event that fired.
    pub event_id: EventId,
    /// Its display name.
    pub name: String,
    /// The occurrence the alarm was armed for.
    pub occurrence: DateValue,
    /// The trigger instant.
    pub trigger: DateValue,
    /// Next occurrence of a recurring event, if it was re-armed.
    pub rearmed_for: Option<DateValue>,
}

/// Receiver of fired alarms, e.g. the UI layer showing a notification.
///
/// Called from the scheduler task outside the registry lock; a slow
/// implementation delays later alarms but never blocks `arm` or `cancel`.
pub trait Notifier: Send + Sync + 'static {
    /// Deliver one fired alarm.
    fn notify(&self, alarm: FiredAlarm);
}

impl Notifier for UnboundedSender<FiredAlarm> {
    fn notify(&self, alarm: FiredAlarm) {
        if let Err(e) = self.send(alarm) {
            warn!(event = %e.0.event_id, "alarm receiver closed; notification dropped");
        }
    }
}
