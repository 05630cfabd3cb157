//! Events, anchors and recurrence.
//!
//! An [`Event`] knows how to enumerate its occurrences.  The scheduler only
//! ever asks for the next occurrence whose trigger instant (occurrence minus
//! lead time) is not before "now".

use std::fmt;
use std::str::FromStr;

use kal_core::errors::{Error, Result};
use kal_time::date::{MAX_YEAR, MIN_YEAR};
use kal_time::{DateValue, Holiday, HolidaySet};

/// Upper bound on candidate occurrences inspected per lookup.
const MAX_SCAN: usize = 1024;

/// Caller-assigned identity of an event.  Arming the same id again replaces
/// the existing alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What an event's occurrences are measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Anchor {
    /// A base date, all-day or timed.
    Date(DateValue),
    /// A holiday, resolved afresh for every year.
    Holiday {
        /// The holiday.
        holiday: Holiday,
        /// Optional `(hour, minute)`; all day if absent.
        time: Option<(u8, u8)>,
    },
}

impl Anchor {
    /// Anchor on `holiday`, all day.
    pub fn holiday(holiday: impl Into<Holiday>) -> Self {
        Anchor::Holiday {
            holiday: holiday.into(),
            time: None,
        }
    }

    /// Anchor on `holiday` at `hour:minute`.
    pub fn holiday_at(holiday: impl Into<Holiday>, hour: u8, minute: u8) -> Self {
        Anchor::Holiday {
            holiday: holiday.into(),
            time: Some((hour, minute)),
        }
    }
}

/// Repetition pattern of a date-anchored event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Recurrence {
    /// A single occurrence.
    #[default]
    Once,
    /// Every day.
    Daily,
    /// Every seven days.
    Weekly,
    /// Same day of every month, clamped to the month's end.
    Monthly,
    /// Same weekday occurrence of every month (e.g. 2nd Tuesday, last Friday).
    MonthlyByWeekday,
    /// Same date every year; 29 February falls back to 28 February.
    Yearly,
}

impl Recurrence {
    /// Occurrence number `n` (0 = `base`).
    fn nth(self, base: DateValue, n: i64) -> Result<DateValue> {
        match self {
            Recurrence::Once => Ok(base),
            Recurrence::Daily => base.add_days(n),
            Recurrence::Weekly => base.add_days(7 * n),
            Recurrence::Monthly => base.add_months(n),
            Recurrence::Yearly => base.add_years(n),
            Recurrence::MonthlyByWeekday => {
                let month = base.add_months(n)?;
                let weekday = base.weekday();
                let day = match base.weekday_index() {
                    0 => DateValue::last_weekday(weekday, month.year(), month.month())?,
                    index => DateValue::nth_weekday(index, weekday, month.year(), month.month())?,
                };
                if base.has_time() {
                    day.with_time(base.hour(), base.minute())
                } else {
                    Ok(day)
                }
            }
        }
    }

    /// A step count whose occurrence is not after `target`.
    fn steps_before(self, base: &DateValue, target: &DateValue) -> i64 {
        let days = target.serial() - base.serial() - 1;
        let months = (target.year() - base.year()) as i64 * 12
            + target.month() as i64
            - base.month() as i64
            - 1;
        let estimate = match self {
            Recurrence::Once => 0,
            Recurrence::Daily => days,
            Recurrence::Weekly => days.div_euclid(7),
            Recurrence::Monthly | Recurrence::MonthlyByWeekday => months,
            Recurrence::Yearly => (target.year() - base.year() - 1) as i64,
        };
        estimate.max(0)
    }
}

impl FromStr for Recurrence {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "once" | "" => Ok(Recurrence::Once),
            "daily" => Ok(Recurrence::Daily),
            "weekly" => Ok(Recurrence::Weekly),
            "monthly" => Ok(Recurrence::Monthly),
            "monthly-weekday" | "monthly_by_weekday" => Ok(Recurrence::MonthlyByWeekday),
            "yearly" | "annually" => Ok(Recurrence::Yearly),
            _ => Err(Error::Config {
                key: "recurrence".into(),
                value: s.into(),
            }),
        }
    }
}

/// One occurrence of an event together with its trigger instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    /// When the event happens.
    pub occurrence: DateValue,
    /// When the alarm fires: `occurrence` minus the lead time.  Always timed.
    pub trigger: DateValue,
}

/// A calendar entry that can be armed as an alarm.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    id: EventId,
    name: String,
    anchor: Anchor,
    lead_time: u32,
    recurrence: Recurrence,
}

impl Event {
    /// A one-shot event without lead time.  Holiday anchors recur yearly.
    pub fn new(id: EventId, name: impl Into<String>, anchor: Anchor) -> Self {
        let recurrence = match anchor {
            Anchor::Date(_) => Recurrence::Once,
            Anchor::Holiday { .. } => Recurrence::Yearly,
        };
        Self {
            id,
            name: name.into(),
            anchor,
            lead_time: 0,
            recurrence,
        }
    }

    /// Fire `minutes` before each occurrence.
    pub fn with_lead_time(mut self, minutes: u32) -> Self {
        self.lead_time = minutes;
        self
    }

    /// Set the repetition pattern.  Ignored for holiday anchors.
    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        if matches!(self.anchor, Anchor::Date(_)) {
            self.recurrence = recurrence;
        }
        self
    }

    /// Set the repetition pattern from its textual form.
    ///
    /// # Errors
    /// `SchedulingFailure` naming this event if the text is not a known
    /// pattern.
    pub fn with_recurrence_str(self, recurrence: &str) -> Result<Self> {
        match recurrence.parse() {
            Ok(r) => Ok(self.with_recurrence(r)),
            Err(e) => Err(Error::into_scheduling(e, self.name)),
        }
    }

    /// The identity.
    pub fn id(&self) -> EventId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The anchor.
    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    /// Lead time in minutes.
    pub fn lead_time(&self) -> u32 {
        self.lead_time
    }

    /// The repetition pattern.
    pub fn recurrence(&self) -> Recurrence {
        self.recurrence
    }

    /// Return `true` if the alarm re-arms after firing.
    pub fn recurring(&self) -> bool {
        matches!(self.anchor, Anchor::Holiday { .. }) || self.recurrence != Recurrence::Once
    }

    /// Trigger instant of `occurrence`.
    pub fn trigger_for(&self, occurrence: DateValue) -> Result<DateValue> {
        occurrence.add_minutes(-i64::from(self.lead_time))
    }

    /// The occurrence to arm for at `now`.
    ///
    /// A one-shot event yields its base instant even if that lies in the
    /// past.  A recurring event yields the first occurrence whose trigger is
    /// not before `now` and, when `after` is given, that lies strictly after
    /// `after`.
    ///
    /// # Errors
    /// `InvalidDate` if the occurrence would leave the supported date range,
    /// `SchedulingFailure` if no occurrence qualifies.
    pub fn next_occurrence(&self, now: &DateValue, after: Option<&DateValue>) -> Result<Occurrence> {
        let found = match self.anchor {
            Anchor::Date(base) if !self.recurring() => {
                let fresh = after.map_or(true, |a| base > *a);
                fresh.then_some(Occurrence {
                    occurrence: base,
                    trigger: self.trigger_for(base)?,
                })
            }
            Anchor::Date(base) => self.scan_dated(base, now, after)?,
            Anchor::Holiday { holiday, time } => self.scan_holiday(holiday, time, now, after)?,
        };
        found.ok_or_else(|| Error::SchedulingFailure {
            event: self.name.clone(),
            reason: format!("no occurrence after {now}"),
        })
    }

    fn qualifies(&self, candidate: &Occurrence, now: &DateValue, after: Option<&DateValue>) -> bool {
        candidate.trigger >= *now && after.map_or(true, |a| candidate.occurrence > *a)
    }

    fn scan_dated(
        &self,
        base: DateValue,
        now: &DateValue,
        after: Option<&DateValue>,
    ) -> Result<Option<Occurrence>> {
        let target = now.add_minutes(i64::from(self.lead_time))?;
        let mut n = self.recurrence.steps_before(&base, &target);
        for _ in 0..MAX_SCAN {
            let occurrence = self.recurrence.nth(base, n)?;
            let candidate = Occurrence {
                occurrence,
                trigger: self.trigger_for(occurrence)?,
            };
            if self.qualifies(&candidate, now, after) {
                return Ok(Some(candidate));
            }
            n += 1;
        }
        Ok(None)
    }

    fn scan_holiday(
        &self,
        holiday: Holiday,
        time: Option<(u8, u8)>,
        now: &DateValue,
        after: Option<&DateValue>,
    ) -> Result<Option<Occurrence>> {
        let target = now.add_minutes(i64::from(self.lead_time))?;
        let first_year = (target.year() - 1).max(MIN_YEAR);
        for year in first_year..=MAX_YEAR {
            let mut occurrence = HolidaySet::resolve_one(holiday, year)?;
            if let Some((hour, minute)) = time {
                occurrence = occurrence.with_time(hour, minute)?;
            }
            let candidate = Occurrence {
                occurrence,
                trigger: self.trigger_for(occurrence)?,
            };
            if self.qualifies(&candidate, now, after) {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }
}
