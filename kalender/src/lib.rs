//! # kalender
//!
//! Calendar core for a desktop calendar application: date arithmetic,
//! holiday and observance dates, moon phases, reminders, and the
//! single-instance guard.
//!
//! This crate is a **façade** that re-exports the workspace crates.
//! Application code should depend on it rather than on the individual
//! `kal-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use kalender::time::{DateValue, HolidaySet, LawHoliday};
//!
//! let holidays = HolidaySet::resolve(2024, 0xFFFF, 0).unwrap();
//! let good_friday = holidays.date_of(LawHoliday::GoodFriday).unwrap();
//! assert_eq!(good_friday, DateValue::parse("29.3.2024").unwrap());
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Errors and settings.
pub use kal_core as core;

/// Dates, holidays, moon phases, and localized names.
pub use kal_time as time;

/// Reminder scheduler, countdown ticker, and single-instance guard.
pub use kal_alarm as alarm;

/// Tracing subscriber setup.
pub mod logging;

use kal_core::{Result, Settings};
use kal_time::{DateValue, HolidaySet, Weekday};

/// The holidays enabled in `settings`, resolved for `year`.
pub fn holidays(settings: &Settings, year: i32) -> Result<HolidaySet> {
    HolidaySet::resolve(year, settings.law_holidays, settings.special_days)
}

/// First column of a calendar week.
pub fn week_start(settings: &Settings) -> Weekday {
    if settings.week_starts_monday {
        Weekday::Monday
    } else {
        Weekday::Sunday
    }
}

/// `date` in the configured short form.
pub fn format_date(settings: &Settings, date: &DateValue) -> String {
    date.format(settings.pad_dates)
}
