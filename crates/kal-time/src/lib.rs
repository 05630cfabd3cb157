//! # kal-time
//!
//! Calendar date values, Easter and holiday resolution, moon phases and
//! localized names.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// `DateValue`: a calendar date with optional minute-precision time.
pub mod date;

/// Easter Sunday computation.
pub mod easter;

/// Holiday identifiers, placement rules and bitmask selections.
pub mod holiday;

/// Per-year resolution of enabled holidays.
pub mod holiday_set;

/// `Month` of the year.
pub mod month;

/// Moon phase approximation.
pub mod moon;

/// Localized month, weekday and holiday names.
pub mod text;

/// `Weekday` and index conversions.
pub mod weekday;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use date::{days_in_month, is_leap_year, DateValue};
pub use easter::{easter_sunday, easter_sunday_date};
pub use holiday::{count_bits, Holiday, HolidayKind, LawHoliday, Rule, Selection, SpecialDay};
pub use holiday_set::{HolidayInstance, HolidaySet};
pub use month::Month;
pub use moon::MoonPhase;
pub use text::{English, German, NameStyle, TextProvider};
pub use weekday::{monday_to_sunday_first, sunday_to_monday_first, Weekday};
