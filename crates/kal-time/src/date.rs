//! `DateValue`: a normalized calendar instant.
//!
//! A `DateValue` is a proleptic Gregorian date with an optional time of day
//! at minute resolution.  Values without a time of day are "all day": every
//! computation treats them as midnight and never reads their hour or minute.
//!
//! # Serial number convention
//! * Day arithmetic runs on a serial day count, serial 0 = 1 January 1970.
//! * The valid range is 1 January 0001 to 31 December 9999.
//!
//! Calendar arithmetic (adding days or months, weekdays, month ends) is pure.
//! Only [`DateValue::day_diff`] and [`DateValue::min_diff`] consult a time
//! zone, because elapsed time between two wall-clock readings depends on the
//! clock shifts in between.

use std::str::FromStr;

use chrono::{Datelike, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use kal_core::ensure_date;
use kal_core::errors::{Error, Result};

use crate::month::Month;
use crate::text::TextProvider;
use crate::weekday::Weekday;

/// Smallest representable year.
pub const MIN_YEAR: i32 = 1;

/// Largest representable year.
pub const MAX_YEAR: i32 = 9999;

const MINUTES_PER_DAY: i64 = 1440;

/// A calendar date with an optional time of day.
///
/// Immutable: every operation returns a fresh value.  Ordering is
/// chronological, an all-day value sorting as midnight of its date (and
/// before a timed `00:00` on the same date).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct DateValue {
    year: i32,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    has_time: bool,
}

impl DateValue {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Create an all-day value from year, month (1–12), and day-of-month.
    pub fn from_ymd(year: i32, month: u8, day: u8) -> Result<Self> {
        ensure_date!(
            (MIN_YEAR..=MAX_YEAR).contains(&year),
            "year {year} out of range [{MIN_YEAR}, {MAX_YEAR}]"
        );
        ensure_date!((1..=12).contains(&month), "month {month} out of range [1, 12]");
        let days_in = days_in_month(year, month);
        ensure_date!(
            (1..=days_in).contains(&day),
            "day {day} out of range [1, {days_in}] for {year}-{month:02}"
        );
        Ok(Self {
            year,
            month,
            day,
            hour: 0,
            minute: 0,
            has_time: false,
        })
    }

    /// Create a value with a meaningful time of day.
    pub fn from_ymd_hm(year: i32, month: u8, day: u8, hour: u8, minute: u8) -> Result<Self> {
        Self::from_ymd(year, month, day)?.with_time(hour, minute)
    }

    /// Create an all-day value from a serial day number.
    pub fn from_serial(serial: i64) -> Result<Self> {
        let range = days_from_civil(MIN_YEAR, 1, 1)..=days_from_civil(MAX_YEAR, 12, 31);
        ensure_date!(
            range.contains(&serial),
            "serial {serial} outside the supported date range"
        );
        let (y, m, d) = civil_from_days(serial);
        Ok(Self::from_parts(y, m, d, 0, 0, false))
    }

    /// Parse `D.M.YYYY` or `DD.MM.YYYY`.
    ///
    /// Anything following a `-` in the year segment is discarded, so
    /// `"24.12.2024-1"` parses as Christmas Eve 2024.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let parts: Vec<&str> = trimmed.split('.').collect();
        ensure_date!(parts.len() == 3, "expected D.M.YYYY, got {s:?}");
        let year_part = match parts[2].split_once('-') {
            Some((year, _suffix)) => year,
            None => parts[2],
        };
        let day = parse_number(parts[0], "day", s)?;
        let month = parse_number(parts[1], "month", s)?;
        let year = parse_number(year_part, "year", s)?;
        let day = u8::try_from(day).map_err(|_| out_of_range("day", s))?;
        let month = u8::try_from(month).map_err(|_| out_of_range("month", s))?;
        let year = i32::try_from(year).map_err(|_| out_of_range("year", s))?;
        Self::from_ymd(year, month, day)
    }

    /// Parse a date (see [`parse`](Self::parse)) and a `H:MM` / `HH:MM`
    /// time of day.
    pub fn parse_with_time(date: &str, time: &str) -> Result<Self> {
        let (hour, minute) = time
            .trim()
            .split_once(':')
            .ok_or_else(|| Error::InvalidDate(format!("expected HH:MM, got {time:?}")))?;
        let hour = parse_number(hour, "hour", time)?;
        let minute = parse_number(minute, "minute", time)?;
        let hour = u8::try_from(hour).map_err(|_| out_of_range("hour", time))?;
        let minute = u8::try_from(minute).map_err(|_| out_of_range("minute", time))?;
        Self::parse(date)?.with_time(hour, minute)
    }

    /// Today's date on the local wall clock, all day.
    pub fn today() -> Self {
        Self::from_naive_date(Local::now().date_naive())
            .expect("the system clock reports a year within [1, 9999]")
    }

    /// The current local wall-clock minute.
    pub fn now() -> Self {
        Self::from_naive(Local::now().naive_local())
            .expect("the system clock reports a year within [1, 9999]")
    }

    /// Convert from a chrono date, all day.
    pub fn from_naive_date(date: NaiveDate) -> Result<Self> {
        Self::from_ymd(date.year(), date.month() as u8, date.day() as u8)
    }

    /// Convert from a chrono date-time; seconds are truncated.
    pub fn from_naive(dt: NaiveDateTime) -> Result<Self> {
        Self::from_ymd_hm(
            dt.year(),
            dt.month() as u8,
            dt.day() as u8,
            dt.hour() as u8,
            dt.minute() as u8,
        )
    }

    fn from_parts(year: i32, month: u8, day: u8, hour: u8, minute: u8, has_time: bool) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            has_time,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    /// Return the year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Return the month number (1–12).
    pub fn month(&self) -> u8 {
        self.month
    }

    /// Return the month as an enum.
    pub fn month_of_year(&self) -> Month {
        Month::from_number(self.month).expect("month is validated on construction")
    }

    /// Return the day of the month (1–31).
    pub fn day(&self) -> u8 {
        self.day
    }

    /// Return the hour (0 for all-day values).
    pub fn hour(&self) -> u8 {
        self.hour
    }

    /// Return the minute (0 for all-day values).
    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Return `true` if the time of day is meaningful.
    pub fn has_time(&self) -> bool {
        self.has_time
    }

    /// Return the serial day number (days since 1 January 1970).
    pub fn serial(&self) -> i64 {
        days_from_civil(self.year, self.month, self.day)
    }

    /// Minutes since midnight; 0 for all-day values.
    pub fn minute_of_day(&self) -> i64 {
        self.hour as i64 * 60 + self.minute as i64
    }

    /// Return the day of the year (1–366).
    pub fn day_of_year(&self) -> u16 {
        (self.serial() - days_from_civil(self.year, 1, 1) + 1) as u16
    }

    /// Return the weekday.
    pub fn weekday(&self) -> Weekday {
        // Serial 0 (1970-01-01) is a Thursday.
        let w = ((self.serial() + 3).rem_euclid(7) + 1) as u8;
        Weekday::from_ordinal(w).expect("rem_euclid always in 1..=7")
    }

    /// Convert to a chrono date-time (midnight for all-day values).
    pub fn to_naive(&self) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(self.year, self.month as u32, self.day as u32)
            .and_then(|d| d.and_hms_opt(self.hour as u32, self.minute as u32, 0))
            .expect("DateValue is always a valid calendar instant")
    }

    // ── Derived values ────────────────────────────────────────────────────────

    /// The same date with a time of day attached.
    pub fn with_time(self, hour: u8, minute: u8) -> Result<Self> {
        ensure_date!(hour < 24, "hour {hour} out of range [0, 23]");
        ensure_date!(minute < 60, "minute {minute} out of range [0, 59]");
        Ok(Self::from_parts(self.year, self.month, self.day, hour, minute, true))
    }

    /// The same date, all day.
    pub fn without_time(self) -> Self {
        Self::from_parts(self.year, self.month, self.day, 0, 0, false)
    }

    // ── Arithmetic ────────────────────────────────────────────────────────────

    /// Advance by `n` days, keeping the time of day.
    pub fn add_days(self, n: i64) -> Result<Self> {
        let serial = self
            .serial()
            .checked_add(n)
            .ok_or_else(|| overflow("add_days", n))?;
        let moved = Self::from_serial(serial)?;
        Ok(Self { hour: self.hour, minute: self.minute, has_time: self.has_time, ..moved })
    }

    /// Advance by `n` months, clamping the day to the target month's end.
    pub fn add_months(self, n: i64) -> Result<Self> {
        let total = (self.year as i64 * 12 + (self.month as i64 - 1))
            .checked_add(n)
            .ok_or_else(|| overflow("add_months", n))?;
        let year = total.div_euclid(12);
        let month = (total.rem_euclid(12) + 1) as u8;
        ensure_date!(
            (MIN_YEAR as i64..=MAX_YEAR as i64).contains(&year),
            "year {year} out of range [{MIN_YEAR}, {MAX_YEAR}]"
        );
        let year = year as i32;
        let day = self.day.min(days_in_month(year, month));
        Ok(Self { year, month, day, ..self })
    }

    /// Advance by `n` years; 29 February becomes 28 February in common years.
    pub fn add_years(self, n: i64) -> Result<Self> {
        let months = n.checked_mul(12).ok_or_else(|| overflow("add_years", n))?;
        self.add_months(months)
    }

    /// Advance by `n` minutes.
    ///
    /// The result always carries a time of day; an all-day value counts from
    /// midnight.
    pub fn add_minutes(self, n: i64) -> Result<Self> {
        let total = (self.serial() * MINUTES_PER_DAY + self.minute_of_day())
            .checked_add(n)
            .ok_or_else(|| overflow("add_minutes", n))?;
        let date = Self::from_serial(total.div_euclid(MINUTES_PER_DAY))?;
        let minute_of_day = total.rem_euclid(MINUTES_PER_DAY);
        date.with_time((minute_of_day / 60) as u8, (minute_of_day % 60) as u8)
    }

    /// Whole days between the calendar dates of `self` and `other`, measured
    /// on the local wall clock.  Positive if `other` is earlier.
    ///
    /// The time of day of both operands is ignored.
    pub fn day_diff(&self, other: &DateValue) -> i64 {
        self.day_diff_in(other, &Local)
    }

    /// [`day_diff`](Self::day_diff) in an explicit time zone.
    ///
    /// The elapsed hours between the two local midnights are divided by 24.
    /// A daylight-saving shift in between leaves a residual of ±23 hours
    /// (one hour short of a full day), which is folded back into the count.
    pub fn day_diff_in<Tz: TimeZone>(&self, other: &DateValue, tz: &Tz) -> i64 {
        let seconds = local_timestamp(self.without_time().to_naive(), tz)
            - local_timestamp(other.without_time().to_naive(), tz);
        cancel_dst_residual(seconds / 3600)
    }

    /// Whole minutes elapsed between `other` and `self` on the local wall
    /// clock.  Positive if `other` is earlier; all-day operands count as
    /// midnight.
    pub fn min_diff(&self, other: &DateValue) -> i64 {
        self.min_diff_in(other, &Local)
    }

    /// [`min_diff`](Self::min_diff) in an explicit time zone.
    pub fn min_diff_in<Tz: TimeZone>(&self, other: &DateValue, tz: &Tz) -> i64 {
        (local_timestamp(self.to_naive(), tz) - local_timestamp(other.to_naive(), tz)) / 60
    }

    /// Return `true` if both values fall on the same calendar date.
    pub fn same_date(&self, other: &DateValue) -> bool {
        (self.year, self.month, self.day) == (other.year, other.month, other.day)
    }

    /// Return `true` if both values have the same hour and minute.
    pub fn same_time(&self, other: &DateValue) -> bool {
        (self.hour, self.minute) == (other.hour, other.minute)
    }

    // ── Month structure ───────────────────────────────────────────────────────

    /// Ordinal occurrence of this weekday within its month (2nd Tuesday ⇒ 2),
    /// or 0 if it is the last such weekday of the month.
    pub fn weekday_index(&self) -> u8 {
        if self.day + 7 > days_in_month(self.year, self.month) {
            0
        } else {
            (self.day - 1) / 7 + 1
        }
    }

    /// Days left until the last day of the month (0 on the last day).
    pub fn days_to_end_of_month(&self) -> u8 {
        days_in_month(self.year, self.month) - self.day
    }

    /// Return `true` if this is the last calendar day of its month.
    pub fn is_end_of_month(&self) -> bool {
        self.days_to_end_of_month() == 0
    }

    /// Return the *n*-th occurrence of `weekday` in `year`/`month`, all day.
    ///
    /// # Errors
    /// `n` outside `1..=5`, or larger than the number of such weekdays in
    /// the month.
    pub fn nth_weekday(n: u8, weekday: Weekday, year: i32, month: u8) -> Result<Self> {
        ensure_date!((1..=5).contains(&n), "nth_weekday: n {n} out of range [1, 5]");
        let first = Self::from_ymd(year, month, 1)?;
        let skip = (weekday.ordinal() + 7 - first.weekday().ordinal()) % 7;
        let day = 1 + skip + 7 * (n - 1);
        ensure_date!(
            day <= days_in_month(year, month),
            "nth_weekday: {n}-th {weekday:?} does not exist in {year}-{month:02}"
        );
        Self::from_ymd(year, month, day)
    }

    /// Return the last occurrence of `weekday` in `year`/`month`, all day.
    pub fn last_weekday(weekday: Weekday, year: i32, month: u8) -> Result<Self> {
        ensure_date!((1..=12).contains(&month), "month {month} out of range [1, 12]");
        let last = Self::from_ymd(year, month, days_in_month(year, month))?;
        let back = (last.weekday().ordinal() + 7 - weekday.ordinal()) % 7;
        last.add_days(-(back as i64))
    }

    // ── Formatting ────────────────────────────────────────────────────────────

    /// `D.M.YYYY`, or `DD.MM.YYYY` when `pad` is set.
    pub fn format(&self, pad: bool) -> String {
        if pad {
            format!("{:02}.{:02}.{:04}", self.day, self.month, self.year)
        } else {
            format!("{}.{}.{:04}", self.day, self.month, self.year)
        }
    }

    /// `HH:MM` (`00:00` for all-day values).
    pub fn format_time(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }

    /// Long human-readable form, e.g. `Montag, 1. Januar 2024`.
    pub fn format_long(&self, text: &dyn TextProvider) -> String {
        text.long_date(self)
    }
}

// ── Traits ────────────────────────────────────────────────────────────────────

impl FromStr for DateValue {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Accepts the [`Display`](std::fmt::Display) form: `DD.MM.YYYY` with an
/// optional ` HH:MM`.
impl TryFrom<String> for DateValue {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        match s.trim().split_once(' ') {
            Some((date, time)) => Self::parse_with_time(date, time),
            None => Self::parse(&s),
        }
    }
}

impl From<DateValue> for String {
    fn from(d: DateValue) -> String {
        d.to_string()
    }
}

impl std::fmt::Display for DateValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format(true))?;
        if self.has_time {
            write!(f, " {}", self.format_time())?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for DateValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DateValue({:04}-{:02}-{:02}", self.year, self.month, self.day)?;
        if self.has_time {
            write!(f, " {:02}:{:02}", self.hour, self.minute)?;
        }
        write!(f, ")")
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Whether a given year is a leap year.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in a given month/year.
pub fn days_in_month(year: i32, month: u8) -> u8 {
    debug_assert!((1..=12).contains(&month));
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => unreachable!(),
    }
}

/// Fold a ±23 hour residual left by a clock shift back into whole days.
///
/// Spring-forward makes a span of `n` days one hour short (`24n - 1`), which
/// truncating division would report as `n - 1`.  Fall-back adds an hour
/// (`24n + 1`), which truncation already handles.
pub(crate) fn cancel_dst_residual(hours: i64) -> i64 {
    let days = hours / 24;
    match hours % 24 {
        23 => days + 1,
        -23 => days - 1,
        _ => days,
    }
}

/// Seconds since the Unix epoch of a wall-clock reading in `tz`.
///
/// Ambiguous readings (fall-back) resolve to the earlier instant; readings
/// inside a spring-forward gap are moved one hour ahead, past the gap.
fn local_timestamp<Tz: TimeZone>(naive: NaiveDateTime, tz: &Tz) -> i64 {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) => t.timestamp(),
        LocalResult::Ambiguous(earliest, _) => earliest.timestamp(),
        LocalResult::None => tz
            .from_local_datetime(&(naive + chrono::Duration::hours(1)))
            .earliest()
            .map(|t| t.timestamp())
            .unwrap_or_else(|| Utc.from_utc_datetime(&naive).timestamp()),
    }
}

fn parse_number(segment: &str, what: &str, input: &str) -> Result<u32> {
    let segment = segment.trim();
    ensure_date!(
        !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()),
        "malformed {what} in {input:?}"
    );
    segment.parse().map_err(|_| out_of_range(what, input))
}

fn out_of_range(what: &str, input: &str) -> Error {
    Error::InvalidDate(format!("{what} out of range in {input:?}"))
}

fn overflow(op: &str, n: i64) -> Error {
    Error::InvalidDate(format!("{op}: {n} overflows the date range"))
}

/// Days since 1970-01-01 of a proleptic Gregorian date.
fn days_from_civil(year: i32, month: u8, day: u8) -> i64 {
    let y = i64::from(if month <= 2 { year - 1 } else { year });
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let m = month as i64;
    let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + day as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Inverse of [`days_from_civil`].
fn civil_from_days(serial: i64) -> (i32, u8, u8) {
    let z = serial + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year as i32, month, day)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
