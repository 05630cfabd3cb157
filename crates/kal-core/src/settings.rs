//! Application settings.
//!
//! [`Settings`] gathers the handful of values the calendar core needs from its
//! host: the two holiday enable masks (the only persisted state), display
//! preferences, and the timing knobs of the scheduler and the single-instance
//! guard.  Values come from the environment (optionally seeded from a `.env`
//! file); anything unset falls back to the documented defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::errors::{Error, Result};

/// Default law-holiday mask: the nationwide public holidays.
///
/// New Year, Good Friday, Easter Monday, Labour Day, Ascension, Whit Monday,
/// Unity Day and both Christmas days.
pub const DEFAULT_LAW_HOLIDAYS: u32 = 0xC4F5;

/// Default special-day mask.
///
/// Rose Monday, Ash Wednesday, both clock changes, Mother's Day, First
/// Advent, Christmas Eve and New Year's Eve.
pub const DEFAULT_SPECIAL_DAYS: u32 = 0x7098A;

/// Default polling interval of the single-instance guard.
pub const DEFAULT_GUARD_POLL: Duration = Duration::from_millis(1000);

/// Default upper bound on a single scheduler wait.
pub const DEFAULT_SCHEDULER_RECHECK: Duration = Duration::from_secs(60);

/// Runtime configuration of the calendar core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Enabled law holidays, one bit per holiday.
    pub law_holidays: u32,
    /// Enabled special days, one bit per observance.
    pub special_days: u32,
    /// Whether calendar weeks start on Monday (otherwise Sunday).
    pub week_starts_monday: bool,
    /// Whether dates are rendered as `DD.MM.YYYY` instead of `D.M.YYYY`.
    pub pad_dates: bool,
    /// Directory holding the lock and wake markers.
    pub marker_dir: PathBuf,
    /// How often the guard looks for the wake marker.
    pub guard_poll: Duration,
    /// Longest single wait of the scheduler before it re-reads the clock.
    pub scheduler_recheck: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            law_holidays: DEFAULT_LAW_HOLIDAYS,
            special_days: DEFAULT_SPECIAL_DAYS,
            week_starts_monday: true,
            pad_dates: false,
            marker_dir: std::env::temp_dir(),
            guard_poll: DEFAULT_GUARD_POLL,
            scheduler_recheck: DEFAULT_SCHEDULER_RECHECK,
        }
    }
}

impl Settings {
    /// Load settings from the process environment.
    ///
    /// A `.env` file in the working directory is read first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup.
    ///
    /// Unset keys keep their defaults; malformed values are rejected with
    /// [`Error::Config`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            law_holidays: read(&lookup, "KALENDER_LAW_HOLIDAYS", parse_mask)?
                .unwrap_or(defaults.law_holidays),
            special_days: read(&lookup, "KALENDER_SPECIAL_DAYS", parse_mask)?
                .unwrap_or(defaults.special_days),
            week_starts_monday: read(&lookup, "KALENDER_WEEK_STARTS_MONDAY", parse_bool)?
                .unwrap_or(defaults.week_starts_monday),
            pad_dates: read(&lookup, "KALENDER_PAD_DATES", parse_bool)?
                .unwrap_or(defaults.pad_dates),
            marker_dir: lookup("KALENDER_MARKER_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.marker_dir),
            guard_poll: read(&lookup, "KALENDER_GUARD_POLL_MS", |s| {
                s.parse::<u64>().ok().filter(|&ms| ms > 0).map(Duration::from_millis)
            })?
            .unwrap_or(defaults.guard_poll),
            scheduler_recheck: read(&lookup, "KALENDER_RECHECK_SECS", |s| {
                s.parse::<u64>().ok().filter(|&secs| secs > 0).map(Duration::from_secs)
            })?
            .unwrap_or(defaults.scheduler_recheck),
        })
    }
}

fn read<F, T, P>(lookup: &F, key: &str, parse: P) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Option<T>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => parse(raw.trim()).map(Some).ok_or_else(|| Error::Config {
            key: key.to_string(),
            value: raw,
        }),
    }
}

/// Masks are persisted as plain integers, decimal or `0x`-prefixed hex.
fn parse_mask(s: &str) -> Option<u32> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
