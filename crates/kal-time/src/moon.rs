//! Moon phase approximation.
//!
//! A low-precision synodic-month model: a Julian-day-like count is divided
//! by the mean synodic month and the fractional part, scaled to `[0, 8)`,
//! is compared against the four principal phases at 0, 2, 4 and 6.  Each
//! phase is reported on the one day whose position lies within half a day
//! of its node.
//!
//! The constants are kept exactly as given for output compatibility; they
//! are not derived from an astronomical ephemeris.

use crate::date::DateValue;

/// Day count offset aligning the model's epoch with a new moon.
const EPOCH: f64 = 694_039.09;

/// Mean synodic month in days.
const SYNODIC_MONTH: f64 = 29.53;

/// One day expressed in phase units (8 / 29.53).
const DAY_IN_PHASE_UNITS: f64 = 0.270_910_931_8;

/// Discrete moon phase of a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoonPhase {
    /// No principal phase on this day.
    None,
    /// New moon.
    New,
    /// First quarter.
    WaxingHalf,
    /// Full moon.
    Full,
    /// Last quarter.
    WaningHalf,
}

impl MoonPhase {
    /// The principal phase falling on `date`, if any.
    pub fn of(date: &DateValue) -> MoonPhase {
        let position = Self::position(date);
        let tolerance = DAY_IN_PHASE_UNITS / 2.0;
        let near = |node: f64| (position - node).abs() <= tolerance;
        if near(0.0) || near(8.0) {
            MoonPhase::New
        } else if near(2.0) {
            MoonPhase::WaxingHalf
        } else if near(4.0) {
            MoonPhase::Full
        } else if near(6.0) {
            MoonPhase::WaningHalf
        } else {
            MoonPhase::None
        }
    }

    /// Position of `date` within the synodic cycle, in `[0, 8)`.
    ///
    /// 0 is new moon, 4 full moon.
    pub fn position(date: &DateValue) -> f64 {
        // January and February count as months 13 and 14 of the previous year.
        let (mut y, mut m) = (date.year() as f64, date.month() as f64);
        if m < 3.0 {
            y -= 1.0;
            m += 12.0;
        }
        let c = (365.25 * y).floor();
        let e = (30.6 * (m + 1.0)).floor();
        let jd = (c + e + date.day() as f64 - EPOCH) / SYNODIC_MONTH;
        (jd - jd.floor()) * 8.0
    }

    /// Return `true` for the four principal phases.
    pub fn is_principal(&self) -> bool {
        !matches!(self, MoonPhase::None)
    }
}
