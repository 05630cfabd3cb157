//! Easter Sunday (Gauss algorithm with Lichtenberg's refinement).
//!
//! The plain Gauss rules misplace Easter in a handful of years (1954 and
//! 1981 among them); Lichtenberg's formulation folds the exceptions into the
//! arithmetic and holds for every Gregorian year.

use kal_core::errors::Result;

use crate::date::DateValue;

/// Day offset of Easter Sunday from 1 March of `year` (0 = 1 March).
///
/// All divisions are floor divisions, including for the negative
/// intermediate `s`.
pub fn easter_sunday(year: i32) -> i32 {
    let x = year;
    let a = x.rem_euclid(19);
    let k = x.div_euclid(100);
    let m = 15 + (3 * k + 3).div_euclid(4) - (8 * k + 13).div_euclid(25);
    let d = (19 * a + m).rem_euclid(30);
    let s = 2 - (3 * k + 3).div_euclid(4);
    let r = d / 29 + (d / 28 - d / 29) * (a / 11);
    let og = 21 + d - r;
    let sz = 7 - (x + x.div_euclid(4) + s).rem_euclid(7);
    let oe = 7 - (og - sz).rem_euclid(7);
    og + oe - 1
}

/// Easter Sunday of `year` as an all-day date.
pub fn easter_sunday_date(year: i32) -> Result<DateValue> {
    DateValue::from_ymd(year, 3, 1)?.add_days(easter_sunday(year) as i64)
}
