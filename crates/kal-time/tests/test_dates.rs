//! Integration tests for `DateValue`: parsing, day/minute differences across
//! clock shifts, month structure, and formatting.

use chrono_tz::Europe::Berlin;
use proptest::prelude::*;

use kal_time::{DateValue, German, Weekday};

fn date(y: i32, m: u8, d: u8) -> DateValue {
    DateValue::from_ymd(y, m, d).unwrap()
}

// ─── Parsing ──────────────────────────────────────────────────────────────────

#[test]
fn parse_unpadded_and_padded() {
    assert_eq!(DateValue::parse("1.1.2024").unwrap(), date(2024, 1, 1));
    assert_eq!(DateValue::parse("01.01.2024").unwrap(), date(2024, 1, 1));
    assert_eq!(DateValue::parse(" 29.2.2024 ").unwrap(), date(2024, 2, 29));
}

#[test]
fn parse_discards_dash_suffix() {
    assert_eq!(DateValue::parse("24.12.2024-1").unwrap(), date(2024, 12, 24));
}

#[test]
fn parse_rejects_malformed_input() {
    for bad in ["", "1.1", "1.1.2024.5", "a.1.2024", "29.2.2023", "1.13.2024", "0.1.2024"] {
        assert!(DateValue::parse(bad).is_err(), "{bad:?} should not parse");
    }
}

#[test]
fn parse_with_time_sets_time() {
    let d = DateValue::parse_with_time("3.10.2024", "7:05").unwrap();
    assert!(d.has_time());
    assert_eq!((d.hour(), d.minute()), (7, 5));
    assert!(DateValue::parse_with_time("3.10.2024", "24:00").is_err());
    assert!(DateValue::parse_with_time("3.10.2024", "0700").is_err());
}

#[test]
fn display_round_trips_through_string() {
    let timed = DateValue::from_ymd_hm(2024, 3, 9, 18, 30).unwrap();
    let s = timed.to_string();
    assert_eq!(s, "09.03.2024 18:30");
    assert_eq!(DateValue::try_from(s).unwrap(), timed);
    assert_eq!(date(2024, 3, 9).to_string(), "09.03.2024");
}

// ─── Differences ──────────────────────────────────────────────────────────────

#[test]
fn day_diff_over_year_boundary() {
    let a = DateValue::parse("1.1.2024").unwrap();
    let b = DateValue::parse("31.12.2023").unwrap();
    assert_eq!(a.day_diff_in(&b, &Berlin), 1);
    assert_eq!(b.day_diff_in(&a, &Berlin), -1);
}

#[test]
fn day_diff_ignores_time_of_day() {
    let a = DateValue::from_ymd_hm(2024, 5, 2, 0, 1).unwrap();
    let b = DateValue::from_ymd_hm(2024, 5, 1, 23, 59).unwrap();
    assert_eq!(a.day_diff_in(&b, &Berlin), 1);
}

#[test]
fn day_diff_across_spring_forward() {
    // 31 March 2024 has 23 hours in Berlin.
    assert_eq!(date(2024, 4, 1).day_diff_in(&date(2024, 3, 31), &Berlin), 1);
    assert_eq!(date(2024, 4, 1).day_diff_in(&date(2024, 3, 30), &Berlin), 2);
    assert_eq!(date(2024, 3, 30).day_diff_in(&date(2024, 4, 1), &Berlin), -2);
}

#[test]
fn day_diff_across_fall_back() {
    // 27 October 2024 has 25 hours in Berlin.
    assert_eq!(date(2024, 10, 28).day_diff_in(&date(2024, 10, 27), &Berlin), 1);
    assert_eq!(date(2024, 10, 28).day_diff_in(&date(2024, 10, 26), &Berlin), 2);
    assert_eq!(date(2024, 10, 26).day_diff_in(&date(2024, 10, 28), &Berlin), -2);
}

#[test]
fn day_diff_over_a_full_year_of_shifts() {
    assert_eq!(date(2025, 1, 1).day_diff_in(&date(2024, 1, 1), &Berlin), 366);
    assert_eq!(date(2024, 7, 1).day_diff_in(&date(2024, 1, 1), &Berlin), 182);
}

#[test]
fn min_diff_counts_elapsed_minutes() {
    let before = DateValue::from_ymd_hm(2024, 3, 31, 1, 30).unwrap();
    let after = DateValue::from_ymd_hm(2024, 3, 31, 3, 30).unwrap();
    // Only one real hour passes: 02:00 CET jumps to 03:00 CEST.
    assert_eq!(after.min_diff_in(&before, &Berlin), 60);

    let a = DateValue::from_ymd_hm(2024, 6, 1, 12, 0).unwrap();
    let b = DateValue::from_ymd_hm(2024, 6, 1, 10, 15).unwrap();
    assert_eq!(a.min_diff_in(&b, &Berlin), 105);
    assert_eq!(b.min_diff_in(&a, &Berlin), -105);
}

#[test]
fn all_day_counts_as_midnight_in_min_diff() {
    let midnight = DateValue::from_ymd_hm(2024, 6, 1, 0, 0).unwrap();
    assert_eq!(date(2024, 6, 1).min_diff_in(&midnight, &Berlin), 0);
}

// ─── Month structure ──────────────────────────────────────────────────────────

#[test]
fn weekday_index_values() {
    // Tuesdays of January 2024: 2, 9, 16, 23, 30.
    assert_eq!(date(2024, 1, 2).weekday_index(), 1);
    assert_eq!(date(2024, 1, 9).weekday_index(), 2);
    assert_eq!(date(2024, 1, 23).weekday_index(), 4);
    assert_eq!(date(2024, 1, 30).weekday_index(), 0);
    // 25 January is the 4th and also the last Thursday.
    assert_eq!(date(2024, 1, 25).weekday_index(), 0);
}

#[test]
fn nth_and_last_weekday() {
    assert_eq!(
        DateValue::nth_weekday(2, Weekday::Sunday, 2024, 5).unwrap(),
        date(2024, 5, 12)
    );
    assert!(DateValue::nth_weekday(5, Weekday::Monday, 2024, 2).is_err());
    assert_eq!(
        DateValue::last_weekday(Weekday::Sunday, 2024, 10).unwrap(),
        date(2024, 10, 27)
    );
}

#[test]
fn nth_weekday_rejects_large_ordinals() {
    for n in [6u8, 38, 255] {
        assert!(DateValue::nth_weekday(n, Weekday::Monday, 2024, 1).is_err(), "n = {n}");
    }
    // January 2024 has five Mondays: 1, 8, 15, 22, 29.
    assert_eq!(
        DateValue::nth_weekday(5, Weekday::Monday, 2024, 1).unwrap(),
        date(2024, 1, 29)
    );
}

#[test]
fn arithmetic_overflow_is_an_error() {
    let d = date(2024, 6, 15);
    assert!(d.add_days(i64::MAX).is_err());
    assert!(d.add_days(i64::MIN).is_err());
    assert!(d.add_months(i64::MAX).is_err());
    assert!(d.add_years(i64::MAX / 2).is_err());
    assert!(d.add_years(i64::MIN).is_err());
    assert!(d.add_minutes(i64::MAX).is_err());
    assert!(d.add_minutes(i64::MIN).is_err());
}

#[test]
fn add_months_clamps_to_month_end() {
    assert_eq!(date(2024, 1, 31).add_months(1).unwrap(), date(2024, 2, 29));
    assert_eq!(date(2023, 1, 31).add_months(1).unwrap(), date(2023, 2, 28));
    assert_eq!(date(2024, 2, 29).add_years(1).unwrap(), date(2025, 2, 28));
}

// ─── Formatting ───────────────────────────────────────────────────────────────

#[test]
fn formats() {
    let d = date(2024, 3, 5);
    assert_eq!(d.format(false), "5.3.2024");
    assert_eq!(d.format(true), "05.03.2024");
    assert_eq!(d.format_long(&German), "Dienstag, 5. März 2024");
    let t = DateValue::from_ymd_hm(2024, 3, 5, 8, 4).unwrap();
    assert_eq!(t.format_time(), "08:04");
}

// ─── Properties ───────────────────────────────────────────────────────────────

fn any_date() -> impl Strategy<Value = DateValue> {
    (1990i32..2060, 1u8..=12, 1u8..=28).prop_map(|(y, m, d)| date(y, m, d))
}

proptest! {
    #[test]
    fn day_diff_is_antisymmetric(a in any_date(), b in any_date()) {
        prop_assert_eq!(a.day_diff_in(&b, &Berlin), -b.day_diff_in(&a, &Berlin));
        prop_assert_eq!(a.day_diff_in(&a, &Berlin), 0);
    }

    #[test]
    fn day_diff_matches_serial_distance(a in any_date(), b in any_date()) {
        prop_assert_eq!(a.day_diff_in(&b, &Berlin), a.serial() - b.serial());
    }

    #[test]
    fn add_days_then_diff(a in any_date(), n in -2000i64..2000) {
        let b = a.add_days(n).unwrap();
        prop_assert_eq!(b.day_diff_in(&a, &Berlin), n);
    }
}
