//! Integration tests for holiday resolution: Easter-relative placement,
//! Advent-relative placement, mask handling, and concrete dates for 2024.

use std::collections::HashSet;

use kal_time::{
    easter_sunday_date, DateValue, Holiday, HolidayKind, HolidaySet, LawHoliday, Selection,
    SpecialDay, Weekday,
};

fn date(y: i32, m: u8, d: u8) -> DateValue {
    DateValue::from_ymd(y, m, d).unwrap()
}

// ─── Counts and masks ─────────────────────────────────────────────────────────

#[test]
fn all_law_holidays_resolve_every_year() {
    for year in 1900..=2100 {
        let set = HolidaySet::resolve(year, 0xFFFF, 0).unwrap();
        assert_eq!(set.len(), 16, "law holidays in {year}");
        assert!(set.iter().all(|i| i.date().year() == year));
    }
}

#[test]
fn all_special_days_resolve_every_year() {
    for year in 1900..=2100 {
        let set = HolidaySet::resolve(year, 0, SpecialDay::MASK).unwrap();
        assert_eq!(set.len(), 19, "special days in {year}");
    }
}

#[test]
fn undefined_bits_are_ignored() {
    let set = HolidaySet::resolve(2024, 0xFFFF_FFFF, 0xFFFF_FFFF).unwrap();
    assert_eq!(set.len(), 35);
}

#[test]
fn empty_masks_resolve_nothing() {
    let set = HolidaySet::resolve(2024, 0, 0).unwrap();
    assert!(set.is_empty());
    assert_eq!(set.easter_sunday(), date(2024, 3, 31));
}

#[test]
fn default_masks() {
    let law = Selection::<LawHoliday>::default();
    assert_eq!(law.bits(), 0xC4F5);
    assert!(law.contains(LawHoliday::UnityDay));
    assert!(!law.contains(LawHoliday::Epiphany));
    let special = Selection::<SpecialDay>::default();
    assert_eq!(special.bits(), 0x7098A);
    assert!(special.contains(SpecialDay::FirstAdvent));
}

// ─── Placement rules ──────────────────────────────────────────────────────────

#[test]
fn movable_dates_follow_easter() {
    for year in 1900..=2100 {
        let easter = easter_sunday_date(year).unwrap();
        let set = HolidaySet::resolve(year, LawHoliday::MASK, SpecialDay::MASK).unwrap();
        assert_eq!(set.easter_sunday(), easter);
        for instance in set.iter() {
            if let Some(offset) = instance.easter_offset() {
                assert_eq!(
                    instance.date(),
                    easter.add_days(offset as i64).unwrap(),
                    "{:?} in {year}",
                    instance.holiday()
                );
            }
        }
    }
}

#[test]
fn easter_is_always_a_sunday_between_march_22_and_april_25() {
    for year in 1583..=4099 {
        let easter = easter_sunday_date(year).unwrap();
        assert_eq!(easter.weekday(), Weekday::Sunday, "{year}");
        assert!(easter >= date(year, 3, 22) && easter <= date(year, 4, 25), "{year}");
    }
}

#[test]
fn advent_relative_days() {
    for year in 1950..=2050 {
        let set = HolidaySet::resolve(
            year,
            LawHoliday::RepentanceDay.bit(),
            SpecialDay::FirstAdvent.bit()
                | SpecialDay::DeadSunday.bit()
                | SpecialDay::MemorialSunday.bit(),
        )
        .unwrap();
        let advent = set.date_of(SpecialDay::FirstAdvent).unwrap();
        assert_eq!(advent.weekday(), Weekday::Sunday);
        assert!(advent >= date(year, 11, 27) && advent <= date(year, 12, 3), "{year}");

        let repentance = set.date_of(LawHoliday::RepentanceDay).unwrap();
        assert_eq!(repentance.weekday(), Weekday::Wednesday);
        assert!(repentance >= date(year, 11, 16) && repentance <= date(year, 11, 22));

        assert_eq!(set.date_of(SpecialDay::DeadSunday), Some(advent.add_days(-7).unwrap()));
        assert_eq!(set.date_of(SpecialDay::MemorialSunday), Some(advent.add_days(-14).unwrap()));
    }
}

#[test]
fn sunday_rules() {
    for year in 1970..=2050 {
        for day in [
            SpecialDay::SummerTime,
            SpecialDay::MothersDay,
            SpecialDay::HarvestFestival,
            SpecialDay::WinterTime,
        ] {
            let d = HolidaySet::resolve_one(day.holiday(), year).unwrap();
            assert_eq!(d.weekday(), Weekday::Sunday, "{day:?} in {year}");
        }
        let summer = HolidaySet::resolve_one(SpecialDay::SummerTime.into(), year).unwrap();
        assert_eq!(summer.month(), 3);
        assert!(summer.add_days(7).unwrap().month() == 4);
    }
}

// ─── Concrete dates ───────────────────────────────────────────────────────────

#[test]
fn law_holidays_2024() {
    let set = HolidaySet::resolve(2024, LawHoliday::MASK, 0).unwrap();
    let expected = [
        (LawHoliday::NewYear, date(2024, 1, 1)),
        (LawHoliday::Epiphany, date(2024, 1, 6)),
        (LawHoliday::GoodFriday, date(2024, 3, 29)),
        (LawHoliday::EasterSunday, date(2024, 3, 31)),
        (LawHoliday::EasterMonday, date(2024, 4, 1)),
        (LawHoliday::LabourDay, date(2024, 5, 1)),
        (LawHoliday::Ascension, date(2024, 5, 9)),
        (LawHoliday::WhitMonday, date(2024, 5, 20)),
        (LawHoliday::CorpusChristi, date(2024, 5, 30)),
        (LawHoliday::Assumption, date(2024, 8, 15)),
        (LawHoliday::UnityDay, date(2024, 10, 3)),
        (LawHoliday::ReformationDay, date(2024, 10, 31)),
        (LawHoliday::AllSaints, date(2024, 11, 1)),
        (LawHoliday::RepentanceDay, date(2024, 11, 20)),
        (LawHoliday::ChristmasDay, date(2024, 12, 25)),
        (LawHoliday::BoxingDay, date(2024, 12, 26)),
    ];
    for (holiday, expected) in expected {
        assert_eq!(set.date_of(holiday), Some(expected), "{holiday:?}");
    }
    let distinct: HashSet<DateValue> = set.iter().map(|i| i.date()).collect();
    assert_eq!(distinct.len(), 16);
}

#[test]
fn special_days_2024() {
    let set = HolidaySet::resolve(2024, 0, SpecialDay::MASK).unwrap();
    let expected = [
        (SpecialDay::ValentinesDay, date(2024, 2, 14)),
        (SpecialDay::RoseMonday, date(2024, 2, 12)),
        (SpecialDay::ShroveTuesday, date(2024, 2, 13)),
        (SpecialDay::AshWednesday, date(2024, 2, 14)),
        (SpecialDay::PalmSunday, date(2024, 3, 24)),
        (SpecialDay::MaundyThursday, date(2024, 3, 28)),
        (SpecialDay::HolySaturday, date(2024, 3, 30)),
        (SpecialDay::SummerTime, date(2024, 3, 31)),
        (SpecialDay::MothersDay, date(2024, 5, 12)),
        (SpecialDay::WhitSunday, date(2024, 5, 19)),
        (SpecialDay::HarvestFestival, date(2024, 10, 6)),
        (SpecialDay::WinterTime, date(2024, 10, 27)),
        (SpecialDay::Halloween, date(2024, 10, 31)),
        (SpecialDay::StMartin, date(2024, 11, 11)),
        (SpecialDay::MemorialSunday, date(2024, 11, 17)),
        (SpecialDay::DeadSunday, date(2024, 11, 24)),
        (SpecialDay::FirstAdvent, date(2024, 12, 1)),
        (SpecialDay::ChristmasEve, date(2024, 12, 24)),
        (SpecialDay::NewYearsEve, date(2024, 12, 31)),
    ];
    for (day, expected) in expected {
        assert_eq!(set.date_of(day), Some(expected), "{day:?}");
    }
}

#[test]
fn ascension_can_fall_on_labour_day() {
    let set = HolidaySet::resolve(2008, LawHoliday::MASK, 0).unwrap();
    assert_eq!(set.len(), 16);
    assert_eq!(set.date_of(LawHoliday::Ascension), set.date_of(LawHoliday::LabourDay));
    let on: Vec<Holiday> = set.holidays_on(&date(2008, 5, 1)).collect();
    assert_eq!(on, vec![LawHoliday::LabourDay.into(), LawHoliday::Ascension.into()]);
}

#[test]
fn resolution_is_independent_of_order() {
    let forward: Selection<LawHoliday> = LawHoliday::ALL.iter().copied().collect();
    let backward: Selection<LawHoliday> = LawHoliday::ALL.iter().rev().copied().collect();
    let a = HolidaySet::resolve_selection(2031, forward, Selection::empty()).unwrap();
    let b = HolidaySet::resolve_selection(2031, backward, Selection::empty()).unwrap();
    assert_eq!(a.dates(), b.dates());
}

#[test]
fn in_date_order_is_sorted() {
    let set = HolidaySet::resolve(2024, LawHoliday::MASK, SpecialDay::MASK).unwrap();
    let ordered = set.in_date_order();
    assert_eq!(ordered.len(), 35);
    assert!(ordered.windows(2).all(|w| w[0].date() <= w[1].date()));
    assert_eq!(ordered[0].holiday(), Holiday::Law(LawHoliday::NewYear));
    assert_eq!(ordered[34].holiday(), Holiday::Special(SpecialDay::NewYearsEve));
}

#[test]
fn timed_lookup_matches_calendar_date() {
    let set = HolidaySet::resolve(2024, LawHoliday::MASK, 0).unwrap();
    let evening = DateValue::from_ymd_hm(2024, 12, 25, 20, 15).unwrap();
    assert!(set.is_law_holiday(&evening));
}
