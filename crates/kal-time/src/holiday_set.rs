//! Resolution of enabled holidays to concrete dates for one year.

use std::collections::BTreeMap;

use kal_core::errors::Result;

use crate::date::DateValue;
use crate::easter::easter_sunday_date;
use crate::holiday::{Holiday, HolidayKind, LawHoliday, Rule, Selection, SpecialDay};
use crate::weekday::Weekday;

/// One holiday placed in a concrete year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HolidayInstance {
    holiday: Holiday,
    date: DateValue,
    rule: Rule,
}

impl HolidayInstance {
    /// The identifier.
    pub fn holiday(&self) -> Holiday {
        self.holiday
    }

    /// The all-day date in the resolved year.
    pub fn date(&self) -> DateValue {
        self.date
    }

    /// The rule the date was derived from.
    pub fn rule(&self) -> Rule {
        self.rule
    }

    /// Return `true` if the date changes from year to year.
    pub fn is_movable(&self) -> bool {
        self.rule.is_movable()
    }

    /// Day offset from Easter Sunday, for Easter-relative holidays.
    pub fn easter_offset(&self) -> Option<i32> {
        self.rule.easter_offset()
    }
}

/// The enabled holidays of one year.
///
/// Easter Sunday and First Advent are computed once per resolution and every
/// movable date is derived from them.
#[derive(Debug, Clone)]
pub struct HolidaySet {
    year: i32,
    anchors: Anchors,
    entries: BTreeMap<Holiday, HolidayInstance>,
}

#[derive(Debug, Clone, Copy)]
struct Anchors {
    easter: DateValue,
    first_advent: DateValue,
}

impl Anchors {
    fn for_year(year: i32) -> Result<Self> {
        Ok(Self {
            easter: easter_sunday_date(year)?,
            first_advent: first_advent(year)?,
        })
    }

    fn place(&self, year: i32, rule: Rule) -> Result<DateValue> {
        match rule {
            Rule::Fixed { month, day } => DateValue::from_ymd(year, month, day),
            Rule::Easter(offset) => self.easter.add_days(offset as i64),
            Rule::NthSunday { month, n } => DateValue::nth_weekday(n, Weekday::Sunday, year, month),
            Rule::LastSunday { month } => DateValue::last_weekday(Weekday::Sunday, year, month),
            Rule::Advent(offset) => self.first_advent.add_days(offset as i64),
        }
    }
}

impl HolidaySet {
    /// Resolve the holidays enabled in two persisted masks.
    ///
    /// Undefined bits are ignored.  Fails only if `year` is outside the
    /// supported date range.
    pub fn resolve(year: i32, law_mask: u32, special_mask: u32) -> Result<Self> {
        Self::resolve_selection(
            year,
            Selection::from_bits(law_mask),
            Selection::from_bits(special_mask),
        )
    }

    /// Resolve typed selections.
    pub fn resolve_selection(
        year: i32,
        law: Selection<LawHoliday>,
        special: Selection<SpecialDay>,
    ) -> Result<Self> {
        let anchors = Anchors::for_year(year)?;
        let mut entries = BTreeMap::new();
        insert_all(&mut entries, year, &anchors, law)?;
        insert_all(&mut entries, year, &anchors, special)?;
        Ok(Self {
            year,
            anchors,
            entries,
        })
    }

    /// Date of a single holiday in `year`, regardless of any mask.
    pub fn resolve_one(holiday: Holiday, year: i32) -> Result<DateValue> {
        Anchors::for_year(year)?.place(year, holiday.rule())
    }

    /// The resolved year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Easter Sunday of the resolved year.
    pub fn easter_sunday(&self) -> DateValue {
        self.anchors.easter
    }

    /// Number of resolved holidays.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` if no holiday is enabled.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The resolved instance of `holiday`, if enabled.
    pub fn get(&self, holiday: impl Into<Holiday>) -> Option<&HolidayInstance> {
        self.entries.get(&holiday.into())
    }

    /// The date of `holiday`, if enabled.
    pub fn date_of(&self, holiday: impl Into<Holiday>) -> Option<DateValue> {
        self.get(holiday).map(HolidayInstance::date)
    }

    /// Enabled holidays falling on the calendar date of `date`.
    pub fn holidays_on(&self, date: &DateValue) -> impl Iterator<Item = Holiday> + '_ {
        let date = *date;
        self.entries
            .values()
            .filter(move |i| i.date.same_date(&date))
            .map(|i| i.holiday)
    }

    /// Return `true` if an enabled law holiday falls on `date`.
    pub fn is_law_holiday(&self, date: &DateValue) -> bool {
        self.holidays_on(date).any(Holiday::is_law)
    }

    /// Instances keyed by identifier.
    pub fn iter(&self) -> impl Iterator<Item = &HolidayInstance> {
        self.entries.values()
    }

    /// Instances sorted by date, ties broken by identifier.
    pub fn in_date_order(&self) -> Vec<&HolidayInstance> {
        let mut all: Vec<_> = self.entries.values().collect();
        all.sort_by_key(|i| (i.date, i.holiday));
        all
    }

    /// Plain identifier → date mapping.
    pub fn dates(&self) -> BTreeMap<Holiday, DateValue> {
        self.entries.iter().map(|(h, i)| (*h, i.date)).collect()
    }
}

fn insert_all<K: HolidayKind>(
    entries: &mut BTreeMap<Holiday, HolidayInstance>,
    year: i32,
    anchors: &Anchors,
    selection: Selection<K>,
) -> Result<()> {
    for kind in selection.iter() {
        let rule = kind.rule();
        let instance = HolidayInstance {
            holiday: kind.holiday(),
            date: anchors.place(year, rule)?,
            rule,
        };
        entries.insert(instance.holiday, instance);
    }
    Ok(())
}

/// First Sunday of Advent: three weeks before the last Sunday on or before
/// 24 December.
fn first_advent(year: i32) -> Result<DateValue> {
    let christmas_eve = DateValue::from_ymd(year, 12, 24)?;
    let back_to_sunday = (christmas_eve.weekday().ordinal() % 7) as i64;
    christmas_eve.add_days(-back_to_sunday - 21)
}
