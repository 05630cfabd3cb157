//! Localized names.
//!
//! Computations never look up strings themselves.  Whoever needs a month,
//! weekday or holiday name, or the words of a relative-time label, is handed
//! a [`TextProvider`].  [`German`] is the application's native language and
//! produces the literal labels `in`, `vor` and `JETZT`.

use crate::date::DateValue;
use crate::holiday::{Holiday, LawHoliday, SpecialDay};
use crate::month::Month;
use crate::weekday::Weekday;

/// Short or long form of a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameStyle {
    /// Abbreviation, e.g. `Jan`, `Mo`.
    Short,
    /// Full name, e.g. `Januar`, `Montag`.
    Long,
}

/// Source of every user-visible string the calendar core produces.
pub trait TextProvider: Send + Sync {
    /// Name of a month.
    fn month_name(&self, month: Month, style: NameStyle) -> &str;

    /// Name of a weekday.
    fn weekday_name(&self, weekday: Weekday, style: NameStyle) -> &str;

    /// Display name of a holiday.
    fn holiday_name(&self, holiday: Holiday) -> &str;

    /// Prefix of a label for an instant in the future.
    fn relative_future(&self) -> &str;

    /// Prefix of a label for an instant in the past.
    fn relative_past(&self) -> &str;

    /// Label for an instant in the current minute.
    fn relative_now(&self) -> &str;

    /// Join a direction word and a span such as `1h 5min`.
    fn relative_phrase(&self, future: bool, span: &str) -> String {
        let word = if future {
            self.relative_future()
        } else {
            self.relative_past()
        };
        format!("{word} {span}")
    }

    /// Long date, e.g. `Montag, 1. Januar 2024`.
    fn long_date(&self, date: &DateValue) -> String {
        format!(
            "{}, {}. {} {}",
            self.weekday_name(date.weekday(), NameStyle::Long),
            date.day(),
            self.month_name(date.month_of_year(), NameStyle::Long),
            date.year()
        )
    }
}

// ── German ────────────────────────────────────────────────────────────────────

/// German names.
#[derive(Debug, Clone, Copy, Default)]
pub struct German;

const DE_MONTHS: [&str; 12] = [
    "Januar", "Februar", "März", "April", "Mai", "Juni", "Juli", "August", "September",
    "Oktober", "November", "Dezember",
];
const DE_MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mär", "Apr", "Mai", "Jun", "Jul", "Aug", "Sep", "Okt", "Nov", "Dez",
];
const DE_WEEKDAYS: [&str; 7] = [
    "Montag", "Dienstag", "Mittwoch", "Donnerstag", "Freitag", "Samstag", "Sonntag",
];
const DE_WEEKDAYS_SHORT: [&str; 7] = ["Mo", "Di", "Mi", "Do", "Fr", "Sa", "So"];

impl TextProvider for German {
    fn month_name(&self, month: Month, style: NameStyle) -> &str {
        let idx = month.number() as usize - 1;
        match style {
            NameStyle::Short => DE_MONTHS_SHORT[idx],
            NameStyle::Long => DE_MONTHS[idx],
        }
    }

    fn weekday_name(&self, weekday: Weekday, style: NameStyle) -> &str {
        let idx = weekday.ordinal() as usize - 1;
        match style {
            NameStyle::Short => DE_WEEKDAYS_SHORT[idx],
            NameStyle::Long => DE_WEEKDAYS[idx],
        }
    }

    fn holiday_name(&self, holiday: Holiday) -> &str {
        match holiday {
            Holiday::Law(h) => match h {
                LawHoliday::NewYear => "Neujahr",
                LawHoliday::Epiphany => "Heilige Drei Könige",
                LawHoliday::GoodFriday => "Karfreitag",
                LawHoliday::EasterSunday => "Ostersonntag",
                LawHoliday::EasterMonday => "Ostermontag",
                LawHoliday::LabourDay => "Tag der Arbeit",
                LawHoliday::Ascension => "Christi Himmelfahrt",
                LawHoliday::WhitMonday => "Pfingstmontag",
                LawHoliday::CorpusChristi => "Fronleichnam",
                LawHoliday::Assumption => "Mariä Himmelfahrt",
                LawHoliday::UnityDay => "Tag der Deutschen Einheit",
                LawHoliday::ReformationDay => "Reformationstag",
                LawHoliday::AllSaints => "Allerheiligen",
                LawHoliday::RepentanceDay => "Buß- und Bettag",
                LawHoliday::ChristmasDay => "1. Weihnachtstag",
                LawHoliday::BoxingDay => "2. Weihnachtstag",
            },
            Holiday::Special(h) => match h {
                SpecialDay::ValentinesDay => "Valentinstag",
                SpecialDay::RoseMonday => "Rosenmontag",
                SpecialDay::ShroveTuesday => "Fastnacht",
                SpecialDay::AshWednesday => "Aschermittwoch",
                SpecialDay::PalmSunday => "Palmsonntag",
                SpecialDay::MaundyThursday => "Gründonnerstag",
                SpecialDay::HolySaturday => "Karsamstag",
                SpecialDay::SummerTime => "Beginn der Sommerzeit",
                SpecialDay::MothersDay => "Muttertag",
                SpecialDay::WhitSunday => "Pfingstsonntag",
                SpecialDay::HarvestFestival => "Erntedankfest",
                SpecialDay::WinterTime => "Ende der Sommerzeit",
                SpecialDay::Halloween => "Halloween",
                SpecialDay::StMartin => "Martinstag",
                SpecialDay::MemorialSunday => "Volkstrauertag",
                SpecialDay::DeadSunday => "Totensonntag",
                SpecialDay::FirstAdvent => "1. Advent",
                SpecialDay::ChristmasEve => "Heiligabend",
                SpecialDay::NewYearsEve => "Silvester",
            },
        }
    }

    fn relative_future(&self) -> &str {
        "in"
    }

    fn relative_past(&self) -> &str {
        "vor"
    }

    fn relative_now(&self) -> &str {
        "JETZT"
    }
}

// ── English ───────────────────────────────────────────────────────────────────

/// English names.
#[derive(Debug, Clone, Copy, Default)]
pub struct English;

const EN_MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];
const EN_WEEKDAYS: [&str; 7] = [
    "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
];

impl TextProvider for English {
    fn month_name(&self, month: Month, style: NameStyle) -> &str {
        let long = EN_MONTHS[month.number() as usize - 1];
        match style {
            NameStyle::Short => &long[..3],
            NameStyle::Long => long,
        }
    }

    fn weekday_name(&self, weekday: Weekday, style: NameStyle) -> &str {
        let long = EN_WEEKDAYS[weekday.ordinal() as usize - 1];
        match style {
            NameStyle::Short => &long[..3],
            NameStyle::Long => long,
        }
    }

    fn holiday_name(&self, holiday: Holiday) -> &str {
        match holiday {
            Holiday::Law(h) => match h {
                LawHoliday::NewYear => "New Year's Day",
                LawHoliday::Epiphany => "Epiphany",
                LawHoliday::GoodFriday => "Good Friday",
                LawHoliday::EasterSunday => "Easter Sunday",
                LawHoliday::EasterMonday => "Easter Monday",
                LawHoliday::LabourDay => "Labour Day",
                LawHoliday::Ascension => "Ascension Day",
                LawHoliday::WhitMonday => "Whit Monday",
                LawHoliday::CorpusChristi => "Corpus Christi",
                LawHoliday::Assumption => "Assumption Day",
                LawHoliday::UnityDay => "German Unity Day",
                LawHoliday::ReformationDay => "Reformation Day",
                LawHoliday::AllSaints => "All Saints' Day",
                LawHoliday::RepentanceDay => "Day of Repentance and Prayer",
                LawHoliday::ChristmasDay => "Christmas Day",
                LawHoliday::BoxingDay => "Boxing Day",
            },
            Holiday::Special(h) => match h {
                SpecialDay::ValentinesDay => "Valentine's Day",
                SpecialDay::RoseMonday => "Rose Monday",
                SpecialDay::ShroveTuesday => "Shrove Tuesday",
                SpecialDay::AshWednesday => "Ash Wednesday",
                SpecialDay::PalmSunday => "Palm Sunday",
                SpecialDay::MaundyThursday => "Maundy Thursday",
                SpecialDay::HolySaturday => "Holy Saturday",
                SpecialDay::SummerTime => "Daylight saving time begins",
                SpecialDay::MothersDay => "Mother's Day",
                SpecialDay::WhitSunday => "Whit Sunday",
                SpecialDay::HarvestFestival => "Harvest Festival",
                SpecialDay::WinterTime => "Daylight saving time ends",
                SpecialDay::Halloween => "Halloween",
                SpecialDay::StMartin => "St. Martin's Day",
                SpecialDay::MemorialSunday => "National Day of Mourning",
                SpecialDay::DeadSunday => "Sunday of the Dead",
                SpecialDay::FirstAdvent => "First Sunday of Advent",
                SpecialDay::ChristmasEve => "Christmas Eve",
                SpecialDay::NewYearsEve => "New Year's Eve",
            },
        }
    }

    fn relative_future(&self) -> &str {
        "in"
    }

    fn relative_past(&self) -> &str {
        "ago"
    }

    fn relative_now(&self) -> &str {
        "NOW"
    }

    fn relative_phrase(&self, future: bool, span: &str) -> String {
        if future {
            format!("in {span}")
        } else {
            format!("{span} ago")
        }
    }

    fn long_date(&self, date: &DateValue) -> String {
        format!(
            "{}, {} {}, {}",
            self.weekday_name(date.weekday(), NameStyle::Long),
            self.month_name(date.month_of_year(), NameStyle::Long),
            date.day(),
            date.year()
        )
    }
}
