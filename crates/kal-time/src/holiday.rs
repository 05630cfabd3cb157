//! Holiday identifiers and their bitmask encoding.
//!
//! Two independent namespaces exist: 16 statutory ("law") holidays and 19
//! special days (observances, clock changes, church Sundays).  Each is
//! persisted as a plain `u32` where bit *i* enables the identifier with
//! discriminant *i*.  The integer form lives only at the persistence
//! boundary; everything else works with a typed [`Selection`].
//!
//! The bit assignment is fixed.  New identifiers may only be appended.

use std::fmt;
use std::marker::PhantomData;

use kal_core::settings::{DEFAULT_LAW_HOLIDAYS, DEFAULT_SPECIAL_DAYS};

/// How a holiday's date is derived for a given year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Same month and day every year.
    Fixed {
        /// Month (1–12).
        month: u8,
        /// Day of the month.
        day: u8,
    },
    /// A fixed number of days from Easter Sunday.
    Easter(i32),
    /// The *n*-th Sunday of a month.
    NthSunday {
        /// Month (1–12).
        month: u8,
        /// Occurrence, starting at 1.
        n: u8,
    },
    /// The last Sunday of a month.
    LastSunday {
        /// Month (1–12).
        month: u8,
    },
    /// A fixed number of days from the First Sunday of Advent.
    Advent(i32),
}

impl Rule {
    /// Return `true` unless the date is the same every year.
    pub fn is_movable(&self) -> bool {
        !matches!(self, Rule::Fixed { .. })
    }

    /// Day offset from Easter Sunday, for Easter-relative rules.
    pub fn easter_offset(&self) -> Option<i32> {
        match self {
            Rule::Easter(offset) => Some(*offset),
            _ => None,
        }
    }
}

/// A namespace of holidays sharing one 32-bit mask.
pub trait HolidayKind: Copy + Eq + Ord + std::hash::Hash + fmt::Debug + 'static {
    /// Every identifier, in bit order.
    const ALL: &'static [Self];

    /// Mask with every defined bit set.
    const MASK: u32;

    /// The documented default selection.
    const DEFAULT: u32;

    /// Bit position of this identifier.
    fn bit_index(self) -> u32;

    /// Date rule of this identifier.
    fn rule(self) -> Rule;

    /// Wrap into the namespace-spanning identifier.
    fn holiday(self) -> Holiday;

    /// Single-bit mask of this identifier.
    fn bit(self) -> u32 {
        1 << self.bit_index()
    }
}

// ── Law holidays ──────────────────────────────────────────────────────────────

/// Statutory holidays (any German state).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum LawHoliday {
    /// 1 January.
    NewYear = 0,
    /// 6 January.
    Epiphany = 1,
    /// Easter − 2.
    GoodFriday = 2,
    /// Easter Sunday.
    EasterSunday = 3,
    /// Easter + 1.
    EasterMonday = 4,
    /// 1 May.
    LabourDay = 5,
    /// Easter + 39.
    Ascension = 6,
    /// Easter + 50.
    WhitMonday = 7,
    /// Easter + 60.
    CorpusChristi = 8,
    /// 15 August.
    Assumption = 9,
    /// 3 October.
    UnityDay = 10,
    /// 31 October.
    ReformationDay = 11,
    /// 1 November.
    AllSaints = 12,
    /// Wednesday before 23 November.
    RepentanceDay = 13,
    /// 25 December.
    ChristmasDay = 14,
    /// 26 December.
    BoxingDay = 15,
}

impl HolidayKind for LawHoliday {
    const ALL: &'static [Self] = &[
        LawHoliday::NewYear,
        LawHoliday::Epiphany,
        LawHoliday::GoodFriday,
        LawHoliday::EasterSunday,
        LawHoliday::EasterMonday,
        LawHoliday::LabourDay,
        LawHoliday::Ascension,
        LawHoliday::WhitMonday,
        LawHoliday::CorpusChristi,
        LawHoliday::Assumption,
        LawHoliday::UnityDay,
        LawHoliday::ReformationDay,
        LawHoliday::AllSaints,
        LawHoliday::RepentanceDay,
        LawHoliday::ChristmasDay,
        LawHoliday::BoxingDay,
    ];
    const MASK: u32 = 0xFFFF;
    const DEFAULT: u32 = DEFAULT_LAW_HOLIDAYS;

    fn bit_index(self) -> u32 {
        self as u32
    }

    fn rule(self) -> Rule {
        use LawHoliday::*;
        match self {
            NewYear => Rule::Fixed { month: 1, day: 1 },
            Epiphany => Rule::Fixed { month: 1, day: 6 },
            GoodFriday => Rule::Easter(-2),
            EasterSunday => Rule::Easter(0),
            EasterMonday => Rule::Easter(1),
            LabourDay => Rule::Fixed { month: 5, day: 1 },
            Ascension => Rule::Easter(39),
            WhitMonday => Rule::Easter(50),
            CorpusChristi => Rule::Easter(60),
            Assumption => Rule::Fixed { month: 8, day: 15 },
            UnityDay => Rule::Fixed { month: 10, day: 3 },
            ReformationDay => Rule::Fixed { month: 10, day: 31 },
            AllSaints => Rule::Fixed { month: 11, day: 1 },
            // Dead Sunday − 4
            RepentanceDay => Rule::Advent(-11),
            ChristmasDay => Rule::Fixed { month: 12, day: 25 },
            BoxingDay => Rule::Fixed { month: 12, day: 26 },
        }
    }

    fn holiday(self) -> Holiday {
        Holiday::Law(self)
    }
}

// ── Special days ──────────────────────────────────────────────────────────────

/// Observances without statutory status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum SpecialDay {
    /// 14 February.
    ValentinesDay = 0,
    /// Easter − 48.
    RoseMonday = 1,
    /// Easter − 47.
    ShroveTuesday = 2,
    /// Easter − 46.
    AshWednesday = 3,
    /// Easter − 7.
    PalmSunday = 4,
    /// Easter − 3.
    MaundyThursday = 5,
    /// Easter − 1.
    HolySaturday = 6,
    /// Last Sunday of March.
    SummerTime = 7,
    /// Second Sunday of May.
    MothersDay = 8,
    /// Easter + 49.
    WhitSunday = 9,
    /// First Sunday of October.
    HarvestFestival = 10,
    /// Last Sunday of October.
    WinterTime = 11,
    /// 31 October.
    Halloween = 12,
    /// 11 November.
    StMartin = 13,
    /// Two weeks before First Advent.
    MemorialSunday = 14,
    /// One week before First Advent.
    DeadSunday = 15,
    /// Fourth Sunday before Christmas Day.
    FirstAdvent = 16,
    /// 24 December.
    ChristmasEve = 17,
    /// 31 December.
    NewYearsEve = 18,
}

impl HolidayKind for SpecialDay {
    const ALL: &'static [Self] = &[
        SpecialDay::ValentinesDay,
        SpecialDay::RoseMonday,
        SpecialDay::ShroveTuesday,
        SpecialDay::AshWednesday,
        SpecialDay::PalmSunday,
        SpecialDay::MaundyThursday,
        SpecialDay::HolySaturday,
        SpecialDay::SummerTime,
        SpecialDay::MothersDay,
        SpecialDay::WhitSunday,
        SpecialDay::HarvestFestival,
        SpecialDay::WinterTime,
        SpecialDay::Halloween,
        SpecialDay::StMartin,
        SpecialDay::MemorialSunday,
        SpecialDay::DeadSunday,
        SpecialDay::FirstAdvent,
        SpecialDay::ChristmasEve,
        SpecialDay::NewYearsEve,
    ];
    const MASK: u32 = 0x7_FFFF;
    const DEFAULT: u32 = DEFAULT_SPECIAL_DAYS;

    fn bit_index(self) -> u32 {
        self as u32
    }

    fn rule(self) -> Rule {
        use SpecialDay::*;
        match self {
            ValentinesDay => Rule::Fixed { month: 2, day: 14 },
            RoseMonday => Rule::Easter(-48),
            ShroveTuesday => Rule::Easter(-47),
            AshWednesday => Rule::Easter(-46),
            PalmSunday => Rule::Easter(-7),
            MaundyThursday => Rule::Easter(-3),
            HolySaturday => Rule::Easter(-1),
            SummerTime => Rule::LastSunday { month: 3 },
            MothersDay => Rule::NthSunday { month: 5, n: 2 },
            WhitSunday => Rule::Easter(49),
            HarvestFestival => Rule::NthSunday { month: 10, n: 1 },
            WinterTime => Rule::LastSunday { month: 10 },
            Halloween => Rule::Fixed { month: 10, day: 31 },
            StMartin => Rule::Fixed { month: 11, day: 11 },
            MemorialSunday => Rule::Advent(-14),
            DeadSunday => Rule::Advent(-7),
            FirstAdvent => Rule::Advent(0),
            ChristmasEve => Rule::Fixed { month: 12, day: 24 },
            NewYearsEve => Rule::Fixed { month: 12, day: 31 },
        }
    }

    fn holiday(self) -> Holiday {
        Holiday::Special(self)
    }
}

// ── Namespace-spanning identifier ─────────────────────────────────────────────

/// Any holiday from either namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Holiday {
    /// A statutory holiday.
    Law(LawHoliday),
    /// A special day.
    Special(SpecialDay),
}

impl Holiday {
    /// Date rule of the wrapped identifier.
    pub fn rule(self) -> Rule {
        match self {
            Holiday::Law(h) => h.rule(),
            Holiday::Special(h) => h.rule(),
        }
    }

    /// Return `true` for statutory holidays.
    pub fn is_law(self) -> bool {
        matches!(self, Holiday::Law(_))
    }
}

impl From<LawHoliday> for Holiday {
    fn from(h: LawHoliday) -> Self {
        Holiday::Law(h)
    }
}

impl From<SpecialDay> for Holiday {
    fn from(h: SpecialDay) -> Self {
        Holiday::Special(h)
    }
}

// ── Selection ─────────────────────────────────────────────────────────────────

/// A set of enabled holidays from one namespace, backed by its bitmask.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selection<K> {
    bits: u32,
    _kind: PhantomData<K>,
}

impl<K: HolidayKind> Selection<K> {
    /// Interpret a persisted mask.  Undefined bits are dropped silently.
    pub fn from_bits(bits: u32) -> Self {
        Self {
            bits: bits & K::MASK,
            _kind: PhantomData,
        }
    }

    /// The empty selection.
    pub fn empty() -> Self {
        Self::from_bits(0)
    }

    /// Every identifier of the namespace.
    pub fn all() -> Self {
        Self::from_bits(K::MASK)
    }

    /// The mask to persist.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Return `true` if `kind` is enabled.
    pub fn contains(&self, kind: K) -> bool {
        self.bits & kind.bit() != 0
    }

    /// A copy with `kind` enabled.
    pub fn with(self, kind: K) -> Self {
        Self::from_bits(self.bits | kind.bit())
    }

    /// A copy with `kind` disabled.
    pub fn without(self, kind: K) -> Self {
        Self::from_bits(self.bits & !kind.bit())
    }

    /// Number of enabled identifiers.
    pub fn len(&self) -> u32 {
        count_bits(self.bits)
    }

    /// Return `true` if nothing is enabled.
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Enabled identifiers in bit order.
    pub fn iter(&self) -> impl Iterator<Item = K> + '_ {
        K::ALL.iter().copied().filter(move |k| self.contains(*k))
    }
}

impl<K: HolidayKind> Default for Selection<K> {
    fn default() -> Self {
        Self::from_bits(K::DEFAULT)
    }
}

impl<K: HolidayKind> FromIterator<K> for Selection<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl<K: HolidayKind> fmt::Debug for Selection<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Number of set bits in a holiday mask (0–32).
pub fn count_bits(code: u32) -> u32 {
    code.count_ones()
}
