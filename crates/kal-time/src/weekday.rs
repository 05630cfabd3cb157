//! `Weekday`: day-of-week enum and week-order conversions.
//!
//! Calendar grids come in two flavours: weeks starting on Sunday and weeks
//! starting on Monday.  Both use 1-based indices, so the same weekday has a
//! different number in each; the helpers here translate between them.

/// Day of the week.
///
/// Variants are numbered 1–7 (Monday = 1, Sunday = 7), i.e. the
/// Monday-first index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Weekday {
    /// Monday (1).
    Monday = 1,
    /// Tuesday (2).
    Tuesday = 2,
    /// Wednesday (3).
    Wednesday = 3,
    /// Thursday (4).
    Thursday = 4,
    /// Friday (5).
    Friday = 5,
    /// Saturday (6).
    Saturday = 6,
    /// Sunday (7).
    Sunday = 7,
}

impl Weekday {
    /// All weekdays in Monday-first order.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Construct from the Monday-first index (1 = Monday … 7 = Sunday).
    ///
    /// Returns `None` if the value is out of range.
    pub fn from_ordinal(n: u8) -> Option<Self> {
        match n {
            1..=7 => Some(Self::ALL[n as usize - 1]),
            _ => None,
        }
    }

    /// Construct from the Sunday-first index (1 = Sunday … 7 = Saturday).
    pub fn from_sunday_first(n: u8) -> Option<Self> {
        match n {
            1..=7 => Self::from_ordinal(sunday_to_monday_first(n)),
            _ => None,
        }
    }

    /// Return the Monday-first index (1 = Monday … 7 = Sunday).
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    /// Return the Sunday-first index (1 = Sunday … 7 = Saturday).
    pub fn sunday_first(&self) -> u8 {
        monday_to_sunday_first(self.ordinal())
    }

    /// Zero-based grid column of this weekday in a week starting on
    /// `week_start`.
    pub fn column(&self, week_start: Weekday) -> u8 {
        (self.ordinal() + 7 - week_start.ordinal()) % 7
    }

    /// The weekday `n` days after this one (negative `n` goes back).
    pub fn shifted(&self, n: i64) -> Weekday {
        let idx = (self.ordinal() as i64 - 1 + n).rem_euclid(7);
        Self::ALL[idx as usize]
    }

    /// Return `true` if this is Saturday or Sunday.
    pub fn is_weekend(&self) -> bool {
        matches!(self, Weekday::Saturday | Weekday::Sunday)
    }
}

/// Convert a Sunday-first index (1 = Sunday) to a Monday-first index
/// (1 = Monday).
///
/// Values outside 1..=7 are reduced modulo 7 first.
pub fn sunday_to_monday_first(index: u8) -> u8 {
    (index as u16 + 5) as u8 % 7 + 1
}

/// Convert a Monday-first index (1 = Monday) to a Sunday-first index
/// (1 = Sunday).  Exact inverse of [`sunday_to_monday_first`].
pub fn monday_to_sunday_first(index: u8) -> u8 {
    index % 7 + 1
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        };
        write!(f, "{name}")
    }
}
