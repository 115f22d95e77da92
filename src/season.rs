//! Calendar seasons and the month-based classifier.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Meteorological season of the northern hemisphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    /// Maps a calendar date to its season. Only the month is considered.
    ///
    /// | Months      | Season |
    /// |-------------|--------|
    /// | 12, 1, 2    | winter |
    /// | 3, 4, 5     | spring |
    /// | 6, 7, 8     | summer |
    /// | 9, 10, 11   | autumn |
    pub fn of(date: NaiveDate) -> Self {
        Self::from_month(date.month())
    }

    /// Month is 1-based, as returned by [`Datelike::month`].
    pub fn from_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            _ => Season::Autumn,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
