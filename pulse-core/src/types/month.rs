//! Calendar month key for history records (`YYYY-MM`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A calendar month. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Create a month key. Returns `None` when `month` is outside 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The month `n` months after this one.
    pub fn plus_months(&self, n: u32) -> Self {
        let zero_based = self.year as i64 * 12 + (self.month as i64 - 1) + n as i64;
        Self {
            year: zero_based.div_euclid(12) as i32,
            month: zero_based.rem_euclid(12) as u32 + 1,
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Error for a malformed month string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid month key '{0}' (expected YYYY-MM)")]
pub struct ParseMonthError(pub String);

impl FromStr for MonthKey {
    type Err = ParseMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let err = || ParseMonthError(s.to_string());
        let (year, month) = trimmed.split_once('-').ok_or_else(err)?;
        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return Err(err());
        }
        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        Self::new(year, month).ok_or_else(err)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
