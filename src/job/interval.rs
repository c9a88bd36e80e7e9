//! Schedule intervals of the form `<N><h|m|d>`

use crate::ConfigError;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Unit of a schedule interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalUnit {
    Minutes,
    Hours,
    Days,
}

impl IntervalUnit {
    fn seconds(self) -> u64 {
        match self {
            IntervalUnit::Minutes => 60,
            IntervalUnit::Hours => 60 * 60,
            IntervalUnit::Days => 24 * 60 * 60,
        }
    }

    fn suffix(self) -> char {
        match self {
            IntervalUnit::Minutes => 'm',
            IntervalUnit::Hours => 'h',
            IntervalUnit::Days => 'd',
        }
    }
}

/// A validated repeat interval such as `30m`, `2h` or `1d`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    value: u64,
    unit: IntervalUnit,
}

impl Interval {
    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn unit(&self) -> IntervalUnit {
        self.unit
    }

    /// Time between runs
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.value * self.unit.seconds())
    }
}

impl FromStr for Interval {
    type Err = ConfigError;

    /// Parses `<N><unit>`; the unit is case-insensitive and `N` must be a
    /// positive integer
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidInterval(input.to_string());

        let trimmed = input.trim();
        let unit_char = trimmed.chars().last().ok_or_else(invalid)?;
        let number = &trimmed[..trimmed.len() - unit_char.len_utf8()];

        let unit = match unit_char.to_ascii_lowercase() {
            'm' => IntervalUnit::Minutes,
            'h' => IntervalUnit::Hours,
            'd' => IntervalUnit::Days,
            _ => return Err(invalid()),
        };

        if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let value: u64 = number.parse().map_err(|_| invalid())?;
        if value == 0 || value.checked_mul(unit.seconds()).is_none() {
            return Err(invalid());
        }

        Ok(Interval { value, unit })
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}
