// ==========================================
// Competition Scheduler - Entry Number
// ==========================================
// Competition-wide display identifier assigned after scheduling.
// Late entries inserted after numbering was locked carry a single
// lowercase suffix: "156a", "156b", ...
// ==========================================

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// First entry number handed out by the numbering pass
pub const ENTRY_NUMBER_START: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryNumber {
    pub number: u32,
    pub suffix: Option<char>,
}

impl EntryNumber {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            suffix: None,
        }
    }

    pub fn late(number: u32, suffix: char) -> Self {
        Self {
            number,
            suffix: Some(suffix),
        }
    }

    pub fn is_late(&self) -> bool {
        self.suffix.is_some()
    }
}

// "156" < "156a" < "156b" < "157"
impl Ord for EntryNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number
            .cmp(&other.number)
            .then_with(|| self.suffix.cmp(&other.suffix))
    }
}

impl PartialOrd for EntryNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for EntryNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.suffix {
            Some(s) => write!(f, "{}{}", self.number, s),
            None => write!(f, "{}", self.number),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid entry number: {0:?}")]
pub struct ParseEntryNumberError(pub String);

impl FromStr for EntryNumber {
    type Err = ParseEntryNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let err = || ParseEntryNumberError(s.to_string());

        let (digits, suffix) = match raw.chars().last() {
            Some(c) if c.is_ascii_lowercase() => (&raw[..raw.len() - 1], Some(c)),
            Some(_) => (raw, None),
            None => return Err(err()),
        };

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(err());
        }
        let number = digits.parse::<u32>().map_err(|_| err())?;

        Ok(Self { number, suffix })
    }
}
