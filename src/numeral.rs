//! Numeral Model - Range, Places, Decomposition
//!
//! Every public entry point range-checks before touching digits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const MIN_NUMERAL: i64 = 1;
pub const MAX_NUMERAL: i64 = 9999;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumeralError {
    #[error("Number must be between 1 and 9999, got {0}")]
    InvalidRange(i64),

    #[error("Not a whole number: {0:?}")]
    NotANumber(String),
}

/// Decimal place of a digit within a numeral
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Place {
    Thousands,
    Hundreds,
    Tens,
    Units,
}

impl Place {
    /// Overlay order, most significant first
    pub const ALL: [Place; 4] = [Place::Thousands, Place::Hundreds, Place::Tens, Place::Units];

    pub fn label(self) -> &'static str {
        match self {
            Place::Thousands => "Thousands",
            Place::Hundreds => "Hundreds",
            Place::Tens => "Tens",
            Place::Units => "Units",
        }
    }

    pub fn multiplier(self) -> u32 {
        match self {
            Place::Thousands => 1000,
            Place::Hundreds => 100,
            Place::Tens => 10,
            Place::Units => 1,
        }
    }

    /// Index into the `[thousands, hundreds, tens, units]` digit array
    pub fn index(self) -> usize {
        match self {
            Place::Thousands => 0,
            Place::Hundreds => 1,
            Place::Tens => 2,
            Place::Units => 3,
        }
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A number known to be renderable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u16")]
pub struct Numeral(u16);

impl Numeral {
    pub fn new(value: i64) -> Result<Self, NumeralError> {
        if !(MIN_NUMERAL..=MAX_NUMERAL).contains(&value) {
            return Err(NumeralError::InvalidRange(value));
        }
        Ok(Self(value as u16))
    }

    pub fn value(self) -> u16 {
        self.0
    }

    /// Digits as `[thousands, hundreds, tens, units]`
    pub fn digits(self) -> [u8; 4] {
        let n = self.0;
        [
            (n / 1000 % 10) as u8,
            (n / 100 % 10) as u8,
            (n / 10 % 10) as u8,
            (n % 10) as u8,
        ]
    }

    /// Nonzero digits paired with their place, in overlay order
    pub fn nonzero_places(self) -> impl Iterator<Item = (Place, u8)> {
        let digits = self.digits();
        Place::ALL
            .into_iter()
            .map(move |place| (place, digits[place.index()]))
            .filter(|(_, digit)| *digit != 0)
    }

    pub fn breakdown(self) -> Vec<BreakdownEntry> {
        self.nonzero_places()
            .map(|(place, digit)| BreakdownEntry {
                place,
                digit,
                value: digit as u32 * place.multiplier(),
            })
            .collect()
    }
}

impl TryFrom<i64> for Numeral {
    type Error = NumeralError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Numeral> for u16 {
    fn from(n: Numeral) -> u16 {
        n.0
    }
}

impl FromStr for Numeral {
    type Err = NumeralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: i64 = trimmed
            .parse()
            .map_err(|_| NumeralError::NotANumber(trimmed.to_string()))?;
        Self::new(value)
    }
}

impl fmt::Display for Numeral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One line of the "which components were used" listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub place: Place,
    pub digit: u8,
    pub value: u32,
}

impl BreakdownEntry {
    pub fn label(&self) -> &'static str {
        self.place.label()
    }
}

impl fmt::Display for BreakdownEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.place.label(), self.value)
    }
}

/// Zero-padded base-10 expansion: 207 -> [0, 2, 0, 7]
pub fn decompose(number: i64) -> Result<[u8; 4], NumeralError> {
    Ok(Numeral::new(number)?.digits())
}

/// Ordered (place, contributed value) pairs for display; zero digits are left out
pub fn breakdown(number: i64) -> Result<Vec<BreakdownEntry>, NumeralError> {
    Ok(Numeral::new(number)?.breakdown())
}
