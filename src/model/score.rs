use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use serde::{Serialize, Serializer};

/// Lowest valid criterion value (1.0 points).
pub const CRITERION_MIN: Tenths = Tenths(10);
/// Highest valid criterion value (10.0 points).
pub const CRITERION_MAX: Tenths = Tenths(100);

/// Fixed-point score in tenths of a point.
///
/// Judges score to one decimal, so every value and every sum is an exact
/// integer here. Totals never depend on summation order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tenths(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldIssue {
    Missing,
    Malformed,
    OutOfRange,
}

impl Tenths {
    pub const ZERO: Tenths = Tenths(0);

    pub fn points(self) -> f64 {
        self.0 as f64 / 10.0
    }

    /// Parses a non-negative decimal, accepting `,` as decimal separator and
    /// rounding to the nearest tenth.
    pub fn parse(raw: &str) -> Result<Self, FieldIssue> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(FieldIssue::Missing);
        }
        let normalized = trimmed.replace(',', ".");
        let value: f64 = normalized.parse().map_err(|_| FieldIssue::Malformed)?;
        if !value.is_finite() || value < 0.0 {
            return Err(FieldIssue::Malformed);
        }
        Ok(Tenths((value * 10.0).round() as u64))
    }

    /// Parses a judged criterion value; anything outside 1.0..=10.0 is rejected.
    pub fn parse_criterion(raw: &str) -> Result<Self, FieldIssue> {
        let value = Self::parse(raw)?;
        if value < CRITERION_MIN || value > CRITERION_MAX {
            return Err(FieldIssue::OutOfRange);
        }
        Ok(value)
    }
}

impl Add for Tenths {
    type Output = Tenths;

    fn add(self, rhs: Tenths) -> Tenths {
        Tenths(self.0 + rhs.0)
    }
}

impl Sum for Tenths {
    fn sum<I: Iterator<Item = Tenths>>(iter: I) -> Tenths {
        iter.fold(Tenths::ZERO, Add::add)
    }
}

impl fmt::Display for Tenths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / 10, self.0 % 10)
    }
}

impl Serialize for Tenths {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.points())
    }
}

/// One judge's scores for one entity in one round.
///
/// `values` is aligned with the criteria of the active scoring profile;
/// `None` marks a missing or malformed field and contributes zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRecord {
    pub entity_id: String,
    pub judge_id: String,
    pub round: u32,
    pub values: Vec<Option<Tenths>>,
}

impl ScoreRecord {
    pub fn value(&self, criterion: usize) -> Tenths {
        self.values
            .get(criterion)
            .copied()
            .flatten()
            .unwrap_or(Tenths::ZERO)
    }

    pub fn sum(&self) -> Tenths {
        self.values.iter().flatten().copied().sum()
    }

    /// Fields that contribute zero, counting criteria the record has no slot for.
    pub fn missing_fields(&self, n_criteria: usize) -> usize {
        (0..n_criteria)
            .filter(|&c| self.values.get(c).copied().flatten().is_none())
            .count()
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/score.rs"]
mod tests;
