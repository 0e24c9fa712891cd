use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::entity::EntityKind;

/// How an entity's rounds are folded into one total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// Every record of every round counts.
    #[default]
    SumOfRounds,
    /// Only the entity's strongest round counts.
    BestRound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringProfile {
    pub kind: EntityKind,
    /// Criterion names in column order.
    pub criteria: Vec<String>,
    /// Criterion whose sum breaks ties between equal totals.
    pub tiebreak: String,
    pub rounds: u32,
    #[serde(default)]
    pub aggregation: AggregationMode,
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("failed to read profile {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse profile {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("profile lists no criteria")]
    NoCriteria,
    #[error("criterion `{0}` is listed more than once")]
    DuplicateCriterion(String),
    #[error("tie-break criterion `{0}` is not one of the profile criteria")]
    UnknownTiebreak(String),
    #[error("profile must allow at least one round")]
    NoRounds,
}

const DEFAULT_CRITERIA: [&str; 4] = ["whip_strikes", "rhythm", "stance", "tempo"];

impl ScoringProfile {
    pub fn individuals_v1() -> Self {
        Self {
            kind: EntityKind::Individual,
            criteria: DEFAULT_CRITERIA.iter().map(|c| c.to_string()).collect(),
            tiebreak: "rhythm".to_string(),
            rounds: 2,
            aggregation: AggregationMode::SumOfRounds,
        }
    }

    pub fn groups_v1() -> Self {
        let mut base = Self::individuals_v1();
        base.kind = EntityKind::Group;
        base.rounds = 1;
        base
    }

    pub fn preset(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Individual => Self::individuals_v1(),
            EntityKind::Group => Self::groups_v1(),
        }
    }

    pub fn criterion_index(&self, name: &str) -> Option<usize> {
        self.criteria
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    pub fn tiebreak_index(&self) -> Option<usize> {
        self.criterion_index(&self.tiebreak)
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.criteria.is_empty() {
            return Err(ProfileError::NoCriteria);
        }
        let mut seen = BTreeSet::new();
        for name in &self.criteria {
            if !seen.insert(name.to_ascii_lowercase()) {
                return Err(ProfileError::DuplicateCriterion(name.clone()));
            }
        }
        if self.tiebreak_index().is_none() {
            return Err(ProfileError::UnknownTiebreak(self.tiebreak.clone()));
        }
        if self.rounds == 0 {
            return Err(ProfileError::NoRounds);
        }
        Ok(())
    }
}

pub fn parse_profile(text: &str, path: &Path) -> Result<ScoringProfile, ProfileError> {
    let profile: ScoringProfile =
        serde_json::from_str(text).map_err(|source| ProfileError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    profile.validate()?;
    Ok(profile)
}

pub fn load_profile(path: &Path) -> Result<ScoringProfile, ProfileError> {
    let text = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_profile(&text, path)
}

pub fn render_profile_json(profile: &ScoringProfile) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(profile)
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/profile.rs"]
mod tests;
