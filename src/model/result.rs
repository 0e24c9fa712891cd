use serde::Serialize;

use crate::model::entity::{Entity, PartitionKey};
use crate::model::score::Tenths;

pub const PODIUM_SIZE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundTotal {
    pub round: u32,
    pub total: Tenths,
    pub tiebreak: Tenths,
    pub records: usize,
}

/// Aggregated scores of one entity, before ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedResult {
    pub entity_id: String,
    pub total: Tenths,
    /// `total` divided by the criterion slots of the counted records.
    pub average: f64,
    pub tiebreak: Tenths,
    pub criterion_sums: Vec<Tenths>,
    pub round_totals: Vec<RoundTotal>,
    /// Round that produced the total under best-round aggregation.
    pub counted_round: Option<u32>,
    /// Records behind `total`; fewer than `n_records` under best-round.
    pub counted_records: usize,
    /// Every record of the entity, across all rounds.
    pub n_records: usize,
    pub n_judges: usize,
    pub missing_fields: usize,
}

impl AggregatedResult {
    pub fn empty(entity_id: &str, n_criteria: usize) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            total: Tenths::ZERO,
            average: 0.0,
            tiebreak: Tenths::ZERO,
            criterion_sums: vec![Tenths::ZERO; n_criteria],
            round_totals: Vec::new(),
            counted_round: None,
            counted_records: 0,
            n_records: 0,
            n_judges: 0,
            missing_fields: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub rank: usize,
    pub entity: Entity,
    pub result: AggregatedResult,
    /// A neighbour has the same total and tie-break sum; the rank split is
    /// decided by directory order alone.
    pub unresolved_tie: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Partition {
    pub key: PartitionKey,
    pub label: String,
    pub entries: Vec<RankedEntry>,
}

impl Partition {
    pub fn podium(&self) -> &[RankedEntry] {
        &self.entries[..self.entries.len().min(PODIUM_SIZE)]
    }

    pub fn unresolved_ties(&self) -> usize {
        self.entries.iter().filter(|e| e.unresolved_tie).count()
    }
}

/// Ranked results, one partition per categorical key, in key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    pub partitions: Vec<Partition>,
}

impl ResultSet {
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    pub fn n_entities(&self) -> usize {
        self.partitions.iter().map(|p| p.entries.len()).sum()
    }

    pub fn n_scored(&self) -> usize {
        self.partitions
            .iter()
            .flat_map(|p| &p.entries)
            .filter(|e| e.result.n_records > 0)
            .count()
    }

    pub fn unresolved_ties(&self) -> usize {
        self.partitions.iter().map(Partition::unresolved_ties).sum()
    }
}
