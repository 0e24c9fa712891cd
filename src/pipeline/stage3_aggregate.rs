use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::model::entity::{Entity, PartitionKey};
use crate::model::profile::{AggregationMode, ScoringProfile};
use crate::model::result::{AggregatedResult, RoundTotal};
use crate::model::score::{ScoreRecord, Tenths};
use crate::pipeline::stage2_partition::EntityPartition;

#[derive(Debug, Clone)]
pub struct AggregatedPartition<'a> {
    pub key: PartitionKey,
    pub members: Vec<(&'a Entity, AggregatedResult)>,
}

/// Aggregates every partition member. Entities without records get an empty
/// aggregate and stay in the partition.
pub fn run_stage3<'a>(
    partitions: &[EntityPartition<'a>],
    records: &[ScoreRecord],
    profile: &ScoringProfile,
) -> Vec<AggregatedPartition<'a>> {
    let by_entity = index_records(records);
    let mut out = Vec::with_capacity(partitions.len());

    for partition in partitions {
        let mut members = Vec::with_capacity(partition.members.len());
        for &entity in &partition.members {
            let entity_records = by_entity
                .get(entity.id.as_str())
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let result = aggregate_entity(&entity.id, entity_records, profile);
            debug!(
                entity_id = %entity.id,
                total = %result.total,
                records = result.n_records,
                "entity aggregated"
            );
            members.push((entity, result));
        }
        out.push(AggregatedPartition {
            key: partition.key.clone(),
            members,
        });
    }

    out
}

pub fn index_records(records: &[ScoreRecord]) -> HashMap<&str, Vec<&ScoreRecord>> {
    let mut map: HashMap<&str, Vec<&ScoreRecord>> = HashMap::new();
    for record in records {
        map.entry(record.entity_id.as_str()).or_default().push(record);
    }
    map
}

/// Folds one entity's records into its aggregate.
///
/// The total is the plain sum of every criterion value of the counted
/// records; the average divides it by counted records x criteria. Missing
/// fields count as zero but still occupy a slot in the denominator. The
/// record, judge and missing-field counts always cover every round.
pub fn aggregate_entity(
    entity_id: &str,
    records: &[&ScoreRecord],
    profile: &ScoringProfile,
) -> AggregatedResult {
    let n_criteria = profile.criteria.len();
    let tiebreak = profile.tiebreak_index();
    let round_totals = round_totals(records, tiebreak);

    let mut missing_fields = 0usize;
    let mut judges = BTreeSet::new();
    for record in records {
        missing_fields += record.missing_fields(n_criteria);
        judges.insert(record.judge_id.as_str());
    }

    let (counted, counted_round): (Vec<&ScoreRecord>, Option<u32>) = match profile.aggregation {
        AggregationMode::SumOfRounds => (records.to_vec(), None),
        AggregationMode::BestRound => {
            if rounds_uneven(&round_totals) {
                warn!(
                    entity_id,
                    "rounds have different record counts; best round compares raw sums"
                );
            }
            match best_round(&round_totals) {
                Some(round) => (
                    records.iter().copied().filter(|r| r.round == round).collect(),
                    Some(round),
                ),
                None => (Vec::new(), None),
            }
        }
    };

    let mut criterion_sums = vec![Tenths::ZERO; n_criteria];
    for record in &counted {
        for (c, sum) in criterion_sums.iter_mut().enumerate() {
            *sum = *sum + record.value(c);
        }
    }

    let total: Tenths = criterion_sums.iter().copied().sum();
    let tiebreak_sum = tiebreak
        .map(|c| criterion_sums[c])
        .unwrap_or(Tenths::ZERO);
    let slots = counted.len() * n_criteria;
    let average = if slots == 0 {
        0.0
    } else {
        total.points() / slots as f64
    };

    AggregatedResult {
        entity_id: entity_id.to_string(),
        total,
        average,
        tiebreak: tiebreak_sum,
        criterion_sums,
        round_totals,
        counted_round,
        counted_records: counted.len(),
        n_records: records.len(),
        n_judges: judges.len(),
        missing_fields,
    }
}

fn round_totals(records: &[&ScoreRecord], tiebreak: Option<usize>) -> Vec<RoundTotal> {
    let mut map: BTreeMap<u32, RoundTotal> = BTreeMap::new();
    for record in records {
        let entry = map.entry(record.round).or_insert(RoundTotal {
            round: record.round,
            total: Tenths::ZERO,
            tiebreak: Tenths::ZERO,
            records: 0,
        });
        entry.total = entry.total + record.sum();
        if let Some(c) = tiebreak {
            entry.tiebreak = entry.tiebreak + record.value(c);
        }
        entry.records += 1;
    }
    map.into_values().collect()
}

/// True when the rounds were scored by different numbers of records, so the
/// raw round sums are not directly comparable.
pub fn rounds_uneven(rounds: &[RoundTotal]) -> bool {
    rounds.windows(2).any(|w| w[0].records != w[1].records)
}

/// Highest round total; equal totals go to the higher tie-break sum, then
/// to the earlier round.
fn best_round(rounds: &[RoundTotal]) -> Option<u32> {
    let mut best: Option<&RoundTotal> = None;
    for r in rounds {
        let better = match best {
            None => true,
            Some(b) => (r.total, r.tiebreak) > (b.total, b.tiebreak),
        };
        if better {
            best = Some(r);
        }
    }
    best.map(|r| r.round)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_aggregate.rs"]
mod tests;
