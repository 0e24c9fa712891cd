use std::cmp::Ordering;

use tracing::{info, warn};

use crate::model::result::{Partition, RankedEntry, ResultSet};
use crate::model::score::Tenths;
use crate::pipeline::stage3_aggregate::AggregatedPartition;

#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub rank: usize,
    pub item: T,
    pub unresolved_tie: bool,
}

/// Sorts by total descending, then by tie-break sum descending, and numbers
/// the result 1..=N.
///
/// The sort is stable: items equal on both keys keep their input order and
/// still receive distinct consecutive ranks. Such items are marked with
/// `unresolved_tie`.
pub fn rank_by<T, F>(mut items: Vec<T>, key: F) -> Vec<Ranked<T>>
where
    F: Fn(&T) -> (Tenths, Tenths),
{
    items.sort_by(|a, b| compare_keys(key(a), key(b)));

    let keys: Vec<(Tenths, Tenths)> = items.iter().map(&key).collect();
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            let tied_prev = idx > 0 && keys[idx - 1] == keys[idx];
            let tied_next = idx + 1 < keys.len() && keys[idx + 1] == keys[idx];
            Ranked {
                rank: idx + 1,
                item,
                unresolved_tie: tied_prev || tied_next,
            }
        })
        .collect()
}

fn compare_keys(a: (Tenths, Tenths), b: (Tenths, Tenths)) -> Ordering {
    b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1))
}

/// Ranks each partition on its own and assembles the result set.
pub fn run_stage4(partitions: Vec<AggregatedPartition<'_>>) -> ResultSet {
    let mut out = Vec::with_capacity(partitions.len());

    for partition in partitions {
        if partition.members.is_empty() {
            continue;
        }
        let label = partition.key.to_string();
        let ranked = rank_by(partition.members, |(_, result)| {
            (result.total, result.tiebreak)
        });

        let entries: Vec<RankedEntry> = ranked
            .into_iter()
            .map(|r| {
                let (entity, result) = r.item;
                RankedEntry {
                    rank: r.rank,
                    entity: entity.clone(),
                    result,
                    unresolved_tie: r.unresolved_tie,
                }
            })
            .collect();

        let ties = entries.iter().filter(|e| e.unresolved_tie).count();
        if ties > 0 {
            warn!(
                partition = %label,
                entities = ties,
                "equal total and tie-break; ranks follow directory order"
            );
        }
        if let Some(winner) = entries.first() {
            info!(
                partition = %label,
                entities = entries.len(),
                winner = %winner.entity.name,
                total = %winner.result.total,
                "partition ranked"
            );
        }

        out.push(Partition {
            key: partition.key,
            label,
            entries,
        });
    }

    ResultSet { partitions: out }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_rank.rs"]
mod tests;
