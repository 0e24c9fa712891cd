pub mod json;
pub mod text;

use serde::Serialize;

use crate::input::InputAudit;
use crate::model::profile::ScoringProfile;
use crate::model::result::Partition;

#[derive(Debug, Clone, Serialize)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputMeta {
    pub entities: String,
    pub scores: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryTotals {
    pub partitions: usize,
    pub entities: usize,
    pub scored_entities: usize,
    pub unresolved_ties: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryData<'a> {
    pub tool: ToolMeta,
    pub input: InputMeta,
    pub profile: &'a ScoringProfile,
    pub audit: &'a InputAudit,
    pub totals: SummaryTotals,
    pub partitions: &'a [Partition],
}

#[derive(Debug, Clone)]
pub struct PartitionStats {
    pub label: String,
    pub n_entities: usize,
    pub n_scored: usize,
    pub total_median: f64,
    pub average_median: f64,
}

pub fn format_average(v: f64) -> String {
    format!("{:.3}", v)
}

pub fn quantile_indexed(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    let idx = ((n - 1) as f64 * p).ceil() as usize;
    sorted[idx]
}

pub fn median(values: &[f64]) -> f64 {
    quantile_indexed(values, 0.5)
}

pub fn partition_stats(partition: &Partition) -> PartitionStats {
    let totals: Vec<f64> = partition
        .entries
        .iter()
        .map(|e| e.result.total.points())
        .collect();
    let averages: Vec<f64> = partition.entries.iter().map(|e| e.result.average).collect();
    PartitionStats {
        label: partition.label.clone(),
        n_entities: partition.entries.len(),
        n_scored: partition
            .entries
            .iter()
            .filter(|e| e.result.n_records > 0)
            .count(),
        total_median: median(&totals),
        average_median: median(&averages),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
