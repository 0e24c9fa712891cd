use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::input::InputAudit;
use crate::model::profile::ScoringProfile;
use crate::model::result::ResultSet;
use crate::report::json::render_summary_json;
use crate::report::text::render_report_text;
use crate::report::{
    InputMeta, SummaryData, SummaryTotals, ToolMeta, format_average, partition_stats,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    /// One row per entity.
    Entity,
    /// One row per partition.
    Partition,
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize summary: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct Stage5Input<'a> {
    pub results: &'a ResultSet,
    pub profile: &'a ScoringProfile,
    pub audit: &'a InputAudit,
    pub entities_path: String,
    pub scores_path: String,
    pub tool_name: String,
    pub tool_version: String,
}

pub fn write_reports(
    input: &Stage5Input<'_>,
    out_dir: &Path,
    mode: ReportMode,
) -> Result<(), ReportError> {
    fs::create_dir_all(out_dir)?;

    let results_path = out_dir.join("results.tsv");
    match mode {
        ReportMode::Entity => write_entity_tsv(input, &results_path)?,
        ReportMode::Partition => write_partition_tsv(input, &results_path)?,
    }

    let summary_path = out_dir.join("summary.json");
    let summary = build_summary(input);
    write_text(&summary_path, &render_summary_json(&summary)?)?;

    let report_path = out_dir.join("report.txt");
    let report = render_report_text(input.results, input.profile, input.audit);
    write_text(&report_path, &report)?;

    let audit_path = out_dir.join("audit.tsv");
    write_audit_tsv(input, &audit_path)?;

    info!(out_dir = %out_dir.display(), "reports written");
    Ok(())
}

fn write_entity_tsv(input: &Stage5Input<'_>, path: &Path) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);

    let mut header = vec![
        "partition".to_string(),
        "rank".to_string(),
        "entity_id".to_string(),
        "name".to_string(),
        "total".to_string(),
        "average".to_string(),
        "tiebreak".to_string(),
        "judges".to_string(),
        "records".to_string(),
        "counted_round".to_string(),
    ];
    for criterion in &input.profile.criteria {
        header.push(format!("sum_{}", criterion));
    }
    header.push("unresolved_tie".to_string());
    writeln!(w, "{}", header.join("\t"))?;

    for partition in &input.results.partitions {
        for e in &partition.entries {
            let mut row = vec![
                tsv_field(&partition.label),
                e.rank.to_string(),
                tsv_field(&e.entity.id),
                tsv_field(&e.entity.name),
                e.result.total.to_string(),
                format_average(e.result.average),
                e.result.tiebreak.to_string(),
                e.result.n_judges.to_string(),
                e.result.n_records.to_string(),
                e.result
                    .counted_round
                    .map(|r| r.to_string())
                    .unwrap_or_default(),
            ];
            for sum in &e.result.criterion_sums {
                row.push(sum.to_string());
            }
            row.push(if e.unresolved_tie { "1" } else { "0" }.to_string());
            writeln!(w, "{}", row.join("\t"))?;
        }
    }

    w.flush()
}

fn write_partition_tsv(input: &Stage5Input<'_>, path: &Path) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    writeln!(
        w,
        "partition\tn_entities\tn_scored\twinner_id\twinner_name\twinner_total\ttotal_median\taverage_median\tunresolved_ties"
    )?;

    for partition in &input.results.partitions {
        let stats = partition_stats(partition);
        let (winner_id, winner_name, winner_total) = match partition.entries.first() {
            Some(e) => (
                tsv_field(&e.entity.id),
                tsv_field(&e.entity.name),
                e.result.total.to_string(),
            ),
            None => (String::new(), String::new(), String::new()),
        };
        let row = [
            tsv_field(&stats.label),
            stats.n_entities.to_string(),
            stats.n_scored.to_string(),
            winner_id,
            winner_name,
            winner_total,
            format!("{:.1}", stats.total_median),
            format_average(stats.average_median),
            partition.unresolved_ties().to_string(),
        ];
        writeln!(w, "{}", row.join("\t"))?;
    }

    w.flush()
}

fn write_audit_tsv(input: &Stage5Input<'_>, path: &Path) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    writeln!(
        w,
        "entity_id\tpartition\trecords\tjudges\tmissing_fields\trounds"
    )?;

    for partition in &input.results.partitions {
        let mut entries: Vec<_> = partition.entries.iter().collect();
        entries.sort_by(|a, b| a.entity.id.cmp(&b.entity.id));
        for e in entries {
            let rounds = e
                .result
                .round_totals
                .iter()
                .map(|r| format!("{}:{}", r.round, r.total))
                .collect::<Vec<_>>()
                .join(";");
            writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}\t{}",
                tsv_field(&e.entity.id),
                tsv_field(&partition.label),
                e.result.n_records,
                e.result.n_judges,
                e.result.missing_fields,
                rounds
            )?;
        }
    }

    w.flush()
}

fn build_summary<'a>(input: &Stage5Input<'a>) -> SummaryData<'a> {
    SummaryData {
        tool: ToolMeta {
            name: input.tool_name.clone(),
            version: input.tool_version.clone(),
        },
        input: InputMeta {
            entities: input.entities_path.clone(),
            scores: input.scores_path.clone(),
        },
        profile: input.profile,
        audit: input.audit,
        totals: SummaryTotals {
            partitions: input.results.partitions.len(),
            entities: input.results.n_entities(),
            scored_entities: input.results.n_scored(),
            unresolved_ties: input.results.unresolved_ties(),
        },
        partitions: &input.results.partitions,
    }
}

/// Tabs and newlines would break the row layout.
fn tsv_field(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}

fn write_text(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    w.write_all(contents.as_bytes())?;
    w.flush()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_report.rs"]
mod tests;
