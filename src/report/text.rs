use crate::input::InputAudit;
use crate::model::profile::{AggregationMode, ScoringProfile};
use crate::model::result::{Partition, ResultSet};
use crate::report::format_average;

pub fn render_report_text(
    results: &ResultSet,
    profile: &ScoringProfile,
    audit: &InputAudit,
) -> String {
    let mut out = String::new();

    out.push_str("Wettchlöpfen Results Report\n");
    out.push_str("===========================\n\n");

    out.push_str("1. Scoring\n");
    out.push_str(&format!("Criteria: {}\n", profile.criteria.join(", ")));
    out.push_str(&format!("Tie-break: {}\n", profile.tiebreak));
    out.push_str(&format!("Rounds: {}\n", profile.rounds));
    out.push_str(&format!(
        "Aggregation: {}\n\n",
        aggregation_label(profile.aggregation)
    ));

    out.push_str("2. Rankings\n");
    if results.is_empty() {
        out.push_str("No entities to rank.\n\n");
    }
    for partition in &results.partitions {
        render_partition(&mut out, partition);
    }

    out.push_str("3. Data quality\n");
    if !audit.has_issues() && results.unresolved_ties() == 0 {
        out.push_str("No issues found.\n");
        return out;
    }
    push_count(&mut out, "Unresolved ties (ranked by list order)", results.unresolved_ties());
    push_count(&mut out, "Entity rows skipped (empty id)", audit.entities_skipped);
    push_count(&mut out, "Duplicate entity ids", audit.duplicate_entities);
    push_count(&mut out, "Entities without category", audit.uncategorized_entities);
    push_count(&mut out, "Score rows skipped (empty entity)", audit.records_skipped);
    push_count(&mut out, "Score rows for unknown entities", audit.orphan_records);
    push_count(&mut out, "Repeated judge scores", audit.duplicate_records);
    push_count(&mut out, "Missing criterion values", audit.missing_fields);
    push_count(&mut out, "Malformed criterion values", audit.malformed_fields);
    push_count(&mut out, "Criterion values outside 1-10", audit.out_of_range_fields);
    push_count(&mut out, "Malformed rounds", audit.malformed_rounds);
    push_count(&mut out, "Rounds beyond profile", audit.rounds_out_of_range);
    out.push_str("Missing, malformed and out-of-range values count as 0.\n");

    out
}

fn render_partition(out: &mut String, partition: &Partition) {
    out.push_str(&format!("\n{}\n", partition.label));
    out.push_str(&format!("{}\n", "-".repeat(partition.label.chars().count())));

    let podium = partition.podium();
    let names: Vec<String> = podium
        .iter()
        .map(|e| format!("{}. {} ({})", e.rank, e.entity.name, e.result.total))
        .collect();
    out.push_str(&format!("Podium: {}\n", names.join("; ")));

    let name_width = partition
        .entries
        .iter()
        .map(|e| e.entity.name.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);
    out.push_str(&format!(
        "{:>4}  {:<name_width$}  {:>7}  {:>7}  {:>7}\n",
        "Rank", "Name", "Total", "Average", "Tiebrk"
    ));
    for e in &partition.entries {
        let marker = if e.unresolved_tie { " *" } else { "" };
        out.push_str(&format!(
            "{:>4}  {:<name_width$}  {:>7}  {:>7}  {:>7}{}\n",
            e.rank,
            e.entity.name,
            e.result.total.to_string(),
            format_average(e.result.average),
            e.result.tiebreak.to_string(),
            marker
        ));
    }
    if partition.unresolved_ties() > 0 {
        out.push_str("* equal total and tie-break; order follows the entity list\n");
    }
    out.push('\n');
}

fn push_count(out: &mut String, label: &str, count: usize) {
    if count > 0 {
        out.push_str(&format!("{}: {}\n", label, count));
    }
}

pub fn aggregation_label(mode: AggregationMode) -> &'static str {
    match mode {
        AggregationMode::SumOfRounds => "sum of rounds",
        AggregationMode::BestRound => "best round",
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/text.rs"]
mod tests;
