use std::collections::HashSet;

use tracing::{debug, warn};

use crate::input::tsv::{TsvRow, TsvTable};
use crate::input::{InputAudit, InputError};
use crate::model::profile::ScoringProfile;
use crate::model::score::{FieldIssue, ScoreRecord, Tenths};

struct ScoreColumns {
    entity: usize,
    judge: usize,
    round: Option<usize>,
    criteria: Vec<usize>,
}

/// Reads score records. Criterion cells that are empty, unparsable or out of
/// range become `None` and are counted in `audit`; they never fail the load.
pub fn parse_scores(
    table: &TsvTable,
    profile: &ScoringProfile,
    source: &str,
    audit: &mut InputAudit,
) -> Result<Vec<ScoreRecord>, InputError> {
    let columns = resolve_columns(table, profile, source)?;

    let mut seen: HashSet<(String, String, u32)> = HashSet::new();
    let mut records = Vec::with_capacity(table.rows.len());

    for row in &table.rows {
        audit.records_read += 1;
        let entity_id = row.get(columns.entity);
        if entity_id.is_empty() {
            warn!(line = row.line_no, "score row has empty entity id; skipping");
            audit.records_skipped += 1;
            continue;
        }
        let judge_id = row.get(columns.judge).to_string();
        let round = parse_round(row, columns.round, profile.rounds, audit);

        let mut values = Vec::with_capacity(columns.criteria.len());
        for (criterion, &col) in profile.criteria.iter().zip(&columns.criteria) {
            values.push(parse_field(row, col, criterion, audit));
        }

        if !seen.insert((entity_id.to_string(), judge_id.clone(), round)) {
            warn!(
                line = row.line_no,
                entity_id,
                judge_id = %judge_id,
                round,
                "judge scored this entity twice in one round; both records count"
            );
            audit.duplicate_records += 1;
        }

        records.push(ScoreRecord {
            entity_id: entity_id.to_string(),
            judge_id,
            round,
            values,
        });
    }

    Ok(records)
}

fn resolve_columns(
    table: &TsvTable,
    profile: &ScoringProfile,
    source: &str,
) -> Result<ScoreColumns, InputError> {
    let entity = table.require_column(&["entity_id", "participant_id", "group_id"], source)?;
    let judge = table.require_column(&["judge_id", "judge"], source)?;
    let round = table.column(&["round"]);
    let mut criteria = Vec::with_capacity(profile.criteria.len());
    for name in &profile.criteria {
        criteria.push(table.require_column(&[name.as_str()], source)?);
    }
    Ok(ScoreColumns {
        entity,
        judge,
        round,
        criteria,
    })
}

fn parse_round(row: &TsvRow, col: Option<usize>, rounds: u32, audit: &mut InputAudit) -> u32 {
    let Some(col) = col else {
        return 1;
    };
    let raw = row.get(col);
    if raw.is_empty() {
        return 1;
    }
    match raw.parse::<u32>() {
        Ok(0) | Err(_) => {
            warn!(line = row.line_no, round = raw, "malformed round; counting as round 1");
            audit.malformed_rounds += 1;
            1
        }
        Ok(r) => {
            if r > rounds {
                warn!(
                    line = row.line_no,
                    round = r,
                    max_rounds = rounds,
                    "round exceeds profile round count; keeping record"
                );
                audit.rounds_out_of_range += 1;
            }
            r
        }
    }
}

fn parse_field(
    row: &TsvRow,
    col: usize,
    criterion: &str,
    audit: &mut InputAudit,
) -> Option<Tenths> {
    let raw = row.get(col);
    match Tenths::parse_criterion(raw) {
        Ok(value) => Some(value),
        Err(FieldIssue::Missing) => {
            debug!(line = row.line_no, criterion, "missing criterion value");
            audit.missing_fields += 1;
            None
        }
        Err(FieldIssue::Malformed) => {
            warn!(line = row.line_no, criterion, value = raw, "malformed criterion value; counting as 0");
            audit.malformed_fields += 1;
            None
        }
        Err(FieldIssue::OutOfRange) => {
            warn!(
                line = row.line_no,
                criterion,
                value = raw,
                "criterion value outside 1-10; counting as 0"
            );
            audit.out_of_range_fields += 1;
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/scores.rs"]
mod tests;
