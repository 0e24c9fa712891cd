use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

pub mod entities;
pub mod scores;
pub mod tsv;

use entities::parse_entities;
use scores::parse_scores;
use tsv::read_tsv;

use crate::model::entity::Entity;
use crate::model::profile::ScoringProfile;
use crate::model::score::ScoreRecord;

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing input: {0}")]
    MissingInput(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Counters for data problems that were tolerated rather than raised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InputAudit {
    pub entities_read: usize,
    pub entities_skipped: usize,
    pub duplicate_entities: usize,
    pub uncategorized_entities: usize,
    pub records_read: usize,
    pub records_skipped: usize,
    pub orphan_records: usize,
    pub duplicate_records: usize,
    pub missing_fields: usize,
    pub malformed_fields: usize,
    pub out_of_range_fields: usize,
    pub malformed_rounds: usize,
    pub rounds_out_of_range: usize,
}

impl InputAudit {
    pub fn has_issues(&self) -> bool {
        self.entities_skipped
            + self.duplicate_entities
            + self.uncategorized_entities
            + self.records_skipped
            + self.orphan_records
            + self.duplicate_records
            + self.missing_fields
            + self.malformed_fields
            + self.out_of_range_fields
            + self.malformed_rounds
            + self.rounds_out_of_range
            > 0
    }
}

#[derive(Debug, Clone)]
pub struct InputPaths {
    pub entities: PathBuf,
    pub scores: PathBuf,
}

#[derive(Debug, Clone)]
pub struct InputBundle {
    pub paths: InputPaths,
    pub entities: Vec<Entity>,
    pub records: Vec<ScoreRecord>,
    pub audit: InputAudit,
}

/// Resolves input files: explicit paths win, otherwise well-known names are
/// looked up in `input_dir`.
pub fn resolve_input_paths(
    input_dir: Option<&Path>,
    entities: Option<&Path>,
    scores: Option<&Path>,
) -> Result<InputPaths, InputError> {
    let entities = match (entities, input_dir) {
        (Some(path), _) => path.to_path_buf(),
        (None, Some(dir)) => find_entities_path(dir)?,
        (None, None) => {
            return Err(InputError::MissingInput(
                "provide --entities or --input".to_string(),
            ));
        }
    };
    let scores = match (scores, input_dir) {
        (Some(path), _) => path.to_path_buf(),
        (None, Some(dir)) => find_scores_path(dir)?,
        (None, None) => {
            return Err(InputError::MissingInput(
                "provide --scores or --input".to_string(),
            ));
        }
    };
    Ok(InputPaths { entities, scores })
}

pub fn load_input(paths: &InputPaths, profile: &ScoringProfile) -> Result<InputBundle, InputError> {
    info!(
        entities = %paths.entities.display(),
        scores = %paths.scores.display(),
        "loading tournament inputs"
    );

    let mut audit = InputAudit::default();

    let entity_table = read_tsv(&paths.entities)?;
    let entities = parse_entities(
        &entity_table,
        profile.kind,
        &paths.entities.display().to_string(),
        &mut audit,
    )?;

    let score_table = read_tsv(&paths.scores)?;
    let records = parse_scores(
        &score_table,
        profile,
        &paths.scores.display().to_string(),
        &mut audit,
    )?;

    let records = drop_orphans(&entities, records, &mut audit);

    info!(
        entities = entities.len(),
        records = records.len(),
        "inputs loaded"
    );

    Ok(InputBundle {
        paths: paths.clone(),
        entities,
        records,
        audit,
    })
}

/// Keeps only records whose entity is in the directory.
pub fn drop_orphans(
    entities: &[Entity],
    records: Vec<ScoreRecord>,
    audit: &mut InputAudit,
) -> Vec<ScoreRecord> {
    let known: HashSet<&str> = entities.iter().map(|e| e.id.as_str()).collect();
    let mut orphan_ids = BTreeSet::new();
    let mut kept = Vec::with_capacity(records.len());
    for record in records {
        if known.contains(record.entity_id.as_str()) {
            kept.push(record);
        } else {
            audit.orphan_records += 1;
            orphan_ids.insert(record.entity_id);
        }
    }
    for id in orphan_ids {
        warn!(entity_id = %id, "score records reference an entity missing from the directory; skipping");
    }
    kept
}

fn find_entities_path(input_dir: &Path) -> Result<PathBuf, InputError> {
    let candidates = [
        "entities.tsv",
        "entities.tsv.gz",
        "participants.tsv",
        "participants.tsv.gz",
        "groups.tsv",
        "groups.tsv.gz",
    ];
    find_first(input_dir, &candidates)
        .ok_or_else(|| InputError::MissingInput("missing entities.tsv(.gz)".to_string()))
}

fn find_scores_path(input_dir: &Path) -> Result<PathBuf, InputError> {
    let candidates = ["scores.tsv", "scores.tsv.gz"];
    find_first(input_dir, &candidates)
        .ok_or_else(|| InputError::MissingInput("missing scores.tsv(.gz)".to_string()))
}

fn find_first(input_dir: &Path, candidates: &[&str]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(|name| input_dir.join(name))
        .find(|path| path.exists())
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
