use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::model::score::Tenths;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("chlopf_input_test_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_inputs(dir: &Path) {
    fs::write(
        dir.join("entities.tsv"),
        "id\tname\tcategory\np1\tAnna\tU12\np2\tBeat\tU12\n",
    )
    .unwrap();
    fs::write(
        dir.join("scores.tsv"),
        "entity_id\tjudge_id\tround\twhip_strikes\trhythm\tstance\ttempo\n\
         p1\tj1\t1\t8\t9\t7\t8\n\
         p9\tj1\t1\t8\t9\t7\t8\n\
         p2\tj1\t1\t8\t8\t8\t8\n",
    )
    .unwrap();
}

#[test]
fn test_resolve_paths_from_dir() {
    let dir = make_temp_dir();
    write_inputs(&dir);
    let paths = resolve_input_paths(Some(&dir), None, None).unwrap();
    assert_eq!(paths.entities, dir.join("entities.tsv"));
    assert_eq!(paths.scores, dir.join("scores.tsv"));
}

#[test]
fn test_resolve_paths_explicit_wins() {
    let dir = make_temp_dir();
    write_inputs(&dir);
    let other = PathBuf::from("/elsewhere/groups.tsv");
    let paths = resolve_input_paths(Some(&dir), Some(&other), None).unwrap();
    assert_eq!(paths.entities, other);
    assert_eq!(paths.scores, dir.join("scores.tsv"));
}

#[test]
fn test_resolve_paths_missing() {
    let dir = make_temp_dir();
    assert!(matches!(
        resolve_input_paths(Some(&dir), None, None),
        Err(InputError::MissingInput(_))
    ));
    assert!(matches!(
        resolve_input_paths(None, None, None),
        Err(InputError::MissingInput(_))
    ));
}

#[test]
fn test_load_input_drops_orphans() {
    let dir = make_temp_dir();
    write_inputs(&dir);
    let paths = resolve_input_paths(Some(&dir), None, None).unwrap();
    let bundle = load_input(&paths, &ScoringProfile::individuals_v1()).unwrap();
    assert_eq!(bundle.entities.len(), 2);
    assert_eq!(bundle.records.len(), 2);
    assert_eq!(bundle.audit.records_read, 3);
    assert_eq!(bundle.audit.orphan_records, 1);
    assert_eq!(bundle.records[0].sum(), Tenths(320));
}

#[test]
fn test_drop_orphans_keeps_order() {
    let entities = vec![Entity {
        id: "a".to_string(),
        name: "A".to_string(),
        category: "c".to_string(),
        size: None,
    }];
    let record = |id: &str, judge: &str| ScoreRecord {
        entity_id: id.to_string(),
        judge_id: judge.to_string(),
        round: 1,
        values: vec![],
    };
    let mut audit = InputAudit::default();
    let kept = drop_orphans(
        &entities,
        vec![record("a", "j1"), record("x", "j1"), record("a", "j2")],
        &mut audit,
    );
    let judges: Vec<&str> = kept.iter().map(|r| r.judge_id.as_str()).collect();
    assert_eq!(judges, vec!["j1", "j2"]);
    assert_eq!(audit.orphan_records, 1);
}
