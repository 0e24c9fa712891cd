use std::io::Cursor;

use super::*;
use crate::input::tsv::parse_tsv;

const HEADER: &str = "entity_id\tjudge_id\tround\twhip_strikes\trhythm\tstance\ttempo\n";

fn table(rows: &str) -> TsvTable {
    parse_tsv(Cursor::new(format!("{HEADER}{rows}")), "scores").unwrap()
}

#[test]
fn test_parse_valid_rows() {
    let t = table("p1\tj1\t1\t8\t9.5\t7,5\t8\np1\tj2\t2\t10\t1\t6\t6\n");
    let profile = ScoringProfile::individuals_v1();
    let mut audit = InputAudit::default();
    let records = parse_scores(&t, &profile, "scores", &mut audit).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].round, 1);
    assert_eq!(records[1].round, 2);
    assert_eq!(
        records[0].values,
        vec![Some(Tenths(80)), Some(Tenths(95)), Some(Tenths(75)), Some(Tenths(80))]
    );
    assert_eq!(audit.records_read, 2);
    assert!(!audit.has_issues());
}

#[test]
fn test_bad_fields_become_zero_contributions() {
    let t = table("p1\tj1\t1\t8\tabc\t11\t\n");
    let profile = ScoringProfile::individuals_v1();
    let mut audit = InputAudit::default();
    let records = parse_scores(&t, &profile, "scores", &mut audit).unwrap();
    assert_eq!(records[0].values, vec![Some(Tenths(80)), None, None, None]);
    assert_eq!(records[0].sum(), Tenths(80));
    assert_eq!(audit.malformed_fields, 1);
    assert_eq!(audit.out_of_range_fields, 1);
    assert_eq!(audit.missing_fields, 1);
}

#[test]
fn test_short_row_counts_missing_fields() {
    let t = table("p1\tj1\t1\t8\n");
    let profile = ScoringProfile::individuals_v1();
    let mut audit = InputAudit::default();
    let records = parse_scores(&t, &profile, "scores", &mut audit).unwrap();
    assert_eq!(records[0].values.len(), 4);
    assert_eq!(audit.missing_fields, 3);
}

#[test]
fn test_round_handling() {
    let t = table("p1\tj1\t\t8\t8\t8\t8\np1\tj2\tx\t8\t8\t8\t8\np1\tj3\t3\t8\t8\t8\t8\n");
    let profile = ScoringProfile::individuals_v1();
    let mut audit = InputAudit::default();
    let records = parse_scores(&t, &profile, "scores", &mut audit).unwrap();
    let rounds: Vec<u32> = records.iter().map(|r| r.round).collect();
    assert_eq!(rounds, vec![1, 1, 3]);
    assert_eq!(audit.malformed_rounds, 1);
    assert_eq!(audit.rounds_out_of_range, 1);
}

#[test]
fn test_round_column_optional() {
    let text = "entity_id\tjudge_id\twhip_strikes\trhythm\tstance\ttempo\ng1\tj1\t8\t8\t8\t8\n";
    let t = parse_tsv(Cursor::new(text), "scores").unwrap();
    let profile = ScoringProfile::groups_v1();
    let mut audit = InputAudit::default();
    let records = parse_scores(&t, &profile, "scores", &mut audit).unwrap();
    assert_eq!(records[0].round, 1);
}

#[test]
fn test_duplicates_are_kept_and_counted() {
    let t = table("p1\tj1\t1\t8\t8\t8\t8\np1\tj1\t1\t9\t9\t9\t9\n\tj1\t1\t9\t9\t9\t9\n");
    let profile = ScoringProfile::individuals_v1();
    let mut audit = InputAudit::default();
    let records = parse_scores(&t, &profile, "scores", &mut audit).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(audit.duplicate_records, 1);
    assert_eq!(audit.records_skipped, 1);
}

#[test]
fn test_missing_criterion_column_is_error() {
    let text = "entity_id\tjudge_id\twhip_strikes\trhythm\np1\tj1\t8\t8\n";
    let t = parse_tsv(Cursor::new(text), "scores").unwrap();
    let profile = ScoringProfile::individuals_v1();
    let mut audit = InputAudit::default();
    let err = parse_scores(&t, &profile, "scores", &mut audit).unwrap_err();
    assert!(err.to_string().contains("stance"));
}
