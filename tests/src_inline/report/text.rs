use super::*;
use crate::model::entity::{Entity, PartitionKey};
use crate::model::result::{AggregatedResult, RankedEntry};
use crate::model::score::Tenths;

fn entry(id: &str, rank: usize, total: u64, tie: bool) -> RankedEntry {
    let mut result = AggregatedResult::empty(id, 4);
    result.total = Tenths(total);
    result.average = Tenths(total).points() / 4.0;
    result.n_records = 1;
    RankedEntry {
        rank,
        entity: Entity {
            id: id.to_string(),
            name: format!("Name {id}"),
            category: "U12".to_string(),
            size: None,
        },
        result,
        unresolved_tie: tie,
    }
}

fn result_set(entries: Vec<RankedEntry>) -> ResultSet {
    ResultSet {
        partitions: vec![Partition {
            key: PartitionKey {
                size: None,
                category: "U12".to_string(),
            },
            label: "U12".to_string(),
            entries,
        }],
    }
}

#[test]
fn test_report_sections_and_podium() {
    let set = result_set(vec![
        entry("a", 1, 360, false),
        entry("b", 2, 340, false),
        entry("c", 3, 330, false),
        entry("d", 4, 100, false),
    ]);
    let text = render_report_text(&set, &ScoringProfile::individuals_v1(), &InputAudit::default());
    assert!(text.contains("1. Scoring"));
    assert!(text.contains("Tie-break: rhythm"));
    assert!(text.contains("Aggregation: sum of rounds"));
    assert!(text.contains("Podium: 1. Name a (36.0); 2. Name b (34.0); 3. Name c (33.0)"));
    assert!(text.contains("Name d"));
    assert!(text.contains("No issues found."));
}

#[test]
fn test_report_marks_ties_and_audit() {
    let set = result_set(vec![entry("a", 1, 300, true), entry("b", 2, 300, true)]);
    let audit = InputAudit {
        malformed_fields: 2,
        orphan_records: 1,
        ..InputAudit::default()
    };
    let text = render_report_text(&set, &ScoringProfile::individuals_v1(), &audit);
    assert!(text.contains("* equal total and tie-break"));
    assert!(text.contains("Unresolved ties (ranked by list order): 2"));
    assert!(text.contains("Malformed criterion values: 2"));
    assert!(text.contains("Score rows for unknown entities: 1"));
    assert!(!text.contains("Duplicate entity ids"));
}

#[test]
fn test_report_empty_result_set() {
    let text = render_report_text(
        &ResultSet::default(),
        &ScoringProfile::groups_v1(),
        &InputAudit::default(),
    );
    assert!(text.contains("No entities to rank."));
}

#[test]
fn test_aggregation_label() {
    assert_eq!(aggregation_label(AggregationMode::BestRound), "best round");
}
