use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("chlopf_main_test_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn parse(args: &[&str]) -> Cli {
    let mut full = vec!["chlopf-results"];
    full.extend_from_slice(args);
    Cli::try_parse_from(full).unwrap()
}

fn run_args(cli: Cli) -> RunArgs {
    match cli.command {
        Command::Run(args) => args,
        other => panic!("expected run, got {other:?}"),
    }
}

fn write_inputs(dir: &Path) {
    fs::write(
        dir.join("entities.tsv"),
        "id\tname\tcategory\n\
         a\tAnna\tU12\n\
         b\tBeat\tU12\n\
         c\tChris\tU12\n\
         d\tDora\tU16\n",
    )
    .unwrap();
    fs::write(
        dir.join("scores.tsv"),
        "entity_id\tjudge_id\tround\twhip_strikes\trhythm\tstance\ttempo\n\
         a\tj1\t1\t10\t8\t9\t8\n\
         b\tj1\t1\t9\t9\t9\t8\n\
         d\tj1\t1\t5\t5\t5\t5\n\
         d\tj1\t2\t9\t9\t9\t9\n",
    )
    .unwrap();
}

#[test]
fn test_parse_run_defaults() {
    let args = run_args(parse(&["run", "--input", "data", "--out", "out"]));
    assert_eq!(args.input, Some(PathBuf::from("data")));
    assert_eq!(args.kind, None);
    assert_eq!(args.mode, ModeArg::Entity);
    assert_eq!(args.aggregation, None);
}

#[test]
fn test_parse_run_options() {
    let cli = parse(&[
        "run",
        "--entities",
        "e.tsv",
        "--scores",
        "s.tsv.gz",
        "--out",
        "out",
        "--kind",
        "groups",
        "--aggregation",
        "best-round",
        "--mode",
        "partition",
        "-vv",
    ]);
    assert_eq!(cli.verbose, 2);
    let args = run_args(cli);
    assert_eq!(args.kind, Some(KindArg::Groups));
    assert_eq!(args.aggregation, Some(AggregationArg::BestRound));
    assert_eq!(args.mode, ModeArg::Partition);
}

#[test]
fn test_parse_requires_out() {
    assert!(Cli::try_parse_from(["chlopf-results", "run", "--input", "data"]).is_err());
}

#[test]
fn test_resolve_profile_preset_and_override() {
    let args = run_args(parse(&[
        "run", "--out", "o", "--kind", "groups", "--aggregation", "best-round",
    ]));
    let profile = resolve_profile(&args).unwrap();
    assert_eq!(profile.kind, EntityKind::Group);
    assert_eq!(profile.aggregation, AggregationMode::BestRound);
}

#[test]
fn test_resolve_profile_kind_mismatch() {
    let dir = make_temp_dir();
    let path = dir.join("profile.json");
    fs::write(
        &path,
        render_profile_json(&ScoringProfile::individuals_v1()).unwrap(),
    )
    .unwrap();
    let args = run_args(parse(&[
        "run",
        "--out",
        "o",
        "--kind",
        "groups",
        "--profile",
        path.to_str().unwrap(),
    ]));
    assert!(matches!(
        resolve_profile(&args),
        Err(RunError::KindMismatch { .. })
    ));
}

#[test]
fn test_run_end_to_end() {
    let dir = make_temp_dir();
    write_inputs(&dir);
    let out = dir.join("out");
    let args = run_args(parse(&[
        "run",
        "--input",
        dir.to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
    ]));
    run_ranking(&args).unwrap();

    let text = fs::read_to_string(out.join("results.tsv")).unwrap();
    let ids: Vec<&str> = text
        .lines()
        .skip(1)
        .map(|l| l.split('\t').nth(2).unwrap())
        .collect();
    // a and b both total 35.0; b wins on rhythm. c has no scores.
    assert_eq!(ids, vec!["b", "a", "c", "d"]);
    assert!(text.lines().nth(4).unwrap().starts_with("U16\t1\td\tDora\t56.0"));
}

#[test]
fn test_run_best_round() {
    let dir = make_temp_dir();
    write_inputs(&dir);
    let out = dir.join("out");
    let args = run_args(parse(&[
        "run",
        "--input",
        dir.to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
        "--aggregation",
        "best-round",
    ]));
    run_ranking(&args).unwrap();
    let text = fs::read_to_string(out.join("results.tsv")).unwrap();
    assert!(text.lines().nth(4).unwrap().starts_with("U16\t1\td\tDora\t36.0"));
}

#[test]
fn test_write_profile_file() {
    let dir = make_temp_dir();
    let path = dir.join("groups.json");
    let cli = parse(&["profile", "--kind", "groups", "--out", path.to_str().unwrap()]);
    run(cli.command).unwrap();
    let profile = load_profile(&path).unwrap();
    assert_eq!(profile, ScoringProfile::groups_v1());
}
