mod input;
mod logging;
mod model;
mod pipeline;
mod report;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use tracing::{error, info};

use crate::input::{InputError, load_input, resolve_input_paths};
use crate::model::entity::EntityKind;
use crate::model::profile::{
    AggregationMode, ProfileError, ScoringProfile, load_profile, render_profile_json,
};
use crate::pipeline::stage2_partition::run_stage2;
use crate::pipeline::stage3_aggregate::run_stage3;
use crate::pipeline::stage4_rank::run_stage4;
use crate::pipeline::stage5_report::{ReportError, ReportMode, Stage5Input, write_reports};

#[derive(Debug, Parser)]
#[command(
    name = "chlopf-results",
    version,
    about = "Aggregate judge scores and rank Wettchlöpfen participants and groups"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rank entities from a score export and write reports.
    Run(RunArgs),
    /// Print or write a preset scoring profile.
    Profile(ProfileArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Directory holding entities.tsv and scores.tsv (optionally .gz).
    #[arg(long)]
    input: Option<PathBuf>,
    /// Entity directory; overrides discovery in --input.
    #[arg(long)]
    entities: Option<PathBuf>,
    /// Score records; overrides discovery in --input.
    #[arg(long)]
    scores: Option<PathBuf>,
    /// Output directory.
    #[arg(long)]
    out: PathBuf,
    /// Entity kind; selects the preset profile when --profile is absent.
    #[arg(long, value_enum)]
    kind: Option<KindArg>,
    /// Scoring profile JSON.
    #[arg(long)]
    profile: Option<PathBuf>,
    /// Override the profile's aggregation mode.
    #[arg(long, value_enum)]
    aggregation: Option<AggregationArg>,
    /// Layout of results.tsv.
    #[arg(long, value_enum, default_value_t = ModeArg::Entity)]
    mode: ModeArg,
}

#[derive(Debug, Args)]
struct ProfileArgs {
    #[arg(long, value_enum, default_value_t = KindArg::Individuals)]
    kind: KindArg,
    /// Write to this file instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KindArg {
    Individuals,
    Groups,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AggregationArg {
    SumOfRounds,
    BestRound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Entity,
    Partition,
}

impl From<KindArg> for EntityKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Individuals => EntityKind::Individual,
            KindArg::Groups => EntityKind::Group,
        }
    }
}

impl From<AggregationArg> for AggregationMode {
    fn from(value: AggregationArg) -> Self {
        match value {
            AggregationArg::SumOfRounds => AggregationMode::SumOfRounds,
            AggregationArg::BestRound => AggregationMode::BestRound,
        }
    }
}

impl From<ModeArg> for ReportMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Entity => ReportMode::Entity,
            ModeArg::Partition => ReportMode::Partition,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("profile is for {profile:?} entities but --kind selects {requested:?}")]
    KindMismatch {
        profile: EntityKind,
        requested: EntityKind,
    },
    #[error("failed to render profile: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
    if let Err(err) = run(cli.command) {
        error!("{err}");
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), RunError> {
    match command {
        Command::Run(args) => run_ranking(&args),
        Command::Profile(args) => write_profile(&args),
    }
}

fn run_ranking(args: &RunArgs) -> Result<(), RunError> {
    let profile = resolve_profile(args)?;
    info!(
        kind = ?profile.kind,
        criteria = profile.criteria.len(),
        tiebreak = %profile.tiebreak,
        aggregation = ?profile.aggregation,
        "scoring profile"
    );

    let paths = resolve_input_paths(
        args.input.as_deref(),
        args.entities.as_deref(),
        args.scores.as_deref(),
    )?;
    let bundle = load_input(&paths, &profile)?;

    let partitions = run_stage2(&bundle.entities, profile.kind);
    let aggregated = run_stage3(&partitions, &bundle.records, &profile);
    let results = run_stage4(aggregated);

    let stage5 = Stage5Input {
        results: &results,
        profile: &profile,
        audit: &bundle.audit,
        entities_path: bundle.paths.entities.display().to_string(),
        scores_path: bundle.paths.scores.display().to_string(),
        tool_name: env!("CARGO_PKG_NAME").to_string(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
    };
    write_reports(&stage5, &args.out, args.mode.into())?;

    Ok(())
}

fn resolve_profile(args: &RunArgs) -> Result<ScoringProfile, RunError> {
    let requested = args.kind.map(EntityKind::from);
    let mut profile = match &args.profile {
        Some(path) => {
            let profile = load_profile(path)?;
            if let Some(requested) = requested {
                if requested != profile.kind {
                    return Err(RunError::KindMismatch {
                        profile: profile.kind,
                        requested,
                    });
                }
            }
            profile
        }
        None => ScoringProfile::preset(requested.unwrap_or(EntityKind::Individual)),
    };
    if let Some(aggregation) = args.aggregation {
        profile.aggregation = aggregation.into();
    }
    Ok(profile)
}

fn write_profile(args: &ProfileArgs) -> Result<(), RunError> {
    let profile = ScoringProfile::preset(args.kind.into());
    let mut json = render_profile_json(&profile)?;
    json.push('\n');
    match &args.out {
        Some(path) => {
            std::fs::write(path, json)?;
            info!(path = %path.display(), "profile written");
        }
        None => print!("{json}"),
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
