mod trace;

use std::{path::PathBuf, process};

use anyhow::{bail, Context, Result};
use clap::Parser;
use strokeglyph::{
    pipeline::RecognitionOutcome, CompletionStatus, DispatchDecision, GestureConfig,
    GesturePipeline, InputEvent,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "stroke_replay")]
#[command(about = "Replays recorded pointer traces through the gesture pipeline")]
struct Cli {
    /// CSV trace with `stroke_trace,ms,kind,arg,x,y` rows.
    trace: PathBuf,
    /// File listing the expected recognized value of each stroke.
    #[arg(long)]
    expect: Option<PathBuf>,
    /// TOML overrides for the gesture config.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Also print the nearest templates of every stroke.
    #[arg(long, default_value_t = 0)]
    rank: usize,
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct ReplayRow {
    outcome: RecognitionOutcome,
    status: CompletionStatus,
}

fn main() {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(&cli) {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            GestureConfig::from_toml_str(&text)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => GestureConfig::default(),
    };
    let events = trace::parse_trace(&cli.trace)?;
    let mut pipeline = GesturePipeline::new(&config, Vec::new());
    let rows = replay(&mut pipeline, &events, config.capture.inactivity_timeout_ms, cli.rank)?;

    println!("result,session,reason,source,kind,value,confidence,action");
    for row in &rows {
        let result = &row.outcome.result;
        println!(
            "result,{},{:?},{:?},{},{},{:.3},{}",
            row.outcome.session,
            row.outcome.path.reason(),
            row.outcome.source,
            result.kind(),
            display_value(result.value()),
            result.confidence(),
            action_label(&row.status)
        );
    }

    if let Some(expect_path) = &cli.expect {
        let expected = trace::parse_expected(expect_path)?;
        let actual: Vec<&str> = rows
            .iter()
            .map(|row| display_value(row.outcome.result.value()))
            .collect();
        if actual != expected {
            eprintln!("expected values: {}", expected.join(","));
            eprintln!("actual values:   {}", actual.join(","));
            bail!("recognized value sequence mismatch");
        }
    }
    Ok(())
}

/// Feeds every event, then ticks past the inactivity deadline so a trace
/// that stops mid-stroke still seals its last session.
fn replay(
    pipeline: &mut GesturePipeline,
    events: &[InputEvent],
    inactivity_timeout_ms: u64,
    rank: usize,
) -> Result<Vec<ReplayRow>> {
    let mut rows = Vec::new();
    for event in events {
        pipeline
            .handle(*event)
            .with_context(|| format!("event at {} ms", event.t_ms()))?;
        drain(pipeline, rank, &mut rows);
    }

    if let Some(last_ms) = events.last().map(InputEvent::t_ms) {
        let tail_ms = last_ms.saturating_add(inactivity_timeout_ms);
        pipeline.tick(tail_ms).context("final tick")?;
        drain(pipeline, rank, &mut rows);
    }
    Ok(rows)
}

fn drain(pipeline: &mut GesturePipeline, rank: usize, rows: &mut Vec<ReplayRow>) {
    while let Some(outcome) = pipeline.try_next_outcome() {
        if rank > 0 {
            print_rank(pipeline, &outcome, rank);
        }
        let status = pipeline.complete(outcome.clone());
        rows.push(ReplayRow { outcome, status });
    }
}

fn print_rank(pipeline: &GesturePipeline, outcome: &RecognitionOutcome, rank: usize) {
    match pipeline.engine().rank(outcome.path.points(), rank) {
        Ok(candidates) => {
            for (position, candidate) in candidates.iter().enumerate() {
                println!(
                    "rank,{},{},{},{:.4},{:.3}",
                    outcome.session,
                    position + 1,
                    candidate.label,
                    candidate.distance,
                    candidate.confidence
                );
            }
        }
        Err(err) => println!("rank,{},-,skipped,{err},", outcome.session),
    }
}

fn display_value(value: &str) -> &str {
    if value.is_empty() {
        "unknown"
    } else {
        value
    }
}

fn action_label(status: &CompletionStatus) -> &str {
    match status {
        CompletionStatus::Stale => "stale",
        CompletionStatus::Applied(DispatchDecision::Scheduled { action })
        | CompletionStatus::Applied(DispatchDecision::Unbound { action })
        | CompletionStatus::Applied(DispatchDecision::QueueFull { action }) => action,
        CompletionStatus::Applied(_) => "-",
    }
}
