mod input;
mod report;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use types::SearchKind;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Algorithm {
    /// Hill Climbing
    Hc,
    /// Monte Carlo Tree Search
    Mcts,
}

impl From<Algorithm> for SearchKind {
    fn from(a: Algorithm) -> Self {
        match a {
            Algorithm::Hc => SearchKind::HillClimbing,
            Algorithm::Mcts => SearchKind::Mcts,
        }
    }
}

/// Build a timetable with Hill Climbing or Monte Carlo Tree Search.
#[derive(Debug, Parser)]
#[command(name = "timetable", version)]
struct Args {
    algorithm: Algorithm,
    /// Problem file (.yaml/.yml or .json), either a bare problem or
    /// `{problem, params}`.
    input: PathBuf,
    /// Write the rendered timetable here as well.
    output: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    max_iters: Option<u32>,
    #[arg(long)]
    simulations: Option<u32>,
    #[arg(long)]
    exploration: Option<f64>,
    #[arg(long)]
    max_rollout_moves: Option<u32>,
    /// Print the search result as JSON instead of the timetable.
    #[arg(long)]
    json: bool,
    /// Emit logs as JSON lines.
    #[arg(long)]
    log_json: bool,
}

fn init_tracing(json: bool) {
    let registry = tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::from_default_env());
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json);

    let mut env = input::load(&args.input)?;
    let params = &mut env.params;
    params.algorithm = args.algorithm.into();
    if let Some(seed) = args.seed {
        params.seed = Some(seed);
    }
    if let Some(n) = args.max_iters {
        params.max_iters = n;
    }
    if let Some(n) = args.simulations {
        params.simulations = n;
    }
    if let Some(c) = args.exploration {
        params.exploration = c;
    }
    if let Some(n) = args.max_rollout_moves {
        params.max_rollout_moves = Some(n);
    }

    let (result, best) = solver_heur::solve(&env).context("search failed")?;
    tracing::info!(status = %result.status, conflicts = result.conflicts, "done");

    let text = if args.json {
        serde_json::to_string_pretty(&result)?
    } else {
        report::render(&result, best.as_ref())
    };
    println!("{text}");

    if let Some(path) = &args.output {
        std::fs::write(path, &text)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}
