pub mod hill_climbing;
pub mod mcts;

use sched_core::{
    search_rng, ProblemInfo, Search, SearchEnvelope, SearchParams, SearchReport, SearchResult,
    TimetableState, ValidationError,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use types::SearchKind;

pub use hill_climbing::{HillClimbOutcome, HillClimbing, HillClimbingConfig};
pub use mcts::{MctsConfig, MctsOutcome, MonteCarloTreeSearch, SearchTree};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Strategy selected by `params`.
pub fn searcher_for(params: &SearchParams) -> Box<dyn Search> {
    match params.algorithm {
        SearchKind::HillClimbing => Box::new(HillClimbing::new(HillClimbingConfig {
            max_iters: params.max_iters,
            ..Default::default()
        })),
        SearchKind::Mcts => Box::new(MonteCarloTreeSearch::new(MctsConfig {
            simulations: params.simulations,
            exploration: params.exploration,
            max_rollout_moves: params.max_rollout_moves,
        })),
    }
}

/// Validate, search from the empty timetable, and report the best state.
pub fn solve(env: &SearchEnvelope) -> Result<(SearchResult, Option<TimetableState>), SearchError> {
    let info = Arc::new(ProblemInfo::build(&env.problem)?);
    let initial = TimetableState::initial(info);
    let searcher = searcher_for(&env.params);

    info!(
        method = searcher.name(),
        slots = env.problem.slot_count(),
        courses = env.problem.courses.len(),
        teachers = env.problem.teachers.len(),
        seed = env.params.seed,
        initial_conflicts = initial.conflict_count(),
        "search started"
    );
    let mut rng = search_rng(env.params.seed);
    let report = searcher.search(&initial, &mut rng);
    Ok(to_result(report))
}

fn to_result(report: SearchReport) -> (SearchResult, Option<TimetableState>) {
    let mut stats = report.stats;
    stats["states_generated"] = serde_json::json!(report.states_generated);
    stats["termination"] = serde_json::json!(report.termination);

    let result = match &report.best {
        None => SearchResult {
            status: "no_solution".into(),
            conflicts: 0,
            hard_conflicts: 0,
            soft_conflicts: 0,
            assignments: vec![],
            stats,
        },
        Some(best) => SearchResult {
            status: if best.conflict_count() == 0 {
                "solved".into()
            } else {
                "partial".into()
            },
            conflicts: best.conflict_count(),
            hard_conflicts: best.hard_conflicts(),
            soft_conflicts: best.soft_conflicts(),
            assignments: best.assignments(),
            stats,
        },
    };
    (result, report.best)
}
