pub mod moves;
pub mod problem;
pub mod scoring;
pub mod state;

#[doc(hidden)]
pub mod testing;

use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use thiserror::Error;

pub use moves::{CourseOrder, Move, MoveGenerator};
pub use problem::{ProblemInfo, Slot, MAX_TEACHER_LOAD};
pub use scoring::ScoreBreakdown;
pub use state::{MoveError, Occupant, TimetableState};
pub use types::{Assignment, Problem, SearchEnvelope, SearchParams, SearchResult};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid problem: {0}")]
    Msg(String),
}

pub fn validate(problem: &Problem) -> Result<(), ValidationError> {
    let mut errors: Vec<String> = Vec::new();

    if problem.days.is_empty() {
        errors.push("days is empty".into());
    }
    if problem.intervals.is_empty() {
        errors.push("intervals is empty".into());
    }
    if problem.rooms.is_empty() {
        errors.push("rooms is empty".into());
    }

    fn chk_unique<I: ToString>(name: &str, ids: impl Iterator<Item = I>, errors: &mut Vec<String>) {
        use std::collections::HashSet;
        let mut seen = HashSet::new();
        for id in ids {
            let s = id.to_string();
            if !seen.insert(s.clone()) {
                errors.push(format!("duplicate {name} id: {s}"));
            }
        }
    }
    chk_unique("day", problem.days.iter(), &mut errors);
    chk_unique("interval", problem.intervals.iter(), &mut errors);
    chk_unique("room", problem.rooms.iter().map(|r| &r.id), &mut errors);
    chk_unique("teacher", problem.teachers.iter().map(|t| &t.id), &mut errors);
    chk_unique("course", problem.courses.iter().map(|c| &c.id), &mut errors);

    use std::collections::HashSet;
    let courses: HashSet<_> = problem.courses.iter().map(|c| &c.id).collect();
    let days: HashSet<_> = problem.days.iter().collect();
    let intervals: HashSet<_> = problem.intervals.iter().collect();

    for r in &problem.rooms {
        if r.capacity == 0 {
            errors.push(format!("room {} has capacity 0", r.id));
        }
    }
    for c in &problem.courses {
        if c.students == 0 {
            errors.push(format!("course {} requires 0 students", c.id));
        }
    }

    // Coverage, shortfall and soft penalty are all bounded by these two.
    let students: u64 = problem.courses.iter().map(|c| u64::from(c.students)).sum();
    let seats: u64 = problem
        .rooms
        .iter()
        .map(|r| u64::from(r.capacity))
        .sum::<u64>()
        .saturating_mul(problem.days.len() as u64)
        .saturating_mul(problem.intervals.len() as u64);
    if students.saturating_add(seats) > u64::from(u32::MAX) {
        errors.push(format!(
            "total students ({students}) plus total seats ({seats}) exceed {}",
            u32::MAX
        ));
    }

    for t in &problem.teachers {
        for c in &t.courses {
            if !courses.contains(c) {
                errors.push(format!("teacher {} teaches unknown course {}", t.id, c));
            }
        }
        let av = &t.availability;
        for d in av.days.iter().chain(&av.avoid_days) {
            if !days.contains(d) {
                errors.push(format!("teacher {} lists unknown day {}", t.id, d));
            }
        }
        for i in av.intervals.iter().chain(&av.avoid_intervals) {
            if !intervals.contains(i) {
                errors.push(format!("teacher {} lists unknown interval {}", t.id, i));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Msg(errors.join("; ")))
    }
}

/// Why a search stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The best successor did not improve on the best state so far.
    LocalOptimum,
    /// The iteration budget ran out.
    MaxIterations,
    /// The current state had no legal move left.
    NoMoves,
    /// All simulations ran.
    SimulationBudget,
    /// The tree root never got a child.
    NoSolution,
}

#[derive(Clone, Debug)]
pub struct SearchReport {
    pub best: Option<TimetableState>,
    pub termination: Termination,
    pub iterations: u32,
    pub states_generated: u64,
    pub stats: serde_json::Value,
}

/// A search strategy over [`TimetableState`]s.
pub trait Search {
    fn name(&self) -> &'static str;

    fn search(&self, initial: &TimetableState, rng: &mut ChaCha8Rng) -> SearchReport;
}

/// Seeded generator when `seed` is given, fresh entropy otherwise.
pub fn search_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}
