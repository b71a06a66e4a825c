use rand::Rng;
use rand_chacha::ChaCha8Rng;
use sched_core::{CourseOrder, MoveGenerator, Search, SearchReport, Termination, TimetableState};
use tracing::{debug, info};

#[derive(Clone, Copy, Debug)]
pub struct HillClimbingConfig {
    pub max_iters: u32,
    pub course_order: CourseOrder,
}

impl Default for HillClimbingConfig {
    fn default() -> Self {
        Self {
            max_iters: 1000,
            course_order: CourseOrder::Shuffled,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HillClimbOutcome {
    pub best: TimetableState,
    pub iterations: u32,
    pub states_generated: u64,
    pub termination: Termination,
}

/// Steepest descent on the conflict count.
///
/// Every iteration materializes all successors of the current state and
/// moves to the first one with the lowest count, but only if it strictly
/// beats the current state. No sideways moves, no restarts.
#[derive(Clone, Debug, Default)]
pub struct HillClimbing {
    config: HillClimbingConfig,
}

impl HillClimbing {
    pub fn new(config: HillClimbingConfig) -> Self {
        Self { config }
    }

    pub fn run<R: Rng + ?Sized>(&self, initial: &TimetableState, rng: &mut R) -> HillClimbOutcome {
        let gen = MoveGenerator::new(self.config.course_order);
        let mut current = initial.clone();
        let mut iterations = 0u32;
        let mut states_generated = 0u64;

        let termination = loop {
            if iterations >= self.config.max_iters {
                break Termination::MaxIterations;
            }
            let successors = gen.successors(&current, rng);
            if successors.is_empty() {
                break Termination::NoMoves;
            }
            iterations += 1;
            states_generated += successors.len() as u64;

            // min_by_key keeps the first of equal minima
            let Some(candidate) = successors.into_iter().min_by_key(|s| s.conflict_count()) else {
                break Termination::NoMoves;
            };
            if candidate.conflict_count() < current.conflict_count() {
                debug!(
                    iteration = iterations,
                    conflicts = candidate.conflict_count(),
                    "accepted"
                );
                current = candidate;
            } else {
                break Termination::LocalOptimum;
            }
        };

        info!(
            ?termination,
            iterations,
            states_generated,
            conflicts = current.conflict_count(),
            "hill climbing finished"
        );
        HillClimbOutcome {
            best: current,
            iterations,
            states_generated,
            termination,
        }
    }
}

impl Search for HillClimbing {
    fn name(&self) -> &'static str {
        "hill_climbing"
    }

    fn search(&self, initial: &TimetableState, rng: &mut ChaCha8Rng) -> SearchReport {
        let out = self.run(initial, rng);
        SearchReport {
            stats: serde_json::json!({
                "method": self.name(),
                "iterations": out.iterations,
                "states_generated": out.states_generated,
                "max_iters": self.config.max_iters,
                "termination": out.termination,
            }),
            best: Some(out.best),
            termination: out.termination,
            iterations: out.iterations,
            states_generated: out.states_generated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use sched_core::testing::{campus, single_slot, wide_grid};

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn single_slot_solved_in_one_iteration() {
        let s0 = TimetableState::initial(single_slot(30));
        let out = HillClimbing::default().run(&s0, &mut rng());
        assert_eq!(out.iterations, 1);
        assert_eq!(out.states_generated, 1);
        assert_eq!(out.best.conflict_count(), 0);
        assert!(out.best.is_terminal());
        assert_eq!(out.termination, Termination::NoMoves);
    }

    #[test]
    fn oversubscribed_course_keeps_its_shortfall() {
        let s0 = TimetableState::initial(single_slot(40));
        let out = HillClimbing::default().run(&s0, &mut rng());
        assert_eq!(out.best.conflict_count(), 10);
        assert!(matches!(
            out.termination,
            Termination::NoMoves | Termination::LocalOptimum
        ));
    }

    #[test]
    fn no_moves_returns_immediately() {
        let s0 = TimetableState::initial(single_slot(30));
        let solved = HillClimbing::default().run(&s0, &mut rng()).best;
        let out = HillClimbing::default().run(&solved, &mut rng());
        assert_eq!(out.iterations, 0);
        assert_eq!(out.states_generated, 0);
        assert_eq!(out.termination, Termination::NoMoves);
        assert_eq!(out.best.depth(), solved.depth());
    }

    #[test]
    fn respects_iteration_budget() {
        let s0 = TimetableState::initial(campus());
        let hc = HillClimbing::new(HillClimbingConfig {
            max_iters: 2,
            ..Default::default()
        });
        let out = hc.run(&s0, &mut rng());
        assert_eq!(out.iterations, 2);
        assert_eq!(out.termination, Termination::MaxIterations);
        assert_eq!(out.best.depth(), 2);
        assert!(out.best.conflict_count() < s0.conflict_count());
    }

    #[test]
    fn zero_budget_returns_initial() {
        let s0 = TimetableState::initial(campus());
        let hc = HillClimbing::new(HillClimbingConfig {
            max_iters: 0,
            ..Default::default()
        });
        let out = hc.run(&s0, &mut rng());
        assert_eq!(out.iterations, 0);
        assert_eq!(out.best.conflict_count(), s0.conflict_count());
        assert_eq!(out.termination, Termination::MaxIterations);
    }

    #[test]
    fn stops_when_load_limit_blocks_progress() {
        let s0 = TimetableState::initial(wide_grid(10));
        let out = HillClimbing::default().run(&s0, &mut rng());
        assert_eq!(out.iterations, sched_core::MAX_TEACHER_LOAD);
        assert_eq!(out.termination, Termination::NoMoves);
        assert_eq!(out.best.hard_conflicts(), 1000 - 70);
    }

    #[test]
    fn search_trait_reports_counters() {
        let s0 = TimetableState::initial(campus());
        let mut r = rng();
        let report = HillClimbing::default().search(&s0, &mut r);
        let best = report.best.expect("hill climbing always returns a state");
        assert!(best.conflict_count() <= s0.conflict_count());
        assert_eq!(report.stats["iterations"], report.iterations);
        assert_eq!(report.stats["method"], "hill_climbing");
    }
}
