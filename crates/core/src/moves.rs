use rand::seq::SliceRandom;
use rand::Rng;

use crate::problem::Slot;
use crate::state::TimetableState;

/// Put `teacher` teaching `course` into the free `slot`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub slot: Slot,
    pub teacher: usize,
    pub course: usize,
}

impl Move {
    pub fn new(slot: Slot, teacher: usize, course: usize) -> Self {
        Self {
            slot,
            teacher,
            course,
        }
    }
}

/// Order in which under-covered courses are tried.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CourseOrder {
    /// Ascending requirement, ties in input order.
    #[default]
    ByRequirement,
    /// Ascending requirement, then shuffled on every call.
    Shuffled,
}

/// Enumerates the legal moves of a state.
///
/// For every course still below its requirement, every qualified teacher
/// with load left, every free slot in grid order. Equivalent successors
/// reached through different moves are not merged.
#[derive(Clone, Copy, Debug, Default)]
pub struct MoveGenerator {
    order: CourseOrder,
}

impl MoveGenerator {
    pub fn new(order: CourseOrder) -> Self {
        Self { order }
    }

    pub fn legal_moves<R: Rng + ?Sized>(&self, state: &TimetableState, rng: &mut R) -> Vec<Move> {
        let info = state.info();
        let mut courses: Vec<usize> = info
            .courses_by_requirement()
            .iter()
            .copied()
            .filter(|&c| state.is_under_covered(c))
            .collect();
        if courses.is_empty() {
            return Vec::new();
        }
        if self.order == CourseOrder::Shuffled {
            courses.shuffle(rng);
        }

        let free: Vec<Slot> = state.free_slots().collect();
        if free.is_empty() {
            return Vec::new();
        }

        let mut moves = Vec::new();
        for &course in &courses {
            for &teacher in info.qualified_teachers(course) {
                if !state.has_capacity(teacher) {
                    continue;
                }
                moves.extend(free.iter().map(|&slot| Move::new(slot, teacher, course)));
            }
        }
        moves
    }

    /// Every legal move applied to `state`, in generation order.
    pub fn successors<R: Rng + ?Sized>(
        &self,
        state: &TimetableState,
        rng: &mut R,
    ) -> Vec<TimetableState> {
        self.legal_moves(state, rng)
            .into_iter()
            .map(|mv| state.apply_move(mv))
            .collect()
    }

    /// One legal move drawn uniformly, or `None` when the state is stuck.
    pub fn random_move<R: Rng + ?Sized>(&self, state: &TimetableState, rng: &mut R) -> Option<Move> {
        self.legal_moves(state, rng).choose(rng).copied()
    }
}
