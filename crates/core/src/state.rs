use std::sync::Arc;
use thiserror::Error;
use types::Assignment;

use crate::moves::Move;
use crate::problem::{ProblemInfo, Slot, MAX_TEACHER_LOAD};

/// Penalty for placing into a slot that already holds a class.
pub const OCCUPIED_SLOT_PENALTY: u32 = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Occupant {
    pub teacher: usize,
    pub course: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoveError {
    #[error("slot {0:?} is outside the grid")]
    OutOfGrid(Slot),
    #[error("unknown teacher index {0}")]
    UnknownTeacher(usize),
    #[error("unknown course index {0}")]
    UnknownCourse(usize),
    #[error("slot {day}/{interval}/{room} is already occupied")]
    SlotOccupied {
        day: String,
        interval: String,
        room: String,
    },
    #[error("teacher {teacher} is not qualified for {course}")]
    NotQualified { teacher: String, course: String },
    #[error("teacher {0} is at the weekly load limit")]
    TeacherAtCapacity(String),
}

/// A candidate timetable.
///
/// States are values: [`TimetableState::apply_move`] returns a new state
/// and leaves `self` untouched. The grid and the counters are flat,
/// index-addressed vectors, so deriving a child is a copy of a few small
/// arrays; the problem description itself is shared.
#[derive(Clone, Debug)]
pub struct TimetableState {
    info: Arc<ProblemInfo>,
    slots: Vec<Option<Occupant>>,
    teacher_load: Vec<u32>,
    course_coverage: Vec<u32>,
    shortfall: u32,
    soft_penalty: u32,
    occupancy_penalty: u32,
    depth: u32,
}

impl TimetableState {
    /// Empty grid, zero counters.
    pub fn initial(info: Arc<ProblemInfo>) -> Self {
        let slots = vec![None; info.slot_count()];
        let teacher_load = vec![0; info.teachers().len()];
        let course_coverage = vec![0; info.courses().len()];
        let mut state = Self {
            info,
            slots,
            teacher_load,
            course_coverage,
            shortfall: 0,
            soft_penalty: 0,
            occupancy_penalty: 0,
            depth: 0,
        };
        state.shortfall = state.compute_shortfall();
        state
    }

    pub fn info(&self) -> &Arc<ProblemInfo> {
        &self.info
    }

    /// Every course has at least its required number of seats.
    pub fn is_terminal(&self) -> bool {
        (0..self.course_coverage.len())
            .all(|c| self.course_coverage[c] >= self.info.required(c))
    }

    /// Hard shortfall plus accumulated soft penalty. Lower is better.
    pub fn conflict_count(&self) -> u32 {
        self.shortfall + self.soft_penalty
    }

    /// Sum over courses of the seats still missing.
    pub fn hard_conflicts(&self) -> u32 {
        self.shortfall
    }

    pub fn soft_conflicts(&self) -> u32 {
        self.soft_penalty
    }

    /// Accumulated occupied-slot penalty. Stays at zero for every state
    /// produced through [`TimetableState::apply_move`].
    pub fn occupancy_penalty(&self) -> u32 {
        self.occupancy_penalty
    }

    /// Number of moves applied since the initial state.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn occupant(&self, slot: Slot) -> Option<Occupant> {
        self.slots[self.info.slot_index(slot)]
    }

    pub fn is_free(&self, slot: Slot) -> bool {
        self.occupant(slot).is_none()
    }

    pub fn teacher_load(&self, teacher: usize) -> u32 {
        self.teacher_load[teacher]
    }

    pub fn course_coverage(&self, course: usize) -> u32 {
        self.course_coverage[course]
    }

    pub fn has_capacity(&self, teacher: usize) -> bool {
        self.teacher_load[teacher] < MAX_TEACHER_LOAD
    }

    pub fn is_under_covered(&self, course: usize) -> bool {
        self.course_coverage[course] < self.info.required(course)
    }

    /// Free slots in grid order (day, then interval, then room).
    pub fn free_slots(&self) -> impl Iterator<Item = Slot> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, o)| o.is_none())
            .map(|(i, _)| self.info.slot_at(i))
    }

    /// Occupied slots in grid order.
    pub fn placements(&self) -> impl Iterator<Item = (Slot, Occupant)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, o)| o.map(|occ| (self.info.slot_at(i), occ)))
    }

    pub fn assignments(&self) -> Vec<Assignment> {
        let info = &self.info;
        self.placements()
            .map(|(s, o)| Assignment {
                day: info.days()[s.day].clone(),
                interval: info.intervals()[s.interval].clone(),
                room: info.rooms()[s.room].clone(),
                teacher: info.teachers()[o.teacher].clone(),
                course: info.courses()[o.course].clone(),
            })
            .collect()
    }

    /// Soft penalty a placement of `teacher` on `slot` would add.
    pub fn soft_penalty_for(&self, slot: Slot, teacher: usize) -> u32 {
        self.info.day_penalty(teacher, slot.day)
    }

    /// Hard penalty of placing on `slot` as the grid stands now.
    pub fn occupied_penalty_for(&self, slot: Slot) -> u32 {
        if self.is_free(slot) {
            0
        } else {
            OCCUPIED_SLOT_PENALTY
        }
    }

    /// Place `mv` into a copy of this state.
    ///
    /// # Panics
    ///
    /// When the move breaks a precondition of [`TimetableState::try_apply_move`].
    /// Moves coming from [`crate::MoveGenerator`] never do.
    pub fn apply_move(&self, mv: Move) -> Self {
        match self.try_apply_move(mv) {
            Ok(next) => next,
            Err(e) => panic!("illegal move {mv:?}: {e}"),
        }
    }

    pub fn try_apply_move(&self, mv: Move) -> Result<Self, MoveError> {
        self.check_move(mv)?;

        let occupied = self.occupied_penalty_for(mv.slot);
        debug_assert_eq!(occupied, 0);
        let soft = self.soft_penalty_for(mv.slot, mv.teacher);

        let mut next = self.clone();
        let idx = self.info.slot_index(mv.slot);
        next.slots[idx] = Some(Occupant {
            teacher: mv.teacher,
            course: mv.course,
        });
        next.teacher_load[mv.teacher] += 1;
        next.course_coverage[mv.course] += self.info.capacity(mv.slot.room);
        next.shortfall = next.compute_shortfall();
        next.soft_penalty += soft;
        next.occupancy_penalty += occupied;
        next.depth += 1;
        Ok(next)
    }

    fn check_move(&self, mv: Move) -> Result<(), MoveError> {
        let info = &self.info;
        if !info.contains(mv.slot) {
            return Err(MoveError::OutOfGrid(mv.slot));
        }
        if mv.teacher >= info.teachers().len() {
            return Err(MoveError::UnknownTeacher(mv.teacher));
        }
        if mv.course >= info.courses().len() {
            return Err(MoveError::UnknownCourse(mv.course));
        }
        if !self.is_free(mv.slot) {
            return Err(MoveError::SlotOccupied {
                day: info.days()[mv.slot.day].to_string(),
                interval: info.intervals()[mv.slot.interval].to_string(),
                room: info.rooms()[mv.slot.room].to_string(),
            });
        }
        if !info.is_qualified(mv.teacher, mv.course) {
            return Err(MoveError::NotQualified {
                teacher: info.teachers()[mv.teacher].to_string(),
                course: info.courses()[mv.course].to_string(),
            });
        }
        if !self.has_capacity(mv.teacher) {
            return Err(MoveError::TeacherAtCapacity(
                info.teachers()[mv.teacher].to_string(),
            ));
        }
        Ok(())
    }

    fn compute_shortfall(&self) -> u32 {
        self.course_coverage
            .iter()
            .enumerate()
            .map(|(c, &covered)| self.info.required(c).saturating_sub(covered))
            .sum()
    }
}
