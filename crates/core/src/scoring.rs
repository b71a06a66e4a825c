use serde::Serialize;
use std::collections::BTreeMap;

use crate::state::TimetableState;

/// Conflict totals recomputed from the grid alone, independent of the
/// counters a state carries.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub shortfall: u32,
    pub unlisted_day_meetings: u32,
    pub avoided_day_meetings: u32,
    pub avoided_interval_meetings: u32,
    pub shortfall_by_course: BTreeMap<String, u32>,
    pub load_by_teacher: BTreeMap<String, u32>,
}

impl ScoreBreakdown {
    pub fn compute(state: &TimetableState) -> Self {
        let info = state.info();
        let mut coverage = vec![0u32; info.courses().len()];
        let mut load = vec![0u32; info.teachers().len()];
        let mut out = Self::default();

        for (slot, occ) in state.placements() {
            coverage[occ.course] += info.capacity(slot.room);
            load[occ.teacher] += 1;
            out.unlisted_day_meetings += info.day_penalty(occ.teacher, slot.day);
            if info.avoids_day(occ.teacher, slot.day) {
                out.avoided_day_meetings += 1;
            }
            if info.avoids_interval(occ.teacher, slot.interval) {
                out.avoided_interval_meetings += 1;
            }
        }

        for (c, id) in info.courses().iter().enumerate() {
            let missing = info.required(c).saturating_sub(coverage[c]);
            out.shortfall += missing;
            if missing > 0 {
                out.shortfall_by_course.insert(id.to_string(), missing);
            }
        }
        for (t, id) in info.teachers().iter().enumerate() {
            if load[t] > 0 {
                out.load_by_teacher.insert(id.to_string(), load[t]);
            }
        }
        out
    }

    /// Same objective as [`TimetableState::conflict_count`].
    pub fn conflicts(&self) -> u32 {
        self.shortfall + self.unlisted_day_meetings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::Move;
    use crate::problem::Slot;
    use crate::testing::two_days;

    #[test]
    fn breakdown_matches_state_counters() {
        let s0 = TimetableState::initial(two_days());
        let s1 = s0.apply_move(Move::new(Slot { day: 1, interval: 0, room: 0 }, 0, 0));
        let s2 = s1.apply_move(Move::new(Slot { day: 0, interval: 0, room: 0 }, 1, 1));

        let b = ScoreBreakdown::compute(&s2);
        assert_eq!(b.shortfall, s2.hard_conflicts());
        assert_eq!(b.unlisted_day_meetings, s2.soft_conflicts());
        assert_eq!(b.conflicts(), s2.conflict_count());
        assert_eq!(s2.occupancy_penalty(), 0);
        assert_eq!(b.shortfall_by_course.get("Math"), Some(&30));
        assert_eq!(b.load_by_teacher.get("Ana"), Some(&1));
        assert_eq!(b.load_by_teacher.get("Bob"), Some(&1));
    }

    #[test]
    fn avoided_days_are_reported_but_not_scored() {
        // Bob avoids Mon.
        let s0 = TimetableState::initial(two_days());
        let s1 = s0.apply_move(Move::new(Slot { day: 0, interval: 0, room: 0 }, 1, 1));
        let b = ScoreBreakdown::compute(&s1);
        assert_eq!(b.avoided_day_meetings, 1);
        assert_eq!(b.unlisted_day_meetings, 1);
        assert_eq!(b.conflicts(), s1.conflict_count());
    }
}
