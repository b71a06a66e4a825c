use std::collections::HashMap;
use types::{CourseId, DayId, IntervalId, Problem, RoomId, TeacherId};

use crate::{validate, ValidationError};

/// A teacher can hold at most this many slots per week.
pub const MAX_TEACHER_LOAD: u32 = 7;

/// Grid coordinates of one `(day, interval, room)` slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    pub day: usize,
    pub interval: usize,
    pub room: usize,
}

/// Immutable, index-based view of a [`Problem`].
///
/// Everything the search touches is addressed by position: teachers,
/// courses, days, intervals and rooms keep the order of the input file.
#[derive(Clone, Debug)]
pub struct ProblemInfo {
    days: Vec<DayId>,
    intervals: Vec<IntervalId>,
    rooms: Vec<RoomId>,
    capacities: Vec<u32>,
    teachers: Vec<TeacherId>,
    courses: Vec<CourseId>,
    required: Vec<u32>,
    // teacher x course
    qualified: Vec<Vec<bool>>,
    // teacher x day; None when the teacher states no availability at all
    listed_days: Vec<Option<Vec<bool>>>,
    avoid_days: Vec<Vec<bool>>,
    avoid_intervals: Vec<Vec<bool>>,
    qualified_teachers: Vec<Vec<usize>>,
    by_requirement: Vec<usize>,
}

impl ProblemInfo {
    pub fn build(problem: &Problem) -> Result<Self, ValidationError> {
        validate(problem)?;

        let day_idx: HashMap<&DayId, usize> =
            problem.days.iter().enumerate().map(|(i, d)| (d, i)).collect();
        let interval_idx: HashMap<&IntervalId, usize> = problem
            .intervals
            .iter()
            .enumerate()
            .map(|(i, x)| (x, i))
            .collect();
        let course_idx: HashMap<&CourseId, usize> = problem
            .courses
            .iter()
            .enumerate()
            .map(|(i, c)| (&c.id, i))
            .collect();

        let n_days = problem.days.len();
        let n_intervals = problem.intervals.len();
        let n_courses = problem.courses.len();

        let mut qualified = Vec::with_capacity(problem.teachers.len());
        let mut listed_days = Vec::with_capacity(problem.teachers.len());
        let mut avoid_days = Vec::with_capacity(problem.teachers.len());
        let mut avoid_intervals = Vec::with_capacity(problem.teachers.len());
        let mut qualified_teachers = vec![Vec::new(); n_courses];

        for (ti, t) in problem.teachers.iter().enumerate() {
            let mut row = vec![false; n_courses];
            for c in &t.courses {
                if let Some(&ci) = course_idx.get(c) {
                    if !row[ci] {
                        row[ci] = true;
                        qualified_teachers[ci].push(ti);
                    }
                }
            }
            qualified.push(row);

            let mark_days = |ids: &[DayId]| {
                let mut v = vec![false; n_days];
                for d in ids {
                    if let Some(&i) = day_idx.get(d) {
                        v[i] = true;
                    }
                }
                v
            };
            let av = &t.availability;
            let unconstrained = av.days.is_empty()
                && av.avoid_days.is_empty()
                && av.intervals.is_empty()
                && av.avoid_intervals.is_empty();
            listed_days.push(if unconstrained {
                None
            } else {
                Some(mark_days(&av.days))
            });
            avoid_days.push(mark_days(&av.avoid_days));

            let mut iv = vec![false; n_intervals];
            for x in &av.avoid_intervals {
                if let Some(&i) = interval_idx.get(x) {
                    iv[i] = true;
                }
            }
            avoid_intervals.push(iv);
        }

        for (ci, c) in problem.courses.iter().enumerate() {
            if qualified_teachers[ci].is_empty() {
                tracing::warn!(course = %c.id, "no teacher is qualified; course can never be covered");
            }
        }

        let required: Vec<u32> = problem.courses.iter().map(|c| c.students).collect();
        let mut by_requirement: Vec<usize> = (0..n_courses).collect();
        by_requirement.sort_by_key(|&ci| required[ci]);

        Ok(Self {
            days: problem.days.clone(),
            intervals: problem.intervals.clone(),
            rooms: problem.rooms.iter().map(|r| r.id.clone()).collect(),
            capacities: problem.rooms.iter().map(|r| r.capacity).collect(),
            teachers: problem.teachers.iter().map(|t| t.id.clone()).collect(),
            courses: problem.courses.iter().map(|c| c.id.clone()).collect(),
            required,
            qualified,
            listed_days,
            avoid_days,
            avoid_intervals,
            qualified_teachers,
            by_requirement,
        })
    }

    pub fn days(&self) -> &[DayId] {
        &self.days
    }

    pub fn intervals(&self) -> &[IntervalId] {
        &self.intervals
    }

    pub fn rooms(&self) -> &[RoomId] {
        &self.rooms
    }

    pub fn teachers(&self) -> &[TeacherId] {
        &self.teachers
    }

    pub fn courses(&self) -> &[CourseId] {
        &self.courses
    }

    pub fn slot_count(&self) -> usize {
        self.days.len() * self.intervals.len() * self.rooms.len()
    }

    /// Row-major position of `slot` in a flat grid.
    pub fn slot_index(&self, slot: Slot) -> usize {
        (slot.day * self.intervals.len() + slot.interval) * self.rooms.len() + slot.room
    }

    pub fn slot_at(&self, index: usize) -> Slot {
        let n_rooms = self.rooms.len();
        let n_intervals = self.intervals.len();
        Slot {
            day: index / (n_intervals * n_rooms),
            interval: (index / n_rooms) % n_intervals,
            room: index % n_rooms,
        }
    }

    pub fn contains(&self, slot: Slot) -> bool {
        slot.day < self.days.len()
            && slot.interval < self.intervals.len()
            && slot.room < self.rooms.len()
    }

    pub fn capacity(&self, room: usize) -> u32 {
        self.capacities[room]
    }

    pub fn required(&self, course: usize) -> u32 {
        self.required[course]
    }

    pub fn is_qualified(&self, teacher: usize, course: usize) -> bool {
        self.qualified[teacher][course]
    }

    pub fn qualified_teachers(&self, course: usize) -> &[usize] {
        &self.qualified_teachers[course]
    }

    /// Courses ordered by ascending requirement, ties in input order.
    pub fn courses_by_requirement(&self) -> &[usize] {
        &self.by_requirement
    }

    /// Soft penalty for teaching on `day`: one point when `day` is not among
    /// the teacher's listed days. A teacher with no availability entry of
    /// any kind is never penalized.
    pub fn day_penalty(&self, teacher: usize, day: usize) -> u32 {
        match &self.listed_days[teacher] {
            Some(days) if !days[day] => 1,
            _ => 0,
        }
    }

    pub fn avoids_day(&self, teacher: usize, day: usize) -> bool {
        self.avoid_days[teacher][day]
    }

    pub fn avoids_interval(&self, teacher: usize, interval: usize) -> bool {
        self.avoid_intervals[teacher][interval]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::problem;

    #[test]
    fn slot_index_roundtrips_through_grid() {
        let p = problem(&["Mon", "Tue"], &["8", "10", "12"], &[("R1", 20), ("R2", 30)]);
        let info = ProblemInfo::build(&p).unwrap();
        assert_eq!(info.slot_count(), 12);
        for i in 0..info.slot_count() {
            assert_eq!(info.slot_index(info.slot_at(i)), i);
        }
        let s = Slot { day: 1, interval: 2, room: 0 };
        assert_eq!(info.slot_index(s), (3 + 2) * 2);
    }

    #[test]
    fn courses_sorted_by_requirement_keep_input_order_on_ties() {
        let mut p = problem(&["Mon"], &["8"], &[("R1", 20)]);
        p.courses = vec![
            types::Course { id: "A".into(), students: 50 },
            types::Course { id: "B".into(), students: 10 },
            types::Course { id: "C".into(), students: 50 },
            types::Course { id: "D".into(), students: 5 },
        ];
        let info = ProblemInfo::build(&p).unwrap();
        assert_eq!(info.courses_by_requirement(), &[3, 1, 0, 2]);
    }

    #[test]
    fn day_penalty_exempts_only_unconstrained_teachers() {
        let mut p = problem(&["Mon", "Tue"], &["8"], &[("R1", 20)]);
        p.courses = vec![types::Course { id: "Math".into(), students: 20 }];
        p.teachers = vec![
            types::Teacher {
                id: "Ana".into(),
                courses: vec!["Math".into()],
                availability: types::Availability {
                    days: vec!["Mon".into()],
                    ..Default::default()
                },
            },
            types::Teacher {
                id: "Bob".into(),
                courses: vec!["Math".into()],
                availability: Default::default(),
            },
        ];
        let info = ProblemInfo::build(&p).unwrap();
        assert_eq!(info.day_penalty(0, 0), 0);
        assert_eq!(info.day_penalty(0, 1), 1);
        assert_eq!(info.day_penalty(1, 0), 0);
        assert_eq!(info.day_penalty(1, 1), 0);
        assert_eq!(info.qualified_teachers(0), &[0, 1]);
    }

    #[test]
    fn teacher_with_only_avoidances_pays_on_every_unlisted_day() {
        let mut p = problem(&["Mon", "Fri"], &["8-10", "10-12"], &[("R1", 20)]);
        p.courses = vec![types::Course { id: "Physics".into(), students: 20 }];
        p.teachers = vec![
            types::Teacher {
                id: "Carmen".into(),
                courses: vec!["Physics".into()],
                availability: types::Availability {
                    avoid_days: vec!["Fri".into()],
                    ..Default::default()
                },
            },
            types::Teacher {
                id: "Dan".into(),
                courses: vec!["Physics".into()],
                availability: types::Availability {
                    intervals: vec!["8-10".into()],
                    ..Default::default()
                },
            },
        ];
        let info = ProblemInfo::build(&p).unwrap();
        for t in 0..2 {
            assert_eq!(info.day_penalty(t, 0), 1);
            assert_eq!(info.day_penalty(t, 1), 1);
        }
    }
}
