//! Small problem fixtures shared by unit and integration tests.

use std::sync::Arc;
use types::{Availability, Course, Problem, Room, Teacher};

use crate::problem::ProblemInfo;

/// A grid with no teachers and no courses.
pub fn problem(days: &[&str], intervals: &[&str], rooms: &[(&str, u32)]) -> Problem {
    Problem {
        days: days.iter().map(|&d| d.into()).collect(),
        intervals: intervals.iter().map(|&i| i.into()).collect(),
        rooms: rooms
            .iter()
            .map(|&(id, capacity)| Room { id: id.into(), capacity })
            .collect(),
        teachers: Vec::new(),
        courses: Vec::new(),
    }
}

pub fn teacher(id: &str, courses: &[&str], days: &[&str]) -> Teacher {
    Teacher {
        id: id.into(),
        courses: courses.iter().map(|&c| c.into()).collect(),
        availability: Availability {
            days: days.iter().map(|&d| d.into()).collect(),
            ..Default::default()
        },
    }
}

pub fn course(id: &str, students: u32) -> Course {
    Course { id: id.into(), students }
}

fn build(p: &Problem) -> Arc<ProblemInfo> {
    match ProblemInfo::build(p) {
        Ok(info) => Arc::new(info),
        Err(e) => panic!("fixture is invalid: {e}"),
    }
}

/// One day, one interval, room `R1` seating 30, teacher `Ana` for `Math`.
pub fn single_slot(math_students: u32) -> Arc<ProblemInfo> {
    let mut p = problem(&["Mon"], &["8-10"], &[("R1", 30)]);
    p.teachers = vec![teacher("Ana", &["Math"], &[])];
    p.courses = vec![course("Math", math_students)];
    build(&p)
}

/// `Mon`/`Tue`, one interval, room `R1` seating 30.
/// `Ana` teaches `Math` (60) and lists `Mon`; `Bob` teaches `Physics` (30)
/// and avoids `Mon`.
pub fn two_days() -> Arc<ProblemInfo> {
    let mut p = problem(&["Mon", "Tue"], &["8-10"], &[("R1", 30)]);
    let mut bob = teacher("Bob", &["Physics"], &[]);
    bob.availability.avoid_days = vec!["Mon".into()];
    p.teachers = vec![teacher("Ana", &["Math"], &["Mon"]), bob];
    p.courses = vec![course("Math", 60), course("Physics", 30)];
    build(&p)
}

/// One day, one interval, `rooms` rooms of 10 seats, `Ana` alone for a
/// `Math` course she can never fill.
pub fn wide_grid(rooms: usize) -> Arc<ProblemInfo> {
    let names: Vec<String> = (0..rooms).map(|i| format!("R{i}")).collect();
    let specs: Vec<(&str, u32)> = names.iter().map(|n| (n.as_str(), 10)).collect();
    let mut p = problem(&["Mon"], &["8-10"], &specs);
    p.teachers = vec![teacher("Ana", &["Math"], &[])];
    p.courses = vec![course("Math", 1000)];
    build(&p)
}

/// Three days, two intervals, three rooms, four teachers, four courses.
/// Small enough for exhaustive-ish searches in tests, big enough for the
/// soft penalty and the load limit to matter.
pub fn campus() -> Arc<ProblemInfo> {
    let mut p = problem(
        &["Mon", "Tue", "Wed"],
        &["8-10", "10-12"],
        &[("EC101", 40), ("EC102", 25), ("EG324", 60)],
    );
    p.teachers = vec![
        teacher("Ana", &["Math", "Physics"], &["Mon", "Tue"]),
        teacher("Bob", &["Physics"], &[]),
        teacher("Cleo", &["Chemistry", "Math"], &["Wed"]),
        teacher("Dan", &["Biology"], &["Tue"]),
    ];
    p.courses = vec![
        course("Math", 120),
        course("Physics", 60),
        course("Chemistry", 80),
        course("Biology", 40),
    ];
    build(&p)
}
