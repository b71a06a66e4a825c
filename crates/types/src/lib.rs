use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Clone, Debug, Serialize, Deserialize, JsonSchema, Eq, PartialEq, Hash, PartialOrd, Ord,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}
id_newtype!(DayId);
id_newtype!(IntervalId);
id_newtype!(RoomId);
id_newtype!(TeacherId);
id_newtype!(CourseId);

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct Room {
    pub id: RoomId,
    pub capacity: u32,
}

/// Required number of students that must be seated for a course.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct Course {
    pub id: CourseId,
    pub students: u32,
}

/// Teacher availability as written in the problem file.
///
/// Only `days` takes part in scoring: a placement on a day the teacher
/// does not list costs one soft conflict. An empty `days` list means the
/// teacher stated no day preference at all.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct Availability {
    #[serde(default)]
    pub days: Vec<DayId>,
    #[serde(default)]
    pub avoid_days: Vec<DayId>,
    #[serde(default)]
    pub intervals: Vec<IntervalId>,
    #[serde(default)]
    pub avoid_intervals: Vec<IntervalId>,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct Teacher {
    pub id: TeacherId,
    #[serde(default)]
    pub courses: Vec<CourseId>,
    #[serde(default)]
    pub availability: Availability,
}

/// The grid is `days x intervals x rooms`; every room exists in every
/// interval of every day.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct Problem {
    pub days: Vec<DayId>,
    pub intervals: Vec<IntervalId>,
    pub rooms: Vec<Room>,
    pub teachers: Vec<Teacher>,
    pub courses: Vec<Course>,
}

impl Problem {
    pub fn slot_count(&self) -> usize {
        self.days.len() * self.intervals.len() * self.rooms.len()
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SearchKind {
    #[default]
    HillClimbing,
    Mcts,
}

fn default_max_iters() -> u32 {
    1000
}
fn default_simulations() -> u32 {
    1000
}
fn default_exploration() -> f64 {
    1.4
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchParams {
    #[serde(default)]
    pub algorithm: SearchKind,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_max_iters")]
    pub max_iters: u32,
    #[serde(default = "default_simulations")]
    pub simulations: u32,
    #[serde(default = "default_exploration")]
    pub exploration: f64,
    #[serde(default)]
    pub max_rollout_moves: Option<u32>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            algorithm: SearchKind::default(),
            seed: None,
            max_iters: default_max_iters(),
            simulations: default_simulations(),
            exploration: default_exploration(),
            max_rollout_moves: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchEnvelope {
    pub problem: Problem,
    #[serde(default)]
    pub params: SearchParams,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, Eq, PartialEq)]
pub struct Assignment {
    pub day: DayId,
    pub interval: IntervalId,
    pub room: RoomId,
    pub teacher: TeacherId,
    pub course: CourseId,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchResult {
    pub status: String,
    pub conflicts: u32,
    pub hard_conflicts: u32,
    pub soft_conflicts: u32,
    pub assignments: Vec<Assignment>,
    pub stats: serde_json::Value,
}
