use sched_core::{ScoreBreakdown, Slot, TimetableState};
use std::fmt::Write;
use types::SearchResult;

pub fn render(result: &SearchResult, best: Option<&TimetableState>) -> String {
    let mut out = String::new();
    match best {
        Some(state) => render_grid(&mut out, state),
        None => out.push_str("No suitable timetable was found.\n"),
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "status: {}  conflicts: {} (hard {}, soft {})",
        result.status, result.conflicts, result.hard_conflicts, result.soft_conflicts
    );
    if let Some(state) = best {
        let b = ScoreBreakdown::compute(state);
        for (course, missing) in &b.shortfall_by_course {
            let _ = writeln!(out, "  {course}: {missing} students without a seat");
        }
        if b.avoided_day_meetings + b.avoided_interval_meetings > 0 {
            let _ = writeln!(
                out,
                "  on avoided days: {}, in avoided intervals: {}",
                b.avoided_day_meetings, b.avoided_interval_meetings
            );
        }
    }
    if let Some(stats) = result.stats.as_object() {
        for (k, v) in stats {
            let _ = writeln!(out, "{k}: {v}");
        }
    }
    out
}

fn render_grid(out: &mut String, state: &TimetableState) {
    let info = state.info();
    for (d, day) in info.days().iter().enumerate() {
        let _ = writeln!(out, "{day}");
        for (i, interval) in info.intervals().iter().enumerate() {
            let _ = writeln!(out, "  {interval}");
            for (r, room) in info.rooms().iter().enumerate() {
                let slot = Slot {
                    day: d,
                    interval: i,
                    room: r,
                };
                match state.occupant(slot) {
                    Some(o) => {
                        let _ = writeln!(
                            out,
                            "    {room}: {} ({})",
                            info.courses()[o.course],
                            info.teachers()[o.teacher]
                        );
                    }
                    None => {
                        let _ = writeln!(out, "    {room}: -");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sched_core::testing::single_slot;
    use sched_core::Move;

    fn result(status: &str, conflicts: u32) -> SearchResult {
        SearchResult {
            status: status.into(),
            conflicts,
            hard_conflicts: conflicts,
            soft_conflicts: 0,
            assignments: vec![],
            stats: serde_json::json!({"iterations": 1}),
        }
    }

    #[test]
    fn renders_occupied_and_free_slots() {
        let s0 = TimetableState::initial(single_slot(40));
        let text = render(&result("partial", 40), Some(&s0));
        assert!(text.contains("Mon\n  8-10\n    R1: -"));
        assert!(text.contains("Math: 40 students without a seat"));

        let slot = Slot { day: 0, interval: 0, room: 0 };
        let s1 = s0.apply_move(Move::new(slot, 0, 0));
        let text = render(&result("partial", 10), Some(&s1));
        assert!(text.contains("    R1: Math (Ana)"));
        assert!(text.contains("iterations: 1"));
    }

    #[test]
    fn reports_missing_solution() {
        let text = render(&result("no_solution", 0), None);
        assert!(text.starts_with("No suitable timetable was found."));
    }
}
