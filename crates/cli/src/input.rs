use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use types::{Problem, SearchEnvelope};

#[derive(Deserialize)]
#[serde(untagged)]
enum InputFile {
    Envelope(SearchEnvelope),
    Bare(Problem),
}

impl From<InputFile> for SearchEnvelope {
    fn from(f: InputFile) -> Self {
        match f {
            InputFile::Envelope(env) => env,
            InputFile::Bare(problem) => SearchEnvelope {
                problem,
                params: Default::default(),
            },
        }
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

pub fn parse(text: &str, yaml: bool) -> anyhow::Result<SearchEnvelope> {
    let file: InputFile = if yaml {
        serde_yaml::from_str(text).context("parsing YAML problem")?
    } else {
        serde_json::from_str(text).context("parsing JSON problem")?
    };
    Ok(file.into())
}

pub fn load(path: &Path) -> anyhow::Result<SearchEnvelope> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse(&text, is_yaml(path)).with_context(|| format!("in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::SearchKind;

    const YAML: &str = r#"
days: [Mon, Tue]
intervals: ["8-10", "10-12"]
rooms:
  - { id: EC101, capacity: 40 }
teachers:
  - id: Ana
    courses: [Math]
    availability:
      days: [Mon]
      avoid_intervals: ["8-10"]
courses:
  - { id: Math, students: 80 }
"#;

    #[test]
    fn bare_yaml_problem_gets_default_params() {
        let env = parse(YAML, true).unwrap();
        assert_eq!(env.problem.slot_count(), 4);
        assert_eq!(env.problem.teachers[0].availability.days.len(), 1);
        assert_eq!(env.params.max_iters, 1000);
    }

    #[test]
    fn json_envelope_keeps_params() {
        let json = r#"{
            "problem": {"days":["Mon"],"intervals":["8"],"rooms":[{"id":"R","capacity":5}],
                        "teachers":[],"courses":[]},
            "params": {"algorithm":"mcts","simulations":50}
        }"#;
        let env = parse(json, false).unwrap();
        assert_eq!(env.params.algorithm, SearchKind::Mcts);
        assert_eq!(env.params.simulations, 50);
    }

    #[test]
    fn demo_campus_is_valid_and_improves() {
        let mut env = parse(include_str!("../../../demos/campus.yaml"), true).unwrap();
        assert!(sched_core::validate(&env.problem).is_ok());
        assert_eq!(env.problem.slot_count(), 90);

        env.params.seed = Some(3);
        env.params.max_iters = 5;
        let (res, best) = solver_heur::solve(&env).unwrap();
        assert_eq!(res.assignments.len(), 5);
        assert!(best.unwrap().conflict_count() < 1400);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse("days: 3", true).is_err());
        assert!(is_yaml(Path::new("x/orar.yml")));
        assert!(!is_yaml(Path::new("x/orar.json")));
    }
}
