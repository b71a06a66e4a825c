use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use sched_core::{MoveGenerator, Search, SearchReport, Termination, TimetableState};
use tracing::{debug, info};

pub type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Clone, Copy, Debug)]
pub struct MctsConfig {
    pub simulations: u32,
    /// `C` in `score/visits + C * sqrt(2 ln(parent visits) / visits)`.
    pub exploration: f64,
    /// Upper bound on moves per rollout. Rollouts end on their own after
    /// at most one move per grid slot, so `None` is safe.
    pub max_rollout_moves: Option<u32>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            simulations: 1000,
            exploration: 1.4,
            max_rollout_moves: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    state: TimetableState,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    visits: u32,
    score: f64,
}

impl Node {
    pub fn state(&self) -> &TimetableState {
        &self.state
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn visits(&self) -> u32 {
        self.visits
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    fn uct(&self, parent_visits: u32, c: f64) -> f64 {
        let n = self.visits as f64;
        self.score / n + c * (2.0 * (parent_visits as f64).ln() / n).sqrt()
    }
}

/// Arena of search nodes; children and parents are indices into it.
#[derive(Clone, Debug)]
pub struct SearchTree {
    nodes: Vec<Node>,
}

impl SearchTree {
    pub fn new(root: TimetableState) -> Self {
        Self {
            nodes: vec![Node {
                state: root,
                parent: None,
                children: Vec::new(),
                visits: 0,
                score: 0.0,
            }],
        }
    }

    pub fn root(&self) -> &Node {
        &self.nodes[ROOT]
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Root child with the most visits; the first one on ties.
    pub fn best_child(&self) -> Option<NodeId> {
        first_max_by(self.root().children.iter().copied(), |&id| {
            self.nodes[id].visits as f64
        })
    }

    fn add_child(&mut self, parent: NodeId, state: TimetableState) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            state,
            parent: Some(parent),
            children: Vec::new(),
            visits: 0,
            score: 0.0,
        });
        self.nodes[parent].children.push(id);
        id
    }

    fn select<R: Rng + ?Sized>(&self, c: f64, rng: &mut R) -> NodeId {
        let mut id = ROOT;
        loop {
            let node = &self.nodes[id];
            if node.children.is_empty() {
                return id;
            }
            let unvisited: Vec<NodeId> = node
                .children
                .iter()
                .copied()
                .filter(|&ch| self.nodes[ch].visits == 0)
                .collect();
            if let Some(&ch) = unvisited.choose(rng) {
                return ch;
            }
            let parent_visits = node.visits;
            id = match first_max_by(node.children.iter().copied(), |&ch| {
                self.nodes[ch].uct(parent_visits, c)
            }) {
                Some(ch) => ch,
                None => return id,
            };
        }
    }

    fn backpropagate(&mut self, from: NodeId, reward: f64) {
        let mut cur = Some(from);
        while let Some(id) = cur {
            let node = &mut self.nodes[id];
            node.visits += 1;
            node.score += reward;
            cur = node.parent;
        }
    }
}

fn first_max_by<I, F>(items: I, mut key: F) -> Option<NodeId>
where
    I: Iterator<Item = NodeId>,
    F: FnMut(&NodeId) -> f64,
{
    let mut best: Option<(NodeId, f64)> = None;
    for id in items {
        let k = key(&id);
        if best.map_or(true, |(_, bk)| k > bk) {
            best = Some((id, k));
        }
    }
    best.map(|(id, _)| id)
}

#[derive(Clone, Debug)]
pub struct MctsOutcome {
    pub best: Option<TimetableState>,
    pub tree: SearchTree,
    pub simulations: u32,
    pub states_generated: u64,
}

/// UCT tree search with uniformly random rollouts.
///
/// Rewards are `-conflict_count()` of the rollout's final state, so the
/// tree maximizes what the timetable minimizes.
#[derive(Clone, Debug, Default)]
pub struct MonteCarloTreeSearch {
    config: MctsConfig,
    gen: MoveGenerator,
}

impl MonteCarloTreeSearch {
    pub fn new(config: MctsConfig) -> Self {
        Self {
            config,
            gen: MoveGenerator::default(),
        }
    }

    pub fn run<R: Rng + ?Sized>(&self, initial: &TimetableState, rng: &mut R) -> MctsOutcome {
        let mut tree = SearchTree::new(initial.clone());
        let mut states_generated = 0u64;

        for sim in 0..self.config.simulations {
            let mut target = tree.select(self.config.exploration, rng);

            if !tree.nodes[target].state.is_terminal() {
                let successors = self.gen.successors(&tree.nodes[target].state, rng);
                states_generated += successors.len() as u64;
                let created: Vec<NodeId> = successors
                    .into_iter()
                    .map(|s| tree.add_child(target, s))
                    .collect();
                if let Some(&ch) = created.choose(rng) {
                    target = ch;
                }
            }

            let reward = self.rollout(&tree.nodes[target].state, rng);
            tree.backpropagate(target, reward);

            if (sim + 1) % 100 == 0 {
                debug!(
                    simulations = sim + 1,
                    nodes = tree.len(),
                    root_children = tree.root().children.len(),
                    "mcts progress"
                );
            }
        }

        let best = tree.best_child().map(|id| tree.nodes[id].state.clone());
        info!(
            simulations = self.config.simulations,
            nodes = tree.len(),
            found = best.is_some(),
            conflicts = best.as_ref().map(|s| s.conflict_count()),
            "mcts finished"
        );
        MctsOutcome {
            best,
            tree,
            simulations: self.config.simulations,
            states_generated,
        }
    }

    /// Random moves until the state is terminal, stuck, or the move cap hits.
    pub fn rollout<R: Rng + ?Sized>(&self, from: &TimetableState, rng: &mut R) -> f64 {
        let mut state = from.clone();
        let mut steps = 0u32;
        while !state.is_terminal() {
            if self.config.max_rollout_moves.is_some_and(|cap| steps >= cap) {
                break;
            }
            let Some(mv) = self.gen.random_move(&state, rng) else {
                break;
            };
            state = state.apply_move(mv);
            steps += 1;
        }
        -(state.conflict_count() as f64)
    }
}

impl Search for MonteCarloTreeSearch {
    fn name(&self) -> &'static str {
        "mcts"
    }

    fn search(&self, initial: &TimetableState, rng: &mut ChaCha8Rng) -> SearchReport {
        let out = self.run(initial, rng);
        let termination = if out.best.is_some() {
            Termination::SimulationBudget
        } else {
            Termination::NoSolution
        };
        SearchReport {
            stats: serde_json::json!({
                "method": self.name(),
                "simulations": out.simulations,
                "tree_size": out.tree.len(),
                "root_visits": out.tree.root().visits,
                "root_children": out.tree.root().children.len(),
                "exploration": self.config.exploration,
            }),
            best: out.best,
            termination,
            iterations: out.simulations,
            states_generated: out.states_generated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use sched_core::testing::{campus, single_slot, two_days};

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    fn mcts(simulations: u32) -> MonteCarloTreeSearch {
        MonteCarloTreeSearch::new(MctsConfig {
            simulations,
            ..Default::default()
        })
    }

    #[test]
    fn single_slot_finds_the_only_move() {
        let s0 = TimetableState::initial(single_slot(30));
        let out = mcts(10).run(&s0, &mut rng());
        let best = out.best.expect("one legal move exists");
        assert!(best.is_terminal());
        assert_eq!(best.conflict_count(), 0);
        assert_eq!(out.tree.root().children().len(), 1);
        assert_eq!(out.tree.root().visits(), 10);
    }

    #[test]
    fn terminal_root_has_no_solution() {
        let s0 = TimetableState::initial(single_slot(30));
        let solved = mcts(5).run(&s0, &mut rng()).best.unwrap();
        let out = mcts(5).run(&solved, &mut rng());
        assert!(out.best.is_none());
        assert_eq!(out.tree.len(), 1);
        assert_eq!(out.tree.root().visits(), 5);
        assert_eq!(out.tree.root().score(), 0.0);
    }

    #[test]
    fn stuck_root_has_no_solution() {
        let s0 = TimetableState::initial(single_slot(40));
        let stuck = mcts(1).run(&s0, &mut rng()).best.unwrap();
        assert!(!stuck.is_terminal());
        let report = mcts(3).search(&stuck, &mut rng());
        assert!(report.best.is_none());
        assert_eq!(report.termination, Termination::NoSolution);
    }

    #[test]
    fn root_visits_equal_simulations() {
        let s0 = TimetableState::initial(campus());
        for k in [1, 7, 40] {
            let out = mcts(k).run(&s0, &mut rng());
            assert_eq!(out.tree.root().visits(), k);
        }
    }

    #[test]
    fn child_visits_sum_to_parent_visits() {
        let s0 = TimetableState::initial(two_days());
        let out = mcts(30).run(&s0, &mut rng());
        let tree = &out.tree;
        for id in 0..tree.len() {
            let node = tree.node(id);
            if node.children().is_empty() {
                continue;
            }
            let sum: u32 = node.children().iter().map(|&c| tree.node(c).visits()).sum();
            // a node is expanded on its first visit, so every visit passes a child
            assert_eq!(sum, node.visits(), "node {id}");
            for &c in node.children() {
                assert_eq!(tree.node(c).parent(), Some(id));
            }
        }
    }

    #[test]
    fn rollout_reward_is_negated_conflicts() {
        let s0 = TimetableState::initial(single_slot(30));
        assert_eq!(mcts(1).rollout(&s0, &mut rng()), 0.0);
        let s0 = TimetableState::initial(single_slot(40));
        assert_eq!(mcts(1).rollout(&s0, &mut rng()), -10.0);
    }

    #[test]
    fn rollout_cap_stops_early() {
        let s0 = TimetableState::initial(campus());
        let capped = MonteCarloTreeSearch::new(MctsConfig {
            max_rollout_moves: Some(0),
            ..Default::default()
        });
        assert_eq!(capped.rollout(&s0, &mut rng()), -(s0.conflict_count() as f64));
    }

    #[test]
    fn best_child_is_most_visited() {
        let s0 = TimetableState::initial(campus());
        let out = mcts(60).run(&s0, &mut rng());
        let tree = &out.tree;
        let best = tree.best_child().unwrap();
        let max = tree
            .root()
            .children()
            .iter()
            .map(|&c| tree.node(c).visits())
            .max()
            .unwrap();
        assert_eq!(tree.node(best).visits(), max);
        assert_eq!(out.best.unwrap().depth(), 1);
    }
}
