//! Best-first search over board states.
//!
//! Nodes are expanded in ascending priority: goal states first, then ongoing
//! states by `f = remaining enemy pieces + depth` (the heuristic's primary
//! term plus path cost), dead states last. Ties break by the heuristic's
//! distance term, then lower depth, then insertion sequence number, which
//! keeps the frontier order total and the search deterministic.
//!
//! Already-expanded states are never expanded again: the explored set is
//! keyed on full board equality, so two different action sequences reaching
//! the same position collapse into one node.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use xxhash_rust::xxh64::Xxh64Builder;

use expendibots_core::{Action, Board, Side};

use crate::heuristic::{self, Score};
use crate::movegen::ActionGenerator;
use crate::stats::SearchStats;

/// One explored transition: a state plus the bookkeeping to replay how the
/// search got there. Immutable after construction; parents are shared `Rc`s
/// (the node graph is a tree rooted at the initial state, so no cycles).
pub struct SearchNode {
    pub state: Board,
    pub parent: Option<Rc<SearchNode>>,
    pub action: Option<Action>,
    /// Path cost g(n): number of actions from the root.
    pub depth: u32,
    /// Heuristic score, computed once at construction.
    pub score: Score,
}

impl SearchNode {
    fn root(state: Board, side: Side) -> Rc<SearchNode> {
        let score = heuristic::score(&state, side);
        Rc::new(SearchNode {
            state,
            parent: None,
            action: None,
            depth: 0,
            score,
        })
    }

    fn child(parent: &Rc<SearchNode>, action: Action, state: Board, side: Side) -> Rc<SearchNode> {
        let score = heuristic::score(&state, side);
        Rc::new(SearchNode {
            state,
            parent: Some(Rc::clone(parent)),
            action: Some(action),
            depth: parent.depth + 1,
            score,
        })
    }
}

/// Frontier priority. Derived order: goals first, then by `f` and the
/// distance tie-break, dead states last.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
enum Rank {
    Goal,
    Cost { f: u64, spread_milli: u32 },
    Dead,
}

fn rank(score: Score, depth: u32) -> Rank {
    match score {
        Score::Win => Rank::Goal,
        Score::Ongoing { enemy, spread_milli } => Rank::Cost {
            f: enemy as u64 + depth as u64,
            spread_milli,
        },
        Score::Loss => Rank::Dead,
    }
}

struct Entry {
    rank: Rank,
    depth: u32,
    seq: u64,
    node: Rc<SearchNode>,
}

impl Entry {
    #[inline]
    fn key(&self) -> (Rank, u32, u64) {
        (self.rank, self.depth, self.seq)
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // BinaryHeap is a max-heap; reversed so pop() yields the lowest key.
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

/// A winning action sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plan {
    /// Actions in play order; applying them to the root state wipes out the
    /// enemy side.
    pub actions: Vec<Action>,
    /// Nodes expanded before the goal was found.
    pub expanded: u64,
}

/// Search outcomes that are not a win. All are normal results, not crashes;
/// the caller decides how to present them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchFailure {
    /// Bounded mode ran out of node budget. `best_line` is the action
    /// sequence to the most promising node generated so far (possibly empty
    /// when the root itself was never improved on).
    Exhausted { best_line: Vec<Action>, expanded: u64 },
    /// The frontier emptied: no winning sequence exists from the root.
    NoSolution { expanded: u64 },
    /// The stop flag was raised mid-search.
    Interrupted { expanded: u64 },
}

/// Best-first search driver, shared by the bounded and exhaustive modes.
pub struct SearchEngine {
    generator: ActionGenerator,
    pub stats: SearchStats,
}

impl SearchEngine {
    pub fn new(generator: ActionGenerator) -> SearchEngine {
        SearchEngine {
            generator,
            stats: SearchStats::new(),
        }
    }

    /// Bounded mode: expand at most `budget` nodes. Returns the winning plan
    /// if one is found in time, otherwise [`SearchFailure::Exhausted`] with
    /// the best-known line. A budget of 0 expands nothing beyond popping the
    /// root.
    pub fn search_with_budget(
        &mut self,
        root: Board,
        side: Side,
        budget: u64,
    ) -> Result<Plan, SearchFailure> {
        self.run(root, side, Some(budget), None)
    }

    /// Exhaustive mode: run until a win is found or the frontier empties.
    /// Unbounded in time and memory when no win is reachable, so callers
    /// pass a stop flag (the CLI wires it to SIGINT) for external
    /// cancellation.
    pub fn search_until_win(
        &mut self,
        root: Board,
        side: Side,
        running: Arc<AtomicBool>,
    ) -> Result<Plan, SearchFailure> {
        self.run(root, side, None, Some(running))
    }

    fn run(
        &mut self,
        root: Board,
        side: Side,
        budget: Option<u64>,
        running: Option<Arc<AtomicBool>>,
    ) -> Result<Plan, SearchFailure> {
        let mut frontier: BinaryHeap<Entry> = BinaryHeap::new();
        let mut explored: HashSet<Board, Xxh64Builder> =
            HashSet::with_hasher(Xxh64Builder::new(0));

        let root_node = SearchNode::root(root, side);
        let mut seq: u64 = 0;
        let mut expanded: u64 = 0;

        // Best node generated so far, for the partial line reported on
        // budget exhaustion. The root counts.
        let mut best_key = (rank(root_node.score, 0), 0u32, seq);
        let mut best_node = Rc::clone(&root_node);

        frontier.push(Entry {
            rank: best_key.0,
            depth: 0,
            seq,
            node: root_node,
        });
        seq += 1;

        while let Some(entry) = frontier.pop() {
            let node = entry.node;

            if node.score == Score::Win {
                return Ok(Plan {
                    actions: reconstruct(&node),
                    expanded,
                });
            }
            // The frontier may hold several entries for one state (pushed
            // before any was expanded); only the first pop expands it.
            if explored.contains(&node.state) {
                self.stats.record_dedup_skip();
                continue;
            }
            if let Some(ref flag) = running {
                if !flag.load(AtomicOrdering::SeqCst) {
                    return Err(SearchFailure::Interrupted { expanded });
                }
            }
            if let Some(budget) = budget {
                if expanded >= budget {
                    return Err(SearchFailure::Exhausted {
                        best_line: reconstruct(&best_node),
                        expanded,
                    });
                }
            }

            explored.insert(node.state.clone());
            expanded += 1;
            self.stats.record_expansion(node.depth);
            self.stats.maybe_log(frontier.len(), explored.len());

            for action in self.generator.legal_actions(&node.state, side) {
                let child_state = node
                    .state
                    .apply(side, action)
                    .expect("generator emitted an illegal action");
                if explored.contains(&child_state) {
                    self.stats.record_dedup_skip();
                    continue;
                }
                let child = SearchNode::child(&node, action, child_state, side);
                self.stats.record_generated();

                // First-found-win shortcut: no need to wait for the pop.
                if child.score == Score::Win {
                    return Ok(Plan {
                        actions: reconstruct(&child),
                        expanded,
                    });
                }

                let child_rank = rank(child.score, child.depth);
                let key = (child_rank, child.depth, seq);
                if key < best_key {
                    best_key = key;
                    best_node = Rc::clone(&child);
                }
                frontier.push(Entry {
                    rank: child_rank,
                    depth: child.depth,
                    seq,
                    node: child,
                });
                seq += 1;
            }
            self.stats.note_frontier(frontier.len());
        }

        Err(SearchFailure::NoSolution { expanded })
    }
}

/// Walk parent links from `goal` back to the root and return the actions in
/// play order. The result's length equals `goal.depth`.
pub fn reconstruct(goal: &Rc<SearchNode>) -> Vec<Action> {
    let mut actions = Vec::with_capacity(goal.depth as usize);
    let mut cursor = goal;
    while let (Some(parent), Some(action)) = (&cursor.parent, cursor.action) {
        actions.push(action);
        cursor = parent;
    }
    actions.reverse();
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen::StepRule;
    use expendibots_core::Pos;

    fn board(white: &[(u8, u8, u8)], black: &[(u8, u8, u8)]) -> Board {
        Board::from_stacks(white, black).unwrap()
    }

    fn engine() -> SearchEngine {
        SearchEngine::new(ActionGenerator::new(StepRule::StackHeight))
    }

    fn always_running() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(true))
    }

    #[test]
    fn test_adjacent_enemy_single_boom() {
        // Diagonal contact: one boom wins immediately.
        let root = board(&[(1, 0, 0)], &[(1, 1, 1)]);
        let plan = engine()
            .search_until_win(root, Side::White, always_running())
            .unwrap();
        assert_eq!(plan.actions, vec![Action::Boom { at: Pos::new(0, 0) }]);
    }

    #[test]
    fn test_root_already_won() {
        let root = board(&[(1, 0, 0)], &[]);
        let plan = engine()
            .search_until_win(root, Side::White, always_running())
            .unwrap();
        assert!(plan.actions.is_empty());
    }

    #[test]
    fn test_distant_enemy_needs_moves_first() {
        let root = board(&[(1, 0, 0)], &[(1, 3, 3)]);
        let plan = engine()
            .search_until_win(root.clone(), Side::White, always_running())
            .unwrap();
        assert!(plan.actions.len() > 1);
        assert!(plan
            .actions
            .iter()
            .any(|a| matches!(a, Action::Move { .. })));
        assert!(matches!(plan.actions.last(), Some(Action::Boom { .. })));

        // Replaying the plan must reproduce a won state.
        let mut state = root;
        for &action in &plan.actions {
            state = state.apply(Side::White, action).unwrap();
        }
        assert_eq!(state.total(Side::Black), 0);
    }

    #[test]
    fn test_budget_zero_is_exhausted_without_expansion() {
        let root = board(&[(1, 0, 0)], &[(1, 3, 3)]);
        let mut engine = engine();
        match engine.search_with_budget(root, Side::White, 0) {
            Err(SearchFailure::Exhausted { best_line, expanded }) => {
                assert_eq!(expanded, 0);
                assert!(best_line.is_empty());
            }
            other => panic!("expected budget exhaustion, got {other:?}"),
        }
        assert_eq!(engine.stats.expanded, 0);
    }

    #[test]
    fn test_budget_zero_still_reports_won_root() {
        let root = board(&[(2, 3, 3)], &[]);
        let plan = engine().search_with_budget(root, Side::White, 0).unwrap();
        assert!(plan.actions.is_empty());
    }

    #[test]
    fn test_bounded_finds_easy_win() {
        let root = board(&[(1, 0, 0)], &[(1, 0, 1)]);
        let plan = engine()
            .search_with_budget(root, Side::White, 10)
            .unwrap();
        assert_eq!(plan.actions, vec![Action::Boom { at: Pos::new(0, 0) }]);
    }

    #[test]
    fn test_small_budget_reports_best_line() {
        let root = board(&[(1, 0, 0)], &[(1, 7, 7)]);
        match engine().search_with_budget(root.clone(), Side::White, 3) {
            Err(SearchFailure::Exhausted { best_line, .. }) => {
                // The best-known line must replay cleanly from the root.
                let mut state = root;
                for &action in &best_line {
                    state = state.apply(Side::White, action).unwrap();
                }
                assert_eq!(state.total(Side::White), 1);
            }
            other => panic!("expected budget exhaustion, got {other:?}"),
        }
    }

    #[test]
    fn test_no_solution_when_own_side_empty() {
        // No own pieces: no actions, frontier drains immediately.
        let root = board(&[], &[(1, 4, 4)]);
        match engine().search_until_win(root, Side::White, always_running()) {
            Err(SearchFailure::NoSolution { expanded }) => assert_eq!(expanded, 1),
            other => panic!("expected no solution, got {other:?}"),
        }
    }

    #[test]
    fn test_interrupt_stops_search() {
        let root = board(&[(1, 0, 0)], &[(1, 7, 7)]);
        let flag = Arc::new(AtomicBool::new(false));
        match engine().search_until_win(root, Side::White, flag) {
            Err(SearchFailure::Interrupted { .. }) => {}
            other => panic!("expected interruption, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_replays_to_goal() {
        // Win here needs at least one approach move before the boom; the
        // reconstructed sequence must replay cleanly from the root.
        let root = board(&[(2, 0, 0)], &[(1, 4, 0), (1, 4, 1)]);
        let plan = engine()
            .search_until_win(root.clone(), Side::White, always_running())
            .unwrap();
        assert!(plan.actions.len() >= 2);
        let mut state = root;
        for &action in &plan.actions {
            state = state.apply(Side::White, action).unwrap();
        }
        assert_eq!(state.total(Side::Black), 0);
    }

    #[test]
    fn test_dedup_never_expands_equal_states() {
        // A 2-stack generates many transpositions; expanded nodes must all
        // be distinct states, which shows as expanded <= generated and the
        // engine terminating on a board with no win (both sides static).
        let root = board(&[(2, 0, 0), (1, 3, 0)], &[(1, 7, 7)]);
        let mut engine = engine();
        match engine.search_with_budget(root, Side::White, 200) {
            Ok(plan) => assert!(!plan.actions.is_empty()),
            Err(SearchFailure::Exhausted { .. }) => {}
            other => panic!("unexpected failure: {other:?}"),
        }
        assert!(engine.stats.dedup_skips > 0, "transpositions never collapsed");
    }
}
