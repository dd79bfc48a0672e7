//! Arena-allocated search tree.
//!
//! All nodes live in a single [`Vec`] owned by [`Tree`] and refer to each other
//! through indices. Parent links are only used to walk back up during
//! backpropagation; the arena alone determines the lifetime of the nodes and
//! is dropped as a whole once the search is over.

use rand::Rng;

use super::policy;
use crate::environment::{Action, GameResult, GameState};

pub(super) type NodeIndex = usize;

const ROOT: NodeIndex = 0;

pub(super) struct Node<A> {
    parent: Option<NodeIndex>,
    /// The move leading from the parent to this node. Only the root has none.
    action: Option<A>,
    /// Legal actions in the order they were produced by the game.
    actions: Vec<A>,
    /// Child for each of `actions`, `None` while the action is untried.
    children: Vec<Option<NodeIndex>>,
    /// Positions in `actions` that have not been expanded yet.
    untried: Vec<usize>,
    visits: u32,
    /// Sum of rewards from the perspective of the player who made `action`.
    rewards: f64,
}

impl<A: Action> Node<A> {
    fn new(parent: Option<NodeIndex>, action: Option<A>, actions: Vec<A>) -> Self {
        let count = actions.len();
        Self {
            parent,
            action,
            actions,
            children: vec![None; count],
            untried: (0..count).collect(),
            visits: 0,
            rewards: 0.0,
        }
    }

    #[must_use]
    fn is_terminal(&self) -> bool {
        self.actions.is_empty()
    }

    #[must_use]
    fn is_fully_expanded(&self) -> bool {
        self.untried.is_empty()
    }

    /// Expanded children in the order of [`GameState::legal_actions`].
    fn children(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.children.iter().filter_map(|child| *child)
    }

    /// Upper Confidence Bound for Trees. `log_parent_visits` is passed in to
    /// compute the logarithm once per selection step.
    #[must_use]
    fn uct(&self, log_parent_visits: f64, exploration: f64) -> f64 {
        debug_assert!(self.visits > 0);
        let visits = f64::from(self.visits);
        exploration.mul_add((log_parent_visits / visits).sqrt(), self.rewards / visits)
    }
}

/// Accumulated statistics of a single first-ply action.
pub(super) struct Statistics<A> {
    /// Position of the action in the root's legal actions.
    pub(super) ordinal: usize,
    pub(super) action: A,
    pub(super) wins: f64,
    pub(super) runs: u32,
}

pub(super) struct Tree<A> {
    nodes: Vec<Node<A>>,
}

impl<A: Action> Tree<A> {
    /// Creates a tree with a single root node for `root`.
    pub(super) fn new<S: GameState<Action = A>>(root: &S) -> Self {
        Self {
            nodes: vec![Node::new(None, None, root.legal_actions())],
        }
    }

    /// Number of allocated nodes.
    #[must_use]
    pub(super) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Performs one simulation: selection, expansion, rollout and
    /// backpropagation. `root` is the state the tree was created for and is
    /// never modified.
    pub(super) fn simulate<S, R>(&mut self, root: &S, exploration: f64, rng: &mut R)
    where
        S: GameState<Action = A, Player = A::Player>,
        R: Rng + ?Sized,
    {
        let mut state = root.clone();
        let selected = self.select(&mut state, exploration);
        let leaf = self.expand(selected, &mut state, rng);
        let perspective = match &self.nodes[leaf].action {
            Some(action) => action.player(),
            // The root can only be reached here if it is terminal.
            None => state.current_player(),
        };
        let outcome = policy::rollout(&mut state, perspective, rng);
        self.backpropagate(leaf, outcome);
    }

    /// Descends from the root through fully expanded nodes, always picking the
    /// child with the highest UCT score, and applies the corresponding actions
    /// to `state`. Stops at a terminal node or at a node with untried actions.
    fn select<S: GameState<Action = A>>(&self, state: &mut S, exploration: f64) -> NodeIndex {
        let mut current = ROOT;
        loop {
            let node = &self.nodes[current];
            if node.is_terminal() || !node.is_fully_expanded() {
                return current;
            }
            let log_visits = f64::from(node.visits).ln();
            let mut best: Option<(NodeIndex, f64)> = None;
            for child in node.children() {
                let score = self.nodes[child].uct(log_visits, exploration);
                // Strict comparison keeps the first child among equals.
                if best.map_or(true, |(_, best_score)| score > best_score) {
                    best = Some((child, score));
                }
            }
            let Some((child, _)) = best else {
                return current;
            };
            if let Some(action) = &self.nodes[child].action {
                state.apply(action);
            }
            current = child;
        }
    }

    /// Converts one random untried action of `index` into a new child and
    /// applies it to `state`. Terminal nodes are returned unchanged.
    fn expand<S, R>(&mut self, index: NodeIndex, state: &mut S, rng: &mut R) -> NodeIndex
    where
        S: GameState<Action = A>,
        R: Rng + ?Sized,
    {
        let node = &mut self.nodes[index];
        if node.is_terminal() || node.is_fully_expanded() {
            return index;
        }
        let pick = rng.gen_range(0..node.untried.len());
        let ordinal = node.untried.swap_remove(pick);
        let action = node.actions[ordinal].clone();
        state.apply(&action);

        let child = self.nodes.len();
        self.nodes
            .push(Node::new(Some(index), Some(action), state.legal_actions()));
        self.nodes[index].children[ordinal] = Some(child);
        child
    }

    /// Walks from `leaf` up to the root. Every node gets a visit; all nodes
    /// except the root accumulate the outcome from the perspective of the
    /// player who moved into them, which flips at every level.
    fn backpropagate(&mut self, leaf: NodeIndex, outcome: GameResult) {
        let mut current = Some(leaf);
        let mut outcome = outcome;
        while let Some(index) = current {
            let node = &mut self.nodes[index];
            node.visits += 1;
            if node.parent.is_some() {
                node.rewards += outcome.reward();
            }
            debug_assert!(node.rewards <= f64::from(node.visits));
            outcome = !outcome;
            current = node.parent;
        }
    }

    /// Statistics of every first-ply action that has been expanded, in the
    /// order of the root's legal actions.
    pub(super) fn first_ply(&self) -> Vec<Statistics<A>> {
        let root = &self.nodes[ROOT];
        root.children
            .iter()
            .enumerate()
            .filter_map(|(ordinal, child)| {
                let child = &self.nodes[(*child)?];
                Some(Statistics {
                    ordinal,
                    action: root.actions[ordinal].clone(),
                    wins: child.rewards,
                    runs: child.visits,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::seeded_rng;

    /// Nim-like game: players alternately take 1 or 2 tokens, whoever takes the
    /// last token wins.
    #[derive(Clone, Debug, PartialEq)]
    struct Tokens {
        left: u8,
        first_to_move: bool,
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Take {
        amount: u8,
        first: bool,
    }

    impl Action for Take {
        type Player = bool;

        fn player(&self) -> bool {
            self.first
        }
    }

    impl GameState for Tokens {
        type Action = Take;
        type Player = bool;

        fn current_player(&self) -> bool {
            self.first_to_move
        }

        fn legal_actions(&self) -> Vec<Take> {
            (1..=self.left.min(2))
                .map(|amount| Take {
                    amount,
                    first: self.first_to_move,
                })
                .collect()
        }

        fn apply(&mut self, action: &Take) {
            self.left -= action.amount;
            self.first_to_move = !self.first_to_move;
        }

        fn result(&self, player: bool) -> GameResult {
            // The player who took the last token is no longer to move.
            if player == self.first_to_move {
                GameResult::Loss
            } else {
                GameResult::Win
            }
        }
    }

    fn grown_tree(simulations: usize) -> Tree<Take> {
        let root = Tokens {
            left: 7,
            first_to_move: true,
        };
        let mut rng = seeded_rng(Some(42));
        let mut tree = Tree::new(&root);
        for _ in 0..simulations {
            tree.simulate(&root, std::f64::consts::SQRT_2, &mut rng);
        }
        tree
    }

    #[test]
    fn root_is_created_untried() {
        let tree = grown_tree(0);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.nodes[ROOT].untried.len(), 2);
        assert!(tree.first_ply().is_empty());
    }

    #[test]
    fn every_simulation_allocates_at_most_one_node() {
        for simulations in [1, 2, 10, 100] {
            let tree = grown_tree(simulations);
            assert!(tree.len() <= simulations + 1);
            assert_eq!(tree.nodes[ROOT].visits as usize, simulations);
        }
    }

    #[test]
    fn statistics_are_consistent() {
        let tree = grown_tree(500);
        for node in &tree.nodes {
            let children: u32 = node.children().map(|child| tree.nodes[child].visits).sum();
            assert!(node.visits >= children);
            assert!(node.rewards >= 0.0);
            assert!(node.rewards <= f64::from(node.visits));
            assert_eq!(
                node.untried.len() + node.children().count(),
                node.actions.len()
            );
        }
        for (index, node) in tree.nodes.iter().enumerate().skip(1) {
            let parent = node.parent.unwrap();
            assert!(tree.nodes[parent].children().any(|child| child == index));
        }
    }

    #[test]
    fn root_accumulates_no_reward() {
        let tree = grown_tree(100);
        assert!(tree.nodes[ROOT].rewards.abs() < f64::EPSILON);
    }

    #[test]
    fn backpropagation_flips_perspective() {
        let root = Tokens {
            left: 7,
            first_to_move: true,
        };
        let mut tree = Tree::new(&root);
        let mut state = root.clone();
        let mut rng = seeded_rng(Some(1));
        let child = tree.expand(ROOT, &mut state, &mut rng);
        let grandchild = tree.expand(child, &mut state, &mut rng);

        tree.backpropagate(grandchild, GameResult::Win);

        assert_eq!(tree.nodes[grandchild].visits, 1);
        assert!((tree.nodes[grandchild].rewards - 1.0).abs() < f64::EPSILON);
        assert_eq!(tree.nodes[child].visits, 1);
        assert!(tree.nodes[child].rewards.abs() < f64::EPSILON);
        assert_eq!(tree.nodes[ROOT].visits, 1);

        tree.backpropagate(grandchild, GameResult::Draw);
        assert!((tree.nodes[grandchild].rewards - 1.5).abs() < f64::EPSILON);
        assert!((tree.nodes[child].rewards - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn selection_tie_keeps_first_legal_child() {
        let root = Tokens {
            left: 7,
            first_to_move: true,
        };
        for seed in 0..20 {
            let mut tree = Tree::new(&root);
            let mut rng = seeded_rng(Some(seed));
            for _ in 0..2 {
                let mut state = root.clone();
                let child = tree.expand(ROOT, &mut state, &mut rng);
                tree.backpropagate(child, GameResult::Win);
            }
            assert!(tree.nodes[ROOT].is_fully_expanded());

            let mut state = root.clone();
            let selected = tree.select(&mut state, std::f64::consts::SQRT_2);
            assert_eq!(Some(selected), tree.nodes[ROOT].children[0]);
            assert_eq!(tree.nodes[selected].action.as_ref().map(|take| take.amount), Some(1));
            assert_eq!(state.left, 6);
        }
    }

    #[test]
    fn finds_winning_move() {
        // With 7 tokens the first player wins by taking 1 (leaving a multiple
        // of 3).
        let tree = grown_tree(2000);
        let best = tree
            .first_ply()
            .into_iter()
            .max_by(|a, b| {
                (a.wins / f64::from(a.runs)).total_cmp(&(b.wins / f64::from(b.runs)))
            })
            .unwrap();
        assert_eq!(best.action.amount, 1);
    }
}
