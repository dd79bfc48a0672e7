//! Implements [Monte Carlo Tree Search] (MCTS) with the UCT selection rule and
//! uniformly random rollouts.
//!
//! Each simulation goes through four steps:
//!
//! 1. Selection: starting at the root, descend into the child with the highest
//!    UCT score while the node is fully expanded.
//! 2. Expansion: turn one random untried action into a new child node.
//! 3. Simulation: play random moves from the new node until the game is over.
//! 4. Backpropagation: update visit counts and rewards on the path back to the
//!    root.
//!
//! After the budget is spent, the first-ply actions are ranked by their
//! empirical win rate. The tree is dropped when the search returns.
//!
//! [Monte Carlo Tree Search]: https://en.wikipedia.org/wiki/Monte_Carlo_tree_search

use std::fmt;
use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::environment::GameState;

mod policy;
mod tree;

use tree::{Statistics, Tree};

/// Standard UCT exploration constant.
pub const DEFAULT_EXPLORATION: f64 = std::f64::consts::SQRT_2;

/// Parameters of the search.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Number of simulations to perform, at most [`u32::MAX`].
    pub simulations: usize,
    /// Exploration constant $C$ of the UCT formula.
    pub exploration: f64,
    /// Number of independent trees searched in parallel by
    /// [`search_parallel`].
    pub threads: usize,
    /// Optional deadline: the search stops early once it is exceeded.
    pub time_limit: Option<Duration>,
}

impl Config {
    /// Default configuration with the given simulation budget.
    #[must_use]
    pub fn with_simulations(simulations: usize) -> Self {
        Self {
            simulations,
            ..Self::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            simulations: 20_000,
            exploration: DEFAULT_EXPLORATION,
            threads: 1,
            time_limit: None,
        }
    }
}

/// Visit counters are `u32`, so a single search never performs more
/// simulations than this.
#[must_use]
fn max_simulations() -> usize {
    usize::try_from(u32::MAX).unwrap_or(usize::MAX)
}

/// Aggregated statistics of a first-ply action.
#[derive(Clone, Debug, PartialEq)]
pub struct RankedAction<A> {
    /// The move.
    pub action: A,
    /// Sum of rewards from the perspective of the player making the move.
    pub wins: f64,
    /// Number of simulations that started with this move.
    pub runs: u32,
}

impl<A> RankedAction<A> {
    /// Empirical win rate in `[0, 1]`.
    #[must_use]
    pub fn win_rate(&self) -> f64 {
        if self.runs == 0 {
            0.0
        } else {
            self.wins / f64::from(self.runs)
        }
    }
}

/// Stops the search once either the simulation budget or the time limit is
/// exhausted.
struct Limiter {
    timer: Instant,
    simulations: usize,
    time: Option<Duration>,
}

impl Limiter {
    fn new(simulations: usize, time: Option<Duration>) -> Self {
        Self {
            timer: Instant::now(),
            simulations,
            time,
        }
    }

    /// The deadline is only checked after the first simulation so that a
    /// non-zero budget always produces some statistics.
    fn exhausted(&self, performed: usize) -> bool {
        if performed >= self.simulations {
            return true;
        }
        performed > 0 && self.time.is_some_and(|time| self.timer.elapsed() >= time)
    }
}

/// Estimates the strength of every legal move in `root` using
/// `simulations` rounds of MCTS and returns the explored moves, strongest
/// first.
///
/// Returns an empty list if the game is already over or no simulations were
/// performed. `root` is never modified.
pub fn get_top_actions<S, R>(root: &S, simulations: usize, rng: &mut R) -> Vec<RankedAction<S::Action>>
where
    S: GameState,
    R: Rng + ?Sized,
{
    search(root, &Config::with_simulations(simulations), rng)
}

/// Same as [`get_top_actions`] with complete control over search parameters.
/// [`Config::threads`] is ignored: see [`search_parallel`].
pub fn search<S, R>(root: &S, config: &Config, rng: &mut R) -> Vec<RankedAction<S::Action>>
where
    S: GameState,
    R: Rng + ?Sized,
{
    let budget = config.simulations.min(max_simulations());
    rank(explore(root, config, budget, rng))
}

/// Root parallelization: splits the simulation budget between
/// [`Config::threads`] independent trees and sums their first-ply statistics.
///
/// Every tree gets its own random stream derived from `seed`, so the result is
/// reproducible for a fixed seed and thread count.
pub fn search_parallel<S>(root: &S, config: &Config, seed: u64) -> Vec<RankedAction<S::Action>>
where
    S: GameState + Sync,
    S::Action: Send,
{
    let threads = config.threads.max(1);
    if threads == 1 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        return search(root, config, &mut rng);
    }
    let simulations = config.simulations.min(max_simulations());
    let base = simulations / threads;
    let remainder = simulations % threads;

    let trees: Vec<Vec<Statistics<S::Action>>> = (0..threads)
        .into_par_iter()
        .map(|index| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            rng.set_stream(index as u64);
            let budget = base + usize::from(index < remainder);
            explore(root, config, budget, &mut rng)
        })
        .collect();

    let mut merged: Vec<Option<Statistics<S::Action>>> = Vec::new();
    for statistics in trees.into_iter().flatten() {
        if merged.len() <= statistics.ordinal {
            merged.resize_with(statistics.ordinal + 1, || None);
        }
        let ordinal = statistics.ordinal;
        match merged[ordinal].as_mut() {
            Some(total) => {
                total.wins += statistics.wins;
                total.runs += statistics.runs;
            },
            None => merged[ordinal] = Some(statistics),
        }
    }
    rank(merged.into_iter().flatten().collect())
}

/// Grows a single tree for `budget` simulations and returns its first-ply
/// statistics.
fn explore<S, R>(root: &S, config: &Config, budget: usize, rng: &mut R) -> Vec<Statistics<S::Action>>
where
    S: GameState,
    R: Rng + ?Sized,
{
    if root.is_terminal() {
        debug!("search requested for a finished game");
        return Vec::new();
    }
    let limiter = Limiter::new(budget, config.time_limit);
    let mut tree = Tree::new(root);
    let mut performed = 0;
    while !limiter.exhausted(performed) {
        tree.simulate(root, config.exploration, rng);
        performed += 1;
    }
    debug!(
        simulations = performed,
        nodes = tree.len(),
        elapsed = ?limiter.timer.elapsed(),
        "search finished"
    );
    tree.first_ply()
}

/// Orders by win rate, then by the number of runs and finally by the position
/// of the action in the root's legal actions.
fn rank<A: fmt::Debug>(mut statistics: Vec<Statistics<A>>) -> Vec<RankedAction<A>> {
    let rate = |s: &Statistics<A>| s.wins / f64::from(s.runs.max(1));
    statistics.sort_by(|a, b| {
        rate(b)
            .total_cmp(&rate(a))
            .then_with(|| b.runs.cmp(&a.runs))
            .then_with(|| a.ordinal.cmp(&b.ordinal))
    });
    statistics
        .into_iter()
        .map(|s| {
            trace!(action = ?s.action, wins = s.wins, runs = s.runs, "ranked action");
            RankedAction {
                action: s.action,
                wins: s.wins,
                runs: s.runs,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limiter_respects_budget() {
        let limiter = Limiter::new(3, None);
        assert!(!limiter.exhausted(0));
        assert!(!limiter.exhausted(2));
        assert!(limiter.exhausted(3));
        assert!(Limiter::new(0, None).exhausted(0));
    }

    #[test]
    fn limiter_runs_at_least_once() {
        let limiter = Limiter::new(10, Some(Duration::ZERO));
        assert!(!limiter.exhausted(0));
        assert!(limiter.exhausted(1));
    }

    #[test]
    fn budget_fits_visit_counters() {
        assert_eq!(max_simulations() as u64, u64::from(u32::MAX));
        assert_eq!(1000.min(max_simulations()), 1000);
        let limiter = Limiter::new(usize::MAX.min(max_simulations()), None);
        assert!(!limiter.exhausted(usize::try_from(u32::MAX - 1).unwrap()));
        assert!(limiter.exhausted(usize::try_from(u32::MAX).unwrap()));
    }

    #[test]
    fn ranking_order() {
        let statistics = vec![
            Statistics { ordinal: 0, action: 'a', wins: 1.0, runs: 4 },
            Statistics { ordinal: 1, action: 'b', wins: 3.0, runs: 4 },
            Statistics { ordinal: 2, action: 'c', wins: 6.0, runs: 8 },
            Statistics { ordinal: 3, action: 'd', wins: 3.0, runs: 4 },
            Statistics { ordinal: 4, action: 'e', wins: 0.0, runs: 2 },
        ];
        let ranked: Vec<char> = rank(statistics).into_iter().map(|r| r.action).collect();
        assert_eq!(ranked, vec!['c', 'b', 'd', 'a', 'e']);
    }

    #[test]
    fn win_rate_of_unexplored_action() {
        let action = RankedAction { action: 'a', wins: 0.0, runs: 0 };
        assert!(action.win_rate().abs() < f64::EPSILON);
    }
}
