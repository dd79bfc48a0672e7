//! Interface between the search and the rules of a game.
//!
//! [`crate::mcts`] works with any turn-based, perfect-information game between
//! two players that implements [`GameState`]. The search never inspects the
//! contents of players, actions or states: it only clones states, asks them
//! for legal actions, applies these actions and reads the final outcome.

use std::fmt;
use std::ops::Not;

/// Identity of one of the two participants.
pub trait Player: Copy + Eq + fmt::Debug {}

impl<T: Copy + Eq + fmt::Debug> Player for T {}

/// A single legal move. Actions are only meaningful relative to the state
/// they were generated from.
pub trait Action: Clone + PartialEq + fmt::Debug {
    /// The type identifying participants of the game.
    type Player: Player;

    /// Returns the player who makes this move.
    fn player(&self) -> Self::Player;
}

/// Outcome of a finished game from the perspective of a given player.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Win,
    Draw,
    Loss,
}

impl GameResult {
    /// Numeric reward used by the search: 1 for a win, 0.5 for a draw and 0
    /// for a loss.
    #[must_use]
    pub const fn reward(self) -> f64 {
        match self {
            Self::Win => 1.0,
            Self::Draw => 0.5,
            Self::Loss => 0.0,
        }
    }
}

impl Not for GameResult {
    type Output = Self;

    /// Mirrors the outcome to the other player's perspective.
    fn not(self) -> Self::Output {
        match self {
            Self::Win => Self::Loss,
            Self::Draw => Self::Draw,
            Self::Loss => Self::Win,
        }
    }
}

/// Capabilities a game state must provide to be searchable.
///
/// Players are expected to alternate strictly: applying any action hands the
/// turn to the other player.
pub trait GameState: Clone {
    /// Participant identity.
    type Player: Player;
    /// Move representation.
    type Action: Action<Player = Self::Player>;

    /// Returns the player to move.
    fn current_player(&self) -> Self::Player;

    /// Returns all legal actions in a stable order. The list is empty if and
    /// only if the game is over.
    fn legal_actions(&self) -> Vec<Self::Action>;

    /// Advances the state by one ply. The action must be one of
    /// [`GameState::legal_actions`].
    fn apply(&mut self, action: &Self::Action);

    /// Returns the outcome of a finished game for `player`. Must only be
    /// called for terminal states.
    fn result(&self, player: Self::Player) -> GameResult;

    /// Returns `true` if there are no legal actions left.
    fn is_terminal(&self) -> bool {
        self.legal_actions().is_empty()
    }
}
