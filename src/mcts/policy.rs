//! Rollout (playout) policy used to estimate the value of a freshly expanded
//! node.

use rand::Rng;

use crate::environment::{GameResult, GameState};
use crate::util;

/// Plays uniformly random moves until the game is over and returns the outcome
/// from the `perspective` player's point of view.
///
/// The game itself has to guarantee that every playout eventually reaches a
/// terminal state.
pub(super) fn rollout<S, R>(state: &mut S, perspective: S::Player, rng: &mut R) -> GameResult
where
    S: GameState,
    R: Rng + ?Sized,
{
    loop {
        let actions = state.legal_actions();
        match util::choose(&actions, rng) {
            Some(action) => state.apply(action),
            None => break,
        }
    }
    state.result(perspective)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Action;
    use crate::util::seeded_rng;

    /// Counts down to zero, each ply removes one. The player who makes the
    /// last move wins.
    #[derive(Clone, Debug)]
    struct Countdown {
        left: u32,
        plies: u32,
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Step(u8);

    impl Action for Step {
        type Player = u8;

        fn player(&self) -> u8 {
            self.0
        }
    }

    impl GameState for Countdown {
        type Action = Step;
        type Player = u8;

        fn current_player(&self) -> u8 {
            (self.plies % 2) as u8
        }

        fn legal_actions(&self) -> Vec<Step> {
            if self.left == 0 {
                vec![]
            } else {
                vec![Step(self.current_player()); 3]
            }
        }

        fn apply(&mut self, _: &Step) {
            self.left -= 1;
            self.plies += 1;
        }

        fn result(&self, player: u8) -> GameResult {
            assert_eq!(self.left, 0);
            if player == self.current_player() {
                GameResult::Loss
            } else {
                GameResult::Win
            }
        }
    }

    #[test]
    fn plays_until_terminal() {
        let mut rng = seeded_rng(Some(3));
        let mut state = Countdown { left: 5, plies: 0 };
        // Player 0 makes plies 0, 2 and 4, i.e. the last one.
        assert_eq!(rollout(&mut state, 0, &mut rng), GameResult::Win);
        assert_eq!(state.left, 0);
        assert_eq!(state.plies, 5);
    }

    #[test]
    fn terminal_state_is_evaluated_immediately() {
        let mut rng = seeded_rng(Some(3));
        let mut state = Countdown { left: 0, plies: 2 };
        assert_eq!(rollout(&mut state, 0, &mut rng), GameResult::Loss);
        assert_eq!(state.plies, 2);
    }
}
