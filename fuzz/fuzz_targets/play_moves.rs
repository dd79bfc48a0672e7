#![no_main]
use libfuzzer_sys::fuzz_target;
use uttt::environment::{GameResult, GameState};
use uttt::game::core::Player;
use uttt::game::Position;

// Every input byte picks one of the legal moves. Checks that the rules stay
// consistent along the way.
fuzz_target!(|data: &[u8]| {
    let mut position = Position::starting();
    for &byte in data {
        let moves = position.generate_moves();
        if moves.is_empty() {
            break;
        }
        let mover = position.us();
        let next_move = moves[usize::from(byte) % moves.len()];
        let before = position.clone();
        position.apply(&next_move);
        assert_ne!(before, position);
        assert_eq!(position.us(), !mover);
        assert!(position.marks(mover).is_set(next_move.square()));
    }
    if position.is_game_over() {
        let x = position.result(Player::X);
        let o = position.result(Player::O);
        assert_eq!(x, !o);
        if position.winner().is_none() {
            assert_eq!(x, GameResult::Draw);
            assert_eq!(position.plies(), 81);
        }
    }
});
