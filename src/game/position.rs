//! Provides fully-specified [Ultimate Tic-Tac-Toe] [`Position`] with rules
//! enforcement and move generation.
//!
//! [Ultimate Tic-Tac-Toe]: https://en.wikipedia.org/wiki/Ultimate_tic-tac-toe

use std::fmt;

use anyhow::bail;
use arrayvec::ArrayVec;

use crate::environment::{GameResult, GameState};
use crate::game::bitboard::{has_line, Bitboard, MINI_BOARD};
use crate::game::core::{Move, Player, Square, BOARD_SIZE, BOARD_WIDTH};

/// Legal moves in a position. There can never be more than the number of
/// cells.
pub type MoveList = ArrayVec<Move, { BOARD_SIZE as usize }>;

/// State of the game: marks of both players, the mini-board the next move is
/// sent to and the player to move.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    marks: [Bitboard; 2],
    /// Cell of the previous move, i.e. the mini-board the next move has to be
    /// played in unless that mini-board is finished.
    target: Option<u8>,
    side_to_move: Player,
}

impl Position {
    /// Creates the empty board with X to move.
    #[must_use]
    pub const fn starting() -> Self {
        Self {
            marks: [Bitboard::empty(), Bitboard::empty()],
            target: None,
            side_to_move: Player::X,
        }
    }

    /// Returns the player to move.
    #[must_use]
    pub const fn us(&self) -> Player {
        self.side_to_move
    }

    /// Returns the cells occupied by `player`.
    #[must_use]
    pub const fn marks(&self, player: Player) -> Bitboard {
        self.marks[player.index()]
    }

    /// Returns all occupied cells.
    #[must_use]
    pub fn occupied(&self) -> Bitboard {
        self.marks[0] | self.marks[1]
    }

    /// Number of marks placed so far.
    #[must_use]
    pub fn plies(&self) -> u32 {
        self.occupied().count_ones()
    }

    /// Returns the 9-bit set of mini-boards won by `player`.
    #[must_use]
    pub fn won_mini_boards(&self, player: Player) -> u16 {
        let marks = self.marks(player);
        (0..BOARD_WIDTH)
            .filter(|&mini_board| has_line(marks.mini_board(mini_board)))
            .fold(0, |won, mini_board| won | (1 << mini_board))
    }

    /// Returns `true` if `player` has won the whole game.
    #[must_use]
    pub fn has_won(&self, player: Player) -> bool {
        has_line(self.won_mini_boards(player))
    }

    /// Returns the winner, if there is one.
    #[must_use]
    pub fn winner(&self) -> Option<Player> {
        [Player::X, Player::O]
            .into_iter()
            .find(|&player| self.has_won(player))
    }

    /// A mini-board is finished once either player won it or it is full.
    #[must_use]
    pub fn is_finished(&self, mini_board: u8) -> bool {
        let occupied = self.occupied().mini_board(mini_board);
        occupied == MINI_BOARD
            || has_line(self.marks[0].mini_board(mini_board))
            || has_line(self.marks[1].mini_board(mini_board))
    }

    /// Returns the cells the next move may be played on.
    #[must_use]
    pub fn allowed_squares(&self) -> Bitboard {
        if self.winner().is_some() {
            return Bitboard::empty();
        }
        let empty = !self.occupied();
        match self.target {
            Some(target) if !self.is_finished(target) => {
                empty & Bitboard::mini_board_mask(target)
            },
            // Free placement on the first move and when the target mini-board
            // is already decided. This includes empty cells of won
            // mini-boards.
            _ => empty,
        }
    }

    /// Returns all legal moves in the order of square indices.
    #[must_use]
    pub fn generate_moves(&self) -> MoveList {
        self.allowed_squares()
            .iter()
            .map(|square| Move::new(square, self.side_to_move))
            .collect()
    }

    /// Applies a move without checking whether it is legal.
    pub fn make_move(&mut self, next_move: &Move) {
        debug_assert!(self.allowed_squares().is_set(next_move.square()));
        let square = next_move.square();
        self.marks[self.side_to_move.index()] |= Bitboard::from(square);
        self.target = Some(square.cell());
        self.side_to_move = !self.side_to_move;
    }

    /// Places the mark of the player to move on `square` if that is allowed.
    pub fn try_make_move(&mut self, square: Square) -> anyhow::Result<Move> {
        if !self.allowed_squares().is_set(square) {
            bail!("square {square} is not available");
        }
        let next_move = Move::new(square, self.side_to_move);
        self.make_move(&next_move);
        Ok(next_move)
    }

    /// Returns `true` if nobody can move anymore.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.allowed_squares() == Bitboard::empty()
    }

    /// Outcome of a finished game for `player`.
    #[must_use]
    pub fn outcome(&self, player: Player) -> GameResult {
        debug_assert!(self.is_game_over());
        match self.winner() {
            Some(winner) if winner == player => GameResult::Win,
            Some(_) => GameResult::Loss,
            None => GameResult::Draw,
        }
    }

    fn render_square(&self, square: Square, allowed: Bitboard) -> char {
        if self.marks[0].is_set(square) {
            'X'
        } else if self.marks[1].is_set(square) {
            'O'
        } else if allowed.is_set(square) {
            '!'
        } else {
            ' '
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::starting()
    }
}

impl GameState for Position {
    type Action = Move;
    type Player = Player;

    fn current_player(&self) -> Player {
        self.side_to_move
    }

    fn legal_actions(&self) -> Vec<Move> {
        self.generate_moves().to_vec()
    }

    fn apply(&mut self, action: &Move) {
        self.make_move(action);
    }

    fn result(&self, player: Player) -> GameResult {
        self.outcome(player)
    }

    fn is_terminal(&self) -> bool {
        self.is_game_over()
    }
}

impl fmt::Display for Position {
    /// Draws the board: mini-boards are separated with `|` and `---+---+---`,
    /// empty cells where the next move can be played are marked with `!`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let allowed = self.allowed_squares();
        for row in 0..BOARD_WIDTH {
            let (band, cell_row) = (row / 3, row % 3);
            if row > 0 {
                writeln!(f)?;
                if cell_row == 0 {
                    writeln!(f, "---+---+---")?;
                }
            }
            for column in 0..3 {
                if column > 0 {
                    write!(f, "|")?;
                }
                for cell_column in 0..3 {
                    let mini_board = band * 3 + column;
                    let square = Square::new(mini_board, cell_row * 3 + cell_column)
                        .map_err(|_| fmt::Error)?;
                    write!(f, "{}", self.render_square(square, allowed))?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn play(position: &mut Position, squares: &[&str]) {
        for notation in squares {
            let _ = position
                .try_make_move(Square::try_from(*notation).unwrap())
                .unwrap();
        }
    }

    fn from_marks(x: &[u8], o: &[u8], target: Option<u8>, side_to_move: Player) -> Position {
        let collect = |indices: &[u8]| {
            indices
                .iter()
                .fold(Bitboard::empty(), |board, &index| board | Bitboard::from(Square::try_from(index).unwrap()))
        };
        Position {
            marks: [collect(x), collect(o)],
            target,
            side_to_move,
        }
    }

    #[test]
    fn starting_position() {
        let position = Position::starting();
        assert_eq!(position.us(), Player::X);
        assert_eq!(position.generate_moves().len(), 81);
        assert_eq!(position.plies(), 0);
        assert!(!position.is_game_over());
        assert_eq!(position.winner(), None);
    }

    #[test]
    fn moves_are_sent_to_mini_board() {
        let mut position = Position::starting();
        // Center cell of the top-left mini-board sends O to the central one.
        play(&mut position, &["0011"]);
        assert_eq!(position.us(), Player::O);
        let moves = position.generate_moves();
        assert_eq!(moves.len(), 9);
        assert!(moves.iter().all(|m| m.square().mini_board() == 4));

        // Center of the central mini-board sends X back to the same board,
        // which now has one less empty cell.
        play(&mut position, &["1111"]);
        assert_eq!(position.generate_moves().len(), 8);
        assert!(position.try_make_move(Square::try_from("1111").unwrap()).is_err());
        assert!(position.try_make_move(Square::try_from("0000").unwrap()).is_err());
    }

    #[test]
    fn finished_target_allows_free_placement() {
        // X owns the top row of mini-board 0 and O just played on a cell 0,
        // sending X there.
        let position = from_marks(&[0, 1, 2], &[36, 45], Some(0), Player::X);
        assert!(position.is_finished(0));
        assert_eq!(position.won_mini_boards(Player::X), 0b1);
        let moves = position.generate_moves();
        assert_eq!(moves.len(), 81 - 5);
        // Empty cells of the won mini-board are still available.
        assert!(moves.iter().any(|m| m.square().index() == 3));
    }

    #[test]
    fn full_mini_board_is_finished() {
        let position = from_marks(&[0, 2, 3, 7, 8], &[1, 4, 5, 6], Some(0), Player::O);
        assert!(!has_line(position.marks(Player::X).mini_board(0)));
        assert!(!has_line(position.marks(Player::O).mini_board(0)));
        assert!(position.is_finished(0));
        assert_eq!(position.generate_moves().len(), 81 - 9);
    }

    #[test]
    fn winning_the_game() {
        // X won mini-boards 0, 4 and 8 (diagonal) using their top rows.
        let x = [0, 1, 2, 36, 37, 38, 72, 73, 74];
        let position = from_marks(&x, &[10, 20, 30], Some(3), Player::O);
        assert_eq!(position.won_mini_boards(Player::X), 0b100_010_001);
        assert_eq!(position.winner(), Some(Player::X));
        assert!(position.is_game_over());
        assert!(position.generate_moves().is_empty());
        assert_eq!(position.result(Player::X), GameResult::Win);
        assert_eq!(position.result(Player::O), GameResult::Loss);
    }

    #[test]
    fn drawn_game() {
        // Every mini-board is full and the won mini-boards form no line for
        // either player.
        let mut x = vec![];
        let mut o = vec![];
        // Drawn 3x3 pattern (no lines): X O X / X O O / O X X.
        let drawn = [true, false, true, true, false, false, false, true, true];
        for mini_board in 0..9u8 {
            for (cell, &is_x) in drawn.iter().enumerate() {
                let index = mini_board * 9 + cell as u8;
                if is_x { x.push(index) } else { o.push(index) }
            }
        }
        let position = from_marks(&x, &o, Some(8), Player::O);
        assert_eq!(position.won_mini_boards(Player::X), 0);
        assert_eq!(position.won_mini_boards(Player::O), 0);
        assert!(position.is_game_over());
        assert_eq!(position.result(Player::X), GameResult::Draw);
        assert_eq!(position.result(Player::O), GameResult::Draw);
    }

    #[test]
    fn clone_is_independent() {
        let position = Position::starting();
        let mut clone = position.clone();
        play(&mut clone, &["0000"]);
        assert_eq!(position, Position::starting());
        assert_ne!(position, clone);
    }

    #[test]
    fn render_starting_position() {
        assert_eq!(
            Position::starting().to_string(),
            "!!!|!!!|!!!\n\
             !!!|!!!|!!!\n\
             !!!|!!!|!!!\n\
             ---+---+---\n\
             !!!|!!!|!!!\n\
             !!!|!!!|!!!\n\
             !!!|!!!|!!!\n\
             ---+---+---\n\
             !!!|!!!|!!!\n\
             !!!|!!!|!!!\n\
             !!!|!!!|!!!"
        );
    }

    #[test]
    fn render_after_moves() {
        let mut position = Position::starting();
        play(&mut position, &["0011", "1100"]);
        assert_eq!(
            position.to_string(),
            "!!!|   |   \n\
             !X!|   |   \n\
             !!!|   |   \n\
             ---+---+---\n\
             \x20  |O  |   \n\
             \x20  |   |   \n\
             \x20  |   |   \n\
             ---+---+---\n\
             \x20  |   |   \n\
             \x20  |   |   \n\
             \x20  |   |   "
        );
    }
}
