//! Implementation of [Ultimate Tic-Tac-Toe] rules: nine classic 3x3 boards
//! arranged in a 3x3 grid. The cell of each move decides which mini-board the
//! opponent has to answer in, and the game is won by winning three mini-boards
//! in a row.
//!
//! [Ultimate Tic-Tac-Toe]: https://en.wikipedia.org/wiki/Ultimate_tic-tac-toe

pub mod bitboard;
pub mod core;
pub mod position;

pub use position::Position;
