//! Game primitives commonly used within [`crate::game`].

use std::fmt;
use std::ops::Not;

use anyhow::{bail, Context};

use crate::environment::Action;

/// Number of cells in a single mini-board and number of mini-boards.
pub const BOARD_WIDTH: u8 = 9;
/// Number of cells on the whole board.
pub const BOARD_SIZE: u8 = BOARD_WIDTH * BOARD_WIDTH;

/// The game is played between X (moving first) and O.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    X,
    O,
}

impl Player {
    /// Index used for per-player arrays.
    #[must_use]
    pub(super) const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::O => 1,
        }
    }
}

impl Not for Player {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::X => "X",
            Self::O => "O",
        })
    }
}

/// One of 81 cells. The index is `9 * mini_board + cell` where both mini-boards
/// and cells within them are numbered row by row:
///
/// ```
/// use uttt::game::core::Square;
///
/// let center = Square::new(4, 4).unwrap();
/// assert_eq!(center.index(), 40);
/// assert_eq!(center.mini_board(), 4);
/// assert_eq!(center.cell(), 4);
/// ```
///
/// Humans refer to squares with four digits from 0 to 2: the row and column of
/// the mini-board followed by the row and column of the cell inside it.
///
/// ```
/// use uttt::game::core::Square;
///
/// assert_eq!(Square::try_from("0000").unwrap().index(), 0);
/// assert_eq!(Square::try_from("1111").unwrap().index(), 40);
/// assert_eq!(Square::try_from("2222").unwrap().index(), 80);
/// assert_eq!(Square::try_from(40).unwrap().to_string(), "1111");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square(u8);

impl Square {
    /// Connects a mini-board and a cell within it.
    pub fn new(mini_board: u8, cell: u8) -> anyhow::Result<Self> {
        if mini_board >= BOARD_WIDTH || cell >= BOARD_WIDTH {
            bail!("mini-board and cell should be in 0..{BOARD_WIDTH}, got {mini_board} and {cell}");
        }
        Ok(Self(mini_board * BOARD_WIDTH + cell))
    }

    /// Returns the index in `0..81`.
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Returns the mini-board this square belongs to.
    #[must_use]
    pub const fn mini_board(self) -> u8 {
        self.0 / BOARD_WIDTH
    }

    /// Returns the position of this square within its mini-board. It is also
    /// the mini-board the opponent has to answer in.
    #[must_use]
    pub const fn cell(self) -> u8 {
        self.0 % BOARD_WIDTH
    }

    /// Iterates over all squares in index order.
    pub fn iter() -> impl Iterator<Item = Self> {
        (0..BOARD_SIZE).map(Self)
    }

    /// Constructs a square from an index that is known to be valid.
    pub(super) const fn from_index(index: u8) -> Self {
        debug_assert!(index < BOARD_SIZE);
        Self(index)
    }
}

impl TryFrom<u8> for Square {
    type Error = anyhow::Error;

    fn try_from(index: u8) -> anyhow::Result<Self> {
        if index >= BOARD_SIZE {
            bail!("square index should be in 0..{BOARD_SIZE}, got {index}");
        }
        Ok(Self(index))
    }
}

impl TryFrom<&str> for Square {
    type Error = anyhow::Error;

    /// Parses the four-digit human notation.
    fn try_from(notation: &str) -> anyhow::Result<Self> {
        let notation = notation.trim();
        if notation.len() != 4 {
            bail!("square should consist of 4 digits, got '{notation}'");
        }
        let mut index = 0;
        for digit in notation.chars() {
            let value = digit
                .to_digit(3)
                .with_context(|| format!("square digits should be 0, 1 or 2, got '{notation}'"))?;
            index = index * 3 + value;
        }
        Self::try_from(u8::try_from(index)?)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let index = self.0;
        write!(
            f,
            "{}{}{}{}",
            index / 27,
            index % 27 / 9,
            index % 9 / 3,
            index % 3
        )
    }
}

/// Placing the mark of `player` on `square`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    square: Square,
    player: Player,
}

impl Move {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn new(square: Square, player: Player) -> Self {
        Self { square, player }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn square(&self) -> Square {
        self.square
    }
}

impl Action for Move {
    type Player = Player;

    fn player(&self) -> Player {
        self.player
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.player, self.square)
    }
}
