//! [`Bitboard`]-based representation for [`crate::game::position::Position`].
//! All 81 cells fit into a single 128-bit integer, which makes checking a
//! mini-board for a winning line or collecting the empty cells a handful of
//! bit operations.
//!
//! [Bitboard]: https://www.chessprogramming.org/Bitboards

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

use itertools::Itertools;

use crate::game::core::{Square, BOARD_SIZE, BOARD_WIDTH};

/// Mask of the 9 cells of a single mini-board (or of the 9 mini-boards of the
/// whole board).
pub(super) const MINI_BOARD: u16 = 0b1_1111_1111;

/// Rows, columns and diagonals of a 3x3 grid, each as a 9-bit mask.
#[rustfmt::skip]
pub(super) const WINNING_LINES: [u16; 8] = [
    0b000_000_111, 0b000_111_000, 0b111_000_000,
    0b001_001_001, 0b010_010_010, 0b100_100_100,
    0b100_010_001, 0b001_010_100,
];

/// Returns `true` if the 9-bit `mask` contains a full line.
#[must_use]
pub(super) fn has_line(mask: u16) -> bool {
    WINNING_LINES.iter().any(|&line| mask & line == line)
}

/// Represents a set of cells. Bit `i` corresponds to the square with index
/// `i`, so each mini-board occupies 9 consecutive bits.
///
/// Bitboard is a thin wrapper around [u128].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Bitboard {
    bits: u128,
}

impl Bitboard {
    /// Constructs Bitboard from pre-calculated bits.
    #[must_use]
    pub const fn from_bits(bits: u128) -> Self {
        Self { bits }
    }

    /// Constructs a bitboard representing empty set of squares.
    #[must_use]
    pub const fn empty() -> Self {
        Self::from_bits(0)
    }

    /// Constructs a bitboard containing all 81 squares.
    #[must_use]
    pub const fn full() -> Self {
        Self::from_bits((1u128 << BOARD_SIZE) - 1)
    }

    /// Returns true if this bitboard contains given square.
    #[must_use]
    pub const fn is_set(self, square: Square) -> bool {
        (self.bits & (1u128 << square.index())) != 0
    }

    #[must_use]
    pub(super) const fn count_ones(self) -> u32 {
        self.bits.count_ones()
    }

    /// Returns the 9-bit occupancy of the given mini-board.
    #[must_use]
    pub(super) const fn mini_board(self, index: u8) -> u16 {
        ((self.bits >> (index * BOARD_WIDTH)) as u16) & MINI_BOARD
    }

    /// Bitboard with all cells of the given mini-board.
    #[must_use]
    pub(super) const fn mini_board_mask(index: u8) -> Self {
        Self::from_bits((MINI_BOARD as u128) << (index * BOARD_WIDTH))
    }

    /// An efficient way to iterate over the set squares.
    #[must_use]
    pub(super) const fn iter(self) -> BitboardIterator {
        BitboardIterator { bits: self.bits }
    }
}

impl fmt::Debug for Bitboard {
    /// Dumps the board the way it is rendered for humans: mini-boards are laid
    /// out in a 3x3 grid.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = (0..BOARD_WIDTH).map(|row| {
            let (band, cell_row) = (row / 3, row % 3);
            (0..3)
                .map(|column| {
                    let mini_board = band * 3 + column;
                    (0..3)
                        .map(|cell_column| {
                            let cell = cell_row * 3 + cell_column;
                            if self.mini_board(mini_board) & (1 << cell) == 0 {
                                '.'
                            } else {
                                '1'
                            }
                        })
                        .collect::<String>()
                })
                .join(" ")
        });
        write!(f, "{}", lines.chunks(3).into_iter().map(|mut band| band.join("\n")).join("\n\n"))
    }
}

impl BitOr for Bitboard {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.bits.bitor(rhs.bits))
    }
}

impl BitOrAssign for Bitboard {
    fn bitor_assign(&mut self, rhs: Self) {
        self.bits.bitor_assign(rhs.bits);
    }
}

impl BitAnd for Bitboard {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.bits.bitand(rhs.bits))
    }
}

impl Not for Bitboard {
    type Output = Self;

    /// Returns the complement within the 81 board squares.
    fn not(self) -> Self::Output {
        Self::from_bits(!self.bits & Self::full().bits)
    }
}

impl From<Square> for Bitboard {
    fn from(square: Square) -> Self {
        Self::from_bits(1u128 << square.index())
    }
}

/// Iterates over set squares in a given [Bitboard] from least significant 1
/// bits (LS1B) to most significant 1 bits (MS1B).
pub(super) struct BitboardIterator {
    bits: u128,
}

impl Iterator for BitboardIterator {
    type Item = Square;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bits == 0 {
            return None;
        }
        // Get the LS1B and consume it from the iterator.
        let next_index = self.bits.trailing_zeros();
        self.bits ^= 1 << next_index;
        // trailing_zeros() of a non-empty board is always below 81.
        Some(Square::from_index(next_index as u8))
    }
}
