/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, ops::Not};

use super::{File, Rank, Square};

/// A [`Bitboard`] represents a set of squares on the board as the bits of a `u64`.
///
/// Bit index 0 is `a1` and bit index 63 is `h8`
/// ([Little-Endian Rank-File Mapping](https://www.chessprogramming.org/Square_Mapping_Considerations#Little-Endian_Rank-File_Mapping)),
/// so a bitboard of the first rank looks like this:
/// ```text
/// . . . . . . . .
/// . . . . . . . .
/// . . . . . . . .
/// . . . . . . . .
/// . . . . . . . .
/// . . . . . . . .
/// . . . . . . . .
/// X X X X X X X X
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Bitboard(pub(crate) u64);

impl Bitboard {
    pub const FILE_A: Self = Self(0x0101010101010101);
    pub const FILE_H: Self = Self(0x8080808080808080);
    pub const NOT_FILE_A: Self = Self(0xfefefefefefefefe);
    pub const NOT_FILE_H: Self = Self(0x7f7f7f7f7f7f7f7f);
    pub const RANK_1: Self = Self(0x00000000000000FF);
    pub const RANK_2: Self = Self(0x000000000000FF00);
    pub const RANK_7: Self = Self(0x00FF000000000000);
    pub const RANK_8: Self = Self(0xFF00000000000000);
    pub const A1_H8_DIAG: Self = Self(0x8040201008040201);
    pub const EMPTY_BOARD: Self = Self(0x0000000000000000);
    pub const FULL_BOARD: Self = Self(0xFFFFFFFFFFFFFFFF);
    pub const EDGES: Self = Self(0xFF818181818181FF);

    /// Constructs a new [`Bitboard`] from the provided bit pattern.
    ///
    /// # Example
    /// ```
    /// # use newt::Bitboard;
    /// let board = Bitboard::new(255);
    /// assert_eq!(board.inner(), 0xFF);
    /// ```
    #[inline(always)]
    pub const fn new(bits: u64) -> Self {
        Self(bits)
    }

    /// Constructs a new [`Bitboard`] with only the bit of `square` set.
    ///
    /// # Example
    /// ```
    /// # use newt::{Bitboard, Square};
    /// let board = Bitboard::from_square(Square::H8);
    /// assert_eq!(board.inner(), 1 << 63);
    /// ```
    #[inline(always)]
    pub const fn from_square(square: Square) -> Self {
        Self(1 << square.index())
    }

    /// Constructs a new [`Bitboard`] with every square of `rank` set.
    ///
    /// # Example
    /// ```
    /// # use newt::{Bitboard, Rank};
    /// assert_eq!(Bitboard::from_rank(Rank::SEVEN), Bitboard::RANK_7);
    /// ```
    #[inline(always)]
    pub const fn from_rank(rank: Rank) -> Self {
        Self(Self::RANK_1.0 << (rank.0 * 8))
    }

    /// Fetches the inner `u64` of this [`Bitboard`].
    #[inline(always)]
    pub const fn inner(&self) -> u64 {
        self.0
    }

    /// Returns `true` if no squares are set.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if at least one square is set.
    #[inline(always)]
    pub const fn is_nonempty(&self) -> bool {
        self.0 != 0
    }

    /// Returns `true` if `self` and `other` share at least one square.
    #[inline(always)]
    pub fn intersects(&self, other: impl Into<Self>) -> bool {
        (*self & other.into()).is_nonempty()
    }

    /// Returns `true` if `square` is set.
    ///
    /// # Example
    /// ```
    /// # use newt::{Bitboard, Square};
    /// assert!(Bitboard::RANK_1.get(Square::C1));
    /// assert!(!Bitboard::RANK_1.get(Square::C2));
    /// ```
    #[inline(always)]
    pub const fn get(&self, square: Square) -> bool {
        self.0 & (1 << square.index()) != 0
    }

    /// Sets all squares of `other` in `self`.
    #[inline(always)]
    pub fn set(&mut self, other: impl Into<Self>) {
        *self |= other.into()
    }

    /// Toggles all squares of `other` in `self`.
    #[inline(always)]
    pub fn toggle(&mut self, other: impl Into<Self>) {
        *self ^= other.into()
    }

    /// Clears all squares of `other` from `self`.
    #[inline(always)]
    pub fn clear(&mut self, other: impl Into<Self>) {
        *self &= !other.into()
    }

    /// Returns the lowest set [`Square`], or `None` if empty.
    ///
    /// # Example
    /// ```
    /// # use newt::{Bitboard, Square};
    /// assert_eq!(Bitboard::RANK_8.lsb(), Some(Square::A8));
    /// assert_eq!(Bitboard::EMPTY_BOARD.lsb(), None);
    /// ```
    #[inline(always)]
    pub const fn lsb(&self) -> Option<Square> {
        if self.is_empty() {
            None
        } else {
            Some(Square(self.0.trailing_zeros() as u8))
        }
    }

    /// Removes and returns the lowest set [`Square`], or `None` if empty.
    ///
    /// # Example
    /// ```
    /// # use newt::{Bitboard, Square};
    /// let mut board = Square::B2.bitboard() | Square::G7;
    /// assert_eq!(board.pop_lsb(), Some(Square::B2));
    /// assert_eq!(board.pop_lsb(), Some(Square::G7));
    /// assert_eq!(board.pop_lsb(), None);
    /// ```
    #[inline(always)]
    pub fn pop_lsb(&mut self) -> Option<Square> {
        let lsb = self.lsb();
        self.clear_lsb();
        lsb
    }

    /// Clears the lowest set bit. Does nothing on an empty board.
    #[inline(always)]
    pub fn clear_lsb(&mut self) {
        self.0 &= self.0.wrapping_sub(1);
    }

    /// An iterator over the set squares, from lowest to highest.
    ///
    /// The iterator works on a copy, so `self` is left untouched and may be iterated again.
    #[inline(always)]
    pub const fn iter(&self) -> BitboardIter {
        BitboardIter { bitboard: *self }
    }

    /// An iterator over every subset of `self`, starting with the empty set and ending with `self`.
    ///
    /// # Example
    /// ```
    /// # use newt::{Bitboard, Square};
    /// let board = Square::A1.bitboard() | Square::B1 | Square::C1;
    /// assert_eq!(board.subsets().count(), 8);
    /// assert_eq!(board.subsets().last(), Some(board));
    /// ```
    #[inline(always)]
    pub const fn subsets(&self) -> BitboardSubsetIter {
        BitboardSubsetIter {
            bitboard: *self,
            subset: Self::EMPTY_BOARD,
            remaining: 1usize << self.population(),
        }
    }

    /// Number of set squares.
    #[inline(always)]
    pub const fn population(&self) -> u8 {
        self.0.count_ones() as u8
    }

    /// Shifts every square one rank up.
    #[inline(always)]
    pub const fn north(self) -> Self {
        Self(self.0 << 8)
    }

    /// Shifts every square one rank down.
    #[inline(always)]
    pub const fn south(self) -> Self {
        Self(self.0 >> 8)
    }

    /// Shifts every square one file right. Squares on the h-file fall off.
    ///
    /// # Example
    /// ```
    /// # use newt::{Bitboard, Square};
    /// assert_eq!(Square::H4.bitboard().east(), Bitboard::EMPTY_BOARD);
    /// assert_eq!(Square::G4.bitboard().east(), Square::H4.bitboard());
    /// ```
    #[inline(always)]
    pub const fn east(self) -> Self {
        // Post-shift mask
        Self((self.0 << 1) & Self::NOT_FILE_A.0)
    }

    /// Shifts every square one file left. Squares on the a-file fall off.
    #[inline(always)]
    pub const fn west(self) -> Self {
        Self((self.0 >> 1) & Self::NOT_FILE_H.0)
    }

    #[inline(always)]
    pub const fn northeast(self) -> Self {
        Self((self.0 << 9) & Self::NOT_FILE_A.0)
    }

    #[inline(always)]
    pub const fn southeast(self) -> Self {
        Self((self.0 >> 7) & Self::NOT_FILE_A.0)
    }

    #[inline(always)]
    pub const fn northwest(self) -> Self {
        Self((self.0 << 7) & Self::NOT_FILE_H.0)
    }

    #[inline(always)]
    pub const fn southwest(self) -> Self {
        Self((self.0 >> 9) & Self::NOT_FILE_H.0)
    }

    #[inline(always)]
    pub const fn and(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    #[inline(always)]
    pub const fn or(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl FromIterator<Square> for Bitboard {
    fn from_iter<T: IntoIterator<Item = Square>>(iter: T) -> Self {
        iter.into_iter().fold(Self::default(), |bb, sq| bb | sq)
    }
}

macro_rules! impl_bitwise_op {
    ($op:tt, $op_assign:tt, $func:ident, $func_assign:ident) => {
        impl<T> std::ops::$op<T> for Bitboard
        where
            Self: From<T>,
        {
            type Output = Self;
            #[inline(always)]
            fn $func(self, rhs: T) -> Self::Output {
                Self(self.0.$func(Self::from(rhs).0))
            }
        }

        impl<T> std::ops::$op_assign<T> for Bitboard
        where
            Self: From<T>,
        {
            #[inline(always)]
            fn $func_assign(&mut self, rhs: T) {
                self.0.$func_assign(Self::from(rhs).0);
            }
        }
    };
}

impl_bitwise_op!(BitAnd, BitAndAssign, bitand, bitand_assign);
impl_bitwise_op!(BitOr, BitOrAssign, bitor, bitor_assign);
impl_bitwise_op!(BitXor, BitXorAssign, bitxor, bitxor_assign);

impl Not for Bitboard {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self::Output {
        Self(!self.0)
    }
}

impl From<Square> for Bitboard {
    #[inline(always)]
    fn from(value: Square) -> Self {
        Self::from_square(value)
    }
}

impl From<u64> for Bitboard {
    #[inline(always)]
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl Default for Bitboard {
    #[inline(always)]
    fn default() -> Self {
        Self::EMPTY_BOARD
    }
}

impl fmt::Display for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            for file in File::iter() {
                let occupant = if self.get(Square::new(file, rank)) {
                    'X'
                } else {
                    '.'
                };
                write!(f, "{occupant} ")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            write!(f, "{rank}| ")?;
            for file in File::iter() {
                let occupant = if self.get(Square::new(file, rank)) {
                    'X'
                } else {
                    '.'
                };
                write!(f, "{occupant} ")?;
            }
            writeln!(f)?;
        }
        write!(f, " +{}\n   ", "--".repeat(File::COUNT))?;
        for file in File::iter() {
            write!(f, "{file} ")?;
        }

        Ok(())
    }
}

/// An iterator over the [`Square`]s of a [`Bitboard`].
pub struct BitboardIter {
    bitboard: Bitboard,
}

impl Iterator for BitboardIter {
    type Item = Square;
    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        self.bitboard.pop_lsb()
    }

    #[inline(always)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let size = self.bitboard.population() as usize;
        (size, Some(size))
    }
}

impl ExactSizeIterator for BitboardIter {
    #[inline(always)]
    fn len(&self) -> usize {
        self.bitboard.population() as usize
    }
}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = BitboardIter;
    #[inline(always)]
    fn into_iter(self) -> Self::IntoIter {
        BitboardIter { bitboard: self }
    }
}

impl IntoIterator for &Bitboard {
    type Item = Square;
    type IntoIter = BitboardIter;
    #[inline(always)]
    fn into_iter(self) -> Self::IntoIter {
        BitboardIter { bitboard: *self }
    }
}

/// An iterator over all subsets of a [`Bitboard`].
pub struct BitboardSubsetIter {
    /// The set whose subsets are being enumerated.
    bitboard: Bitboard,

    /// The next subset to yield.
    subset: Bitboard,

    /// Number of subsets left to yield.
    remaining: usize,
}

impl Iterator for BitboardSubsetIter {
    type Item = Bitboard;
    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let subset = self.subset;

        // Carry-Rippler: https://www.chessprogramming.org/Traversing_Subsets_of_a_Set#All_Subsets_of_any_Set
        self.subset.0 = self.subset.0.wrapping_sub(self.bitboard.0) & self.bitboard.0;
        self.remaining -= 1;

        Some(subset)
    }

    #[inline(always)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for BitboardSubsetIter {
    #[inline(always)]
    fn len(&self) -> usize {
        self.remaining
    }
}
