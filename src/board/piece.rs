/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::{Index, IndexMut, Not},
};

use super::{attacks, Bitboard, ParseError, Square};

/// Represents the color of a player or piece.
///
/// White moves first, so [`Color`] defaults to [`Color::White`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Color {
    #[default]
    White,
    Black,
}

impl Color {
    /// Number of color variants.
    pub const COUNT: usize = 2;

    /// An array of both colors, starting with White.
    #[inline(always)]
    pub const fn all() -> [Self; Self::COUNT] {
        [Self::White, Self::Black]
    }

    /// Returns the other [`Color`].
    ///
    /// # Example
    /// ```
    /// # use newt::Color;
    /// assert_eq!(Color::White.opponent(), Color::Black);
    /// assert_eq!(Color::Black.opponent(), Color::White);
    /// ```
    #[inline(always)]
    pub const fn opponent(&self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// The direction pawns of this color move along the board's ranks: `1` for White, `-1` for Black.
    #[inline(always)]
    pub const fn forward(&self) -> i8 {
        match self {
            Self::White => 1,
            Self::Black => -1,
        }
    }

    /// Parses the FEN side-to-move field, `w` or `b`.
    pub fn from_uci(color: &str) -> Result<Self, ParseError> {
        match color {
            "w" => Ok(Self::White),
            "b" => Ok(Self::Black),
            _ => Err(ParseError::InvalidSideToMove(color.to_string())),
        }
    }

    /// The FEN character of this color, `w` or `b`.
    #[inline(always)]
    pub const fn char(&self) -> char {
        match self {
            Self::White => 'w',
            Self::Black => 'b',
        }
    }

    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }
}

impl Not for Color {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self::Output {
        self.opponent()
    }
}

/// Represents the kind (or "role") of a chess piece, without a [`Color`].
///
/// The ordinal order is fixed and used to index tables.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Number of piece kinds.
    pub const COUNT: usize = 6;

    /// An array of all 6 [`PieceKind`]s, in ordinal order.
    #[inline(always)]
    pub const fn all() -> [Self; Self::COUNT] {
        [
            Self::Pawn,
            Self::Knight,
            Self::Bishop,
            Self::Rook,
            Self::Queen,
            Self::King,
        ]
    }

    /// The kinds a pawn may promote to, from least to most valuable.
    #[inline(always)]
    pub const fn promotions() -> [Self; 4] {
        [Self::Knight, Self::Bishop, Self::Rook, Self::Queen]
    }

    /// Creates a [`PieceKind`] from its ordinal.
    ///
    /// # Panics
    /// If `index` is not within `[0, 6)`.
    #[inline(always)]
    pub const fn from_index(index: usize) -> Self {
        Self::all()[index]
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Lowercase algebraic character of this kind.
    #[inline(always)]
    pub const fn char(&self) -> char {
        match self {
            Self::Pawn => 'p',
            Self::Knight => 'n',
            Self::Bishop => 'b',
            Self::Rook => 'r',
            Self::Queen => 'q',
            Self::King => 'k',
        }
    }

    /// Parses a [`PieceKind`] from an algebraic character of either case.
    #[inline(always)]
    pub const fn from_char(kind: char) -> Option<Self> {
        match kind.to_ascii_lowercase() {
            'p' => Some(Self::Pawn),
            'n' => Some(Self::Knight),
            'b' => Some(Self::Bishop),
            'r' => Some(Self::Rook),
            'q' => Some(Self::Queen),
            'k' => Some(Self::King),
            _ => None,
        }
    }

    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Pawn => "pawn",
            Self::Knight => "knight",
            Self::Bishop => "bishop",
            Self::Rook => "rook",
            Self::Queen => "queen",
            Self::King => "king",
        }
    }
}

/// A chess piece: a [`PieceKind`] with a [`Color`].
///
/// Every piece has a dense index of `color * 6 + kind`, which is how it is stored:
/// ```text
/// P N B R Q K p n b r q k
/// 0 1 2 3 4 5 6 7 8 9 10 11
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Piece(u8);

impl Piece {
    pub const WHITE_PAWN: Self = Self::new(Color::White, PieceKind::Pawn);
    pub const WHITE_KNIGHT: Self = Self::new(Color::White, PieceKind::Knight);
    pub const WHITE_BISHOP: Self = Self::new(Color::White, PieceKind::Bishop);
    pub const WHITE_ROOK: Self = Self::new(Color::White, PieceKind::Rook);
    pub const WHITE_QUEEN: Self = Self::new(Color::White, PieceKind::Queen);
    pub const WHITE_KING: Self = Self::new(Color::White, PieceKind::King);

    pub const BLACK_PAWN: Self = Self::new(Color::Black, PieceKind::Pawn);
    pub const BLACK_KNIGHT: Self = Self::new(Color::Black, PieceKind::Knight);
    pub const BLACK_BISHOP: Self = Self::new(Color::Black, PieceKind::Bishop);
    pub const BLACK_ROOK: Self = Self::new(Color::Black, PieceKind::Rook);
    pub const BLACK_QUEEN: Self = Self::new(Color::Black, PieceKind::Queen);
    pub const BLACK_KING: Self = Self::new(Color::Black, PieceKind::King);

    /// Number of unique pieces.
    pub const COUNT: usize = Color::COUNT * PieceKind::COUNT;

    /// All 12 pieces in index order.
    #[inline(always)]
    pub const fn all() -> [Self; Self::COUNT] {
        let mut pieces = [Self(0); Self::COUNT];
        let mut i = 0;
        while i < Self::COUNT {
            pieces[i] = Self(i as u8);
            i += 1;
        }
        pieces
    }

    /// Creates a new [`Piece`] from the given [`Color`] and [`PieceKind`].
    ///
    /// # Example
    /// ```
    /// # use newt::{Piece, Color, PieceKind};
    /// let black_knight = Piece::new(Color::Black, PieceKind::Knight);
    /// assert_eq!(black_knight.index(), 7);
    /// assert_eq!(black_knight.char(), 'n');
    /// ```
    #[inline(always)]
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self((color as u8) * PieceKind::COUNT as u8 + kind as u8)
    }

    /// Creates a [`Piece`] from its dense index, returning `None` if out of range.
    #[inline(always)]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    #[inline(always)]
    pub const fn color(&self) -> Color {
        if (self.0 as usize) < PieceKind::COUNT {
            Color::White
        } else {
            Color::Black
        }
    }

    #[inline(always)]
    pub const fn kind(&self) -> PieceKind {
        PieceKind::from_index(self.0 as usize % PieceKind::COUNT)
    }

    /// Dense index in `[0, 12)`.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Returns a piece of the same color with the new kind.
    #[inline(always)]
    pub const fn promoted(self, promotion: PieceKind) -> Self {
        Self::new(self.color(), promotion)
    }

    /// Parses a [`Piece`] from its algebraic code. Uppercase is White, lowercase is Black.
    ///
    /// # Example
    /// ```
    /// # use newt::{Piece, Color, PieceKind};
    /// assert_eq!(Piece::from_uci('Q'), Ok(Piece::WHITE_QUEEN));
    /// assert_eq!(Piece::from_uci('k'), Ok(Piece::BLACK_KING));
    /// assert!(Piece::from_uci('x').is_err());
    /// ```
    pub fn from_uci(piece: char) -> Result<Self, ParseError> {
        let kind = PieceKind::from_char(piece).ok_or(ParseError::InvalidPiece(piece))?;
        let color = if piece.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Ok(Self::new(color, kind))
    }

    /// Algebraic code of this piece: uppercase for White, lowercase for Black.
    #[inline(always)]
    pub const fn char(&self) -> char {
        let c = self.kind().char();
        match self.color() {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// Squares this piece attacks from `square`, given `occupancy` as the blockers.
    ///
    /// Dispatches through a table of attack functions indexed by [`Piece::index`].
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// let attacks = Piece::BLACK_PAWN.attacks(Square::E5, Bitboard::EMPTY_BOARD);
    /// assert_eq!(attacks, Square::D4.bitboard() | Square::F4);
    /// ```
    #[inline(always)]
    pub fn attacks(&self, square: Square, occupancy: Bitboard) -> Bitboard {
        attacks::ATTACK_FNS[self.index()](square, occupancy)
    }

    pub fn name(&self) -> String {
        format!("{} {}", self.color().name(), self.kind().name())
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" ({})", self.name(), self.index())
    }
}

macro_rules! impl_index_by {
    ($type:ty) => {
        impl<T> Index<$type> for [T; <$type>::COUNT] {
            type Output = T;
            #[inline(always)]
            fn index(&self, index: $type) -> &Self::Output {
                &self[index.index()]
            }
        }

        impl<T> IndexMut<$type> for [T; <$type>::COUNT] {
            #[inline(always)]
            fn index_mut(&mut self, index: $type) -> &mut Self::Output {
                &mut self[index.index()]
            }
        }
    };
}

impl_index_by!(Piece);
impl_index_by!(PieceKind);
impl_index_by!(Color);

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

impl fmt::Debug for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_registry_is_dense() {
        for (i, piece) in Piece::all().into_iter().enumerate() {
            assert_eq!(piece.index(), i);
            assert_eq!(piece.index(), piece.color().index() * 6 + piece.kind().index());
            assert_eq!(Piece::from_uci(piece.char()), Ok(piece));
        }
    }

    #[test]
    fn test_piece_codes() {
        let codes = Piece::all().map(|p| p.char()).iter().collect::<String>();
        assert_eq!(codes, "PNBRQKpnbrqk");
    }

    #[test]
    fn test_opponent_is_involution() {
        for color in Color::all() {
            assert_eq!(color.opponent().opponent(), color);
            assert_ne!(color.opponent(), color);
        }
    }
}
