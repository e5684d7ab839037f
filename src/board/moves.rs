/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use super::{Piece, Square};

/// Maximum number of pseudo-legal moves stored for a single position.
///
/// No reachable position comes close to this, but pseudo-legal lists of contrived positions can exceed the 218 legal-move record.
pub const MAX_NUM_MOVES: usize = 256;

/// An alias for an [`arrayvec::ArrayVec`] containing at most [`MAX_NUM_MOVES`] moves.
///
/// Pushing past capacity panics.
pub type MoveList = arrayvec::ArrayVec<Move, MAX_NUM_MOVES>;

/// Represents a single ply: a piece moving from one square to another, along with everything needed to apply it.
///
/// Internally, this is packed into a `u32`:
/// ```text
///     000 0000 0000 0000 000000 000000
///      |    |    |    |     |      |
///      |    |    |    |     |      +- Source square of the move.
///      |    |    |    |     +- Target square of the move.
///      |    |    |    +- Index of the moving piece.
///      |    |    +- Index of the captured piece, plus one (zero if none).
///      |    +- Index of the promoted-to piece, plus one (zero if none).
///      +- Flags: double push, en passant, castle.
/// ```
///
/// A move only makes sense relative to the position it was generated from.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Move(u32);

impl Move {
    const SRC_MASK: u32 = 0x3F;
    const DST_BITS: u32 = 6;
    const PIECE_BITS: u32 = 12;
    const CAPTURED_BITS: u32 = 16;
    const PROMOTED_BITS: u32 = 20;
    const NIBBLE: u32 = 0xF;

    const FLAG_DOUBLE_PUSH: u32 = 1 << 24;
    const FLAG_EN_PASSANT: u32 = 1 << 25;
    const FLAG_CASTLE: u32 = 1 << 26;

    /// The "null" move: every bit is zero.
    ///
    /// It is used to signal "no move", and never equals a generated move, since those always have differing source and target squares.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// assert!(Move::NULL.is_null());
    /// assert_eq!(Move::NULL.to_string(), "0000");
    /// ```
    pub const NULL: Self = Self(0);

    /// Packs a new [`Move`].
    ///
    /// Whether the move is a capture or a promotion is derived from `captured` and `promoted`.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// let e2e4 = Move::new(Square::E2, Square::E4, Piece::WHITE_PAWN, None, None, true, false, false);
    /// assert_eq!(e2e4.to_string(), "e2e4");
    /// assert!(e2e4.is_double_push());
    /// assert!(e2e4.is_quiet());
    ///
    /// let promote = Move::new(Square::E7, Square::D8, Piece::WHITE_PAWN, Some(Piece::BLACK_ROOK), Some(Piece::WHITE_KNIGHT), false, false, false);
    /// assert_eq!(promote.to_string(), "e7d8n");
    /// assert!(promote.is_capture() && promote.is_promotion());
    /// ```
    #[allow(clippy::too_many_arguments)]
    #[inline(always)]
    pub const fn new(
        from: Square,
        to: Square,
        piece: Piece,
        captured: Option<Piece>,
        promoted: Option<Piece>,
        double_push: bool,
        en_passant: bool,
        castle: bool,
    ) -> Self {
        let mut bits = from.inner() as u32
            | (to.inner() as u32) << Self::DST_BITS
            | (piece.index() as u32) << Self::PIECE_BITS;

        if let Some(captured) = captured {
            bits |= (captured.index() as u32 + 1) << Self::CAPTURED_BITS;
        }
        if let Some(promoted) = promoted {
            bits |= (promoted.index() as u32 + 1) << Self::PROMOTED_BITS;
        }
        if double_push {
            bits |= Self::FLAG_DOUBLE_PUSH;
        }
        if en_passant {
            bits |= Self::FLAG_EN_PASSANT;
        }
        if castle {
            bits |= Self::FLAG_CASTLE;
        }

        Self(bits)
    }

    /// A move with no captured piece, promotion, or flags.
    #[inline(always)]
    pub const fn quiet(from: Square, to: Square, piece: Piece) -> Self {
        Self::new(from, to, piece, None, None, false, false, false)
    }

    /// The raw packed bits of this move.
    #[inline(always)]
    pub const fn inner(&self) -> u32 {
        self.0
    }

    /// Returns `true` if this is [`Move::NULL`].
    #[inline(always)]
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Source square.
    #[inline(always)]
    pub const fn from(&self) -> Square {
        Square::from_index_unchecked((self.0 & Self::SRC_MASK) as usize)
    }

    /// Target square.
    #[inline(always)]
    pub const fn to(&self) -> Square {
        Square::from_index_unchecked(((self.0 >> Self::DST_BITS) & Self::SRC_MASK) as usize)
    }

    /// The piece being moved.
    #[inline(always)]
    pub const fn piece(&self) -> Piece {
        match Piece::from_index(((self.0 >> Self::PIECE_BITS) & Self::NIBBLE) as usize) {
            Some(piece) => piece,
            // Only reachable for bit patterns that `Move::new` never produces
            None => Piece::WHITE_PAWN,
        }
    }

    /// The piece being captured, if any.
    ///
    /// For en passant, this is the pawn that was passed, even though it does not stand on the target square.
    #[inline(always)]
    pub const fn captured(&self) -> Option<Piece> {
        Self::decode_optional((self.0 >> Self::CAPTURED_BITS) & Self::NIBBLE)
    }

    /// The piece this move promotes to, if any.
    #[inline(always)]
    pub const fn promotion(&self) -> Option<Piece> {
        Self::decode_optional((self.0 >> Self::PROMOTED_BITS) & Self::NIBBLE)
    }

    #[inline(always)]
    pub const fn is_capture(&self) -> bool {
        self.0 & (Self::NIBBLE << Self::CAPTURED_BITS) != 0
    }

    #[inline(always)]
    pub const fn is_promotion(&self) -> bool {
        self.0 & (Self::NIBBLE << Self::PROMOTED_BITS) != 0
    }

    /// Returns `true` if this is neither a capture nor a promotion.
    ///
    /// Castling and double pushes are quiet.
    #[inline(always)]
    pub const fn is_quiet(&self) -> bool {
        !self.is_capture() && !self.is_promotion()
    }

    #[inline(always)]
    pub const fn is_double_push(&self) -> bool {
        self.0 & Self::FLAG_DOUBLE_PUSH != 0
    }

    #[inline(always)]
    pub const fn is_en_passant(&self) -> bool {
        self.0 & Self::FLAG_EN_PASSANT != 0
    }

    /// Returns `true` if this is the King's two-square castling move.
    #[inline(always)]
    pub const fn is_castle(&self) -> bool {
        self.0 & Self::FLAG_CASTLE != 0
    }

    #[inline(always)]
    const fn decode_optional(nibble: u32) -> Option<Piece> {
        if nibble == 0 {
            None
        } else {
            Piece::from_index(nibble as usize - 1)
        }
    }
}

impl fmt::Display for Move {
    /// A [`Move`] is displayed in coordinate notation, such as `e2e4` or `e7e8q`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return write!(f, "0000");
        }

        write!(f, "{}{}", self.from(), self.to())?;
        if let Some(promotion) = self.promotion() {
            write!(f, "{}", promotion.kind())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self} ({}", self.piece().name())?;
        if let Some(captured) = self.captured() {
            write!(f, " takes {}", captured.name())?;
        }
        if self.is_double_push() {
            write!(f, ", double push")?;
        }
        if self.is_en_passant() {
            write!(f, ", en passant")?;
        }
        if self.is_castle() {
            write!(f, ", castle")?;
        }
        write!(f, ")")
    }
}

impl Default for Move {
    /// Same as [`Move::NULL`].
    #[inline(always)]
    fn default() -> Self {
        Self::NULL
    }
}

impl<T: AsRef<str>> PartialEq<T> for Move {
    #[inline(always)]
    fn eq(&self, other: &T) -> bool {
        self.to_string().eq(other.as_ref())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fields_are_independent() {
        let mv = Move::new(
            Square::H7,
            Square::G8,
            Piece::WHITE_PAWN,
            Some(Piece::BLACK_KNIGHT),
            Some(Piece::WHITE_QUEEN),
            false,
            false,
            false,
        );

        assert_eq!(mv.from(), Square::H7);
        assert_eq!(mv.to(), Square::G8);
        assert_eq!(mv.piece(), Piece::WHITE_PAWN);
        assert_eq!(mv.captured(), Some(Piece::BLACK_KNIGHT));
        assert_eq!(mv.promotion(), Some(Piece::WHITE_QUEEN));
        assert!(!mv.is_double_push() && !mv.is_en_passant() && !mv.is_castle());
        assert_eq!(mv, "h7g8q");
    }

    #[test]
    fn test_captured_white_pawn_is_not_confused_with_no_capture() {
        // White pawn has index 0, which is why the captured field is offset by one
        let mv = Move::new(
            Square::D5,
            Square::E4,
            Piece::BLACK_PAWN,
            Some(Piece::WHITE_PAWN),
            None,
            false,
            false,
            false,
        );
        assert!(mv.is_capture());
        assert_eq!(mv.captured(), Some(Piece::WHITE_PAWN));
        assert!(!mv.is_promotion());
    }

    #[test]
    fn test_flags() {
        let castle = Move::new(
            Square::E8,
            Square::C8,
            Piece::BLACK_KING,
            None,
            None,
            false,
            false,
            true,
        );
        assert!(castle.is_castle());
        assert!(castle.is_quiet());

        let ep = Move::new(
            Square::E5,
            Square::D6,
            Piece::WHITE_PAWN,
            Some(Piece::BLACK_PAWN),
            None,
            false,
            true,
            false,
        );
        assert!(ep.is_en_passant());
        assert!(ep.is_capture());
        assert!(!ep.is_castle());
    }

    #[test]
    fn test_null_differs_from_real_moves() {
        let a1b1 = Move::quiet(Square::A1, Square::B1, Piece::WHITE_PAWN);
        assert_ne!(a1b1, Move::NULL);
        assert!(!a1b1.is_null());
        assert_eq!(Move::default(), Move::NULL);
    }
}
