/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use super::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks, Bitboard, Color,
    File, Move, MoveList, ParseError, Piece, PieceKind, Rank, Square, ZobristKey, FEN_STARTPOS,
};

/// The castling rights of both players, as a 4-bit mask.
///
/// ```text
///     0000
///     ||||
///     |||+- White may castle kingside
///     ||+-- White may castle queenside
///     |+--- Black may castle kingside
///     +---- Black may castle queenside
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const WHITE_KINGSIDE: Self = Self(0b0001);
    pub const WHITE_QUEENSIDE: Self = Self(0b0010);
    pub const BLACK_KINGSIDE: Self = Self(0b0100);
    pub const BLACK_QUEENSIDE: Self = Self(0b1000);
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(0b1111);

    /// Number of possible combinations of castling rights.
    pub const COUNT: usize = 16;

    /// Creates a new set of rights from the lower 4 bits of `bits`.
    #[inline(always)]
    pub const fn new(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    #[inline(always)]
    pub const fn inner(&self) -> u8 {
        self.0
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Returns `true` if every right in `other` is also held by `self`.
    #[inline(always)]
    pub const fn has(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Keeps only the rights that are also in `mask`.
    #[inline(always)]
    pub const fn masked(self, mask: Self) -> Self {
        Self(self.0 & mask.0)
    }

    /// The kingside right of `color`.
    #[inline(always)]
    pub const fn kingside(color: Color) -> Self {
        match color {
            Color::White => Self::WHITE_KINGSIDE,
            Color::Black => Self::BLACK_KINGSIDE,
        }
    }

    /// The queenside right of `color`.
    #[inline(always)]
    pub const fn queenside(color: Color) -> Self {
        match color {
            Color::White => Self::WHITE_QUEENSIDE,
            Color::Black => Self::BLACK_QUEENSIDE,
        }
    }

    /// Parses castling rights from the castling field of a FEN string.
    ///
    /// # Example
    /// ```
    /// # use newt::CastlingRights;
    /// assert_eq!(CastlingRights::from_uci("KQkq"), Ok(CastlingRights::ALL));
    /// assert_eq!(CastlingRights::from_uci("-"), Ok(CastlingRights::NONE));
    /// assert_eq!(CastlingRights::from_uci("qK"), CastlingRights::from_uci("Kq"));
    /// assert!(CastlingRights::from_uci("KX").is_err());
    /// assert!(CastlingRights::from_uci("KK").is_err());
    /// ```
    pub fn from_uci(castling: &str) -> Result<Self, ParseError> {
        if castling == "-" {
            return Ok(Self::NONE);
        }

        let err = || ParseError::InvalidCastling(castling.to_string());
        if castling.is_empty() {
            return Err(err());
        }

        let mut rights = Self::NONE;
        for c in castling.chars() {
            let right = match c {
                'K' => Self::WHITE_KINGSIDE,
                'Q' => Self::WHITE_QUEENSIDE,
                'k' => Self::BLACK_KINGSIDE,
                'q' => Self::BLACK_QUEENSIDE,
                _ => return Err(err()),
            };
            if rights.has(right) {
                return Err(err());
            }
            rights.0 |= right.0;
        }

        Ok(rights)
    }
}

impl fmt::Display for CastlingRights {
    /// Formats the rights as they appear in a FEN string, such as `KQkq` or `-`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::NONE {
            return write!(f, "-");
        }

        for (right, c) in [
            (Self::WHITE_KINGSIDE, 'K'),
            (Self::WHITE_QUEENSIDE, 'Q'),
            (Self::BLACK_KINGSIDE, 'k'),
            (Self::BLACK_QUEENSIDE, 'q'),
        ] {
            if self.has(right) {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self} ({:#06b})", self.0)
    }
}

/// Rights that survive a move touching each square.
///
/// Any move from or onto a King's or Rook's home square revokes the rights that depend on it,
/// which covers a Rook being captured before it ever moved.
const CASTLING_MASKS: [CastlingRights; Square::COUNT] = {
    let mut masks = [CastlingRights::ALL; Square::COUNT];
    let all = CastlingRights::ALL.0;

    masks[Square::A1.index()] = CastlingRights(all & !CastlingRights::WHITE_QUEENSIDE.0);
    masks[Square::E1.index()] = CastlingRights(
        all & !(CastlingRights::WHITE_KINGSIDE.0 | CastlingRights::WHITE_QUEENSIDE.0),
    );
    masks[Square::H1.index()] = CastlingRights(all & !CastlingRights::WHITE_KINGSIDE.0);
    masks[Square::A8.index()] = CastlingRights(all & !CastlingRights::BLACK_QUEENSIDE.0);
    masks[Square::E8.index()] = CastlingRights(
        all & !(CastlingRights::BLACK_KINGSIDE.0 | CastlingRights::BLACK_QUEENSIDE.0),
    );
    masks[Square::H8.index()] = CastlingRights(all & !CastlingRights::BLACK_KINGSIDE.0);

    masks
};

/// Where the Rook goes when the King castles onto `king_to`.
#[inline(always)]
const fn castling_rook_squares(king_to: Square) -> Option<(Square, Square)> {
    match king_to {
        Square::G1 => Some((Square::H1, Square::F1)),
        Square::C1 => Some((Square::A1, Square::D1)),
        Square::G8 => Some((Square::H8, Square::F8)),
        Square::C8 => Some((Square::A8, Square::D8)),
        _ => None,
    }
}

/// A chess position: where every piece is, whose turn it is, and what special moves are available.
///
/// A [`Position`] is small and [`Copy`], so the search explores by copying a position and making a move on the copy.
/// Its [`ZobristKey`] is maintained incrementally by every mutation.
///
/// Move counters are validated when parsing, but not stored.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// One [`Bitboard`] for each [`Color`].
    colors: [Bitboard; Color::COUNT],

    /// One [`Bitboard`] for each [`PieceKind`].
    kinds: [Bitboard; PieceKind::COUNT],

    side_to_move: Color,

    castling_rights: CastlingRights,

    /// Square a pawn skipped over on the previous move, if it was a double push.
    ep_square: Option<Square>,

    key: ZobristKey,
}

impl Position {
    /// An empty board with White to move and no castling rights.
    fn empty() -> Self {
        Self {
            colors: [Bitboard::EMPTY_BOARD; Color::COUNT],
            kinds: [Bitboard::EMPTY_BOARD; PieceKind::COUNT],
            side_to_move: Color::White,
            castling_rights: CastlingRights::NONE,
            ep_square: None,
            key: ZobristKey::default(),
        }
    }

    /// Creates a new [`Position`] from the provided FEN string.
    ///
    /// The halfmove and fullmove counters are optional.
    /// Only malformed text is rejected: a position may lack a King, and an en passant target is not checked against the board.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// let pos = Position::from_fen("8/8/8/8/8/8/8/4K2k w - - 0 1").unwrap();
    /// assert_eq!(pos.piece_at(Square::E1), Some(Piece::WHITE_KING));
    ///
    /// assert!(Position::from_fen("8/8/8/8/8/8/8/4K2k x - -").is_err());
    /// ```
    pub fn from_fen(fen: &str) -> Result<Self, ParseError> {
        let mut fields = fen.split_whitespace();

        let placement = fields
            .next()
            .ok_or(ParseError::MissingField("piece placement"))?;
        let side = fields
            .next()
            .ok_or(ParseError::MissingField("side to move"))?;
        let castling = fields
            .next()
            .ok_or(ParseError::MissingField("castling rights"))?;
        let ep = fields
            .next()
            .ok_or(ParseError::MissingField("en passant square"))?;

        // Counters are validated, then dropped
        if let Some(halfmove) = fields.next() {
            halfmove
                .parse::<u16>()
                .map_err(|_| ParseError::InvalidCounter(halfmove.to_string()))?;
        }
        if let Some(fullmove) = fields.next() {
            fullmove
                .parse::<u16>()
                .map_err(|_| ParseError::InvalidCounter(fullmove.to_string()))?;
        }

        let rest = fields.collect::<Vec<_>>();
        if !rest.is_empty() {
            return Err(ParseError::TrailingInput(rest.join(" ")));
        }

        let mut pos = Self::empty();
        pos.parse_placement(placement)?;
        pos.side_to_move = Color::from_uci(side)?;
        pos.castling_rights = CastlingRights::from_uci(castling)?;
        // A target no pawn can use is kept as written; move generation ignores it
        pos.ep_square = match ep {
            "-" => None,
            _ => Some(Square::from_uci(ep)?),
        };

        pos.key = ZobristKey::new(&pos);
        Ok(pos)
    }

    /// Places pieces according to the placement field of a FEN string.
    fn parse_placement(&mut self, placement: &str) -> Result<(), ParseError> {
        let err = |reason| ParseError::InvalidPlacement(placement.to_string(), reason);

        let ranks = placement.split('/').collect::<Vec<_>>();
        if ranks.len() != Rank::COUNT {
            return Err(err("expected 8 ranks separated by `/`"));
        }

        // FEN lists rank 8 first
        for (rank, pieces) in Rank::iter().rev().zip(ranks) {
            let mut file = 0;
            for c in pieces.chars() {
                if let Some(empty) = c.to_digit(10).filter(|n| (1..=8).contains(n)) {
                    file += empty as usize;
                } else {
                    let piece = Piece::from_uci(c)?;
                    if file >= File::COUNT {
                        return Err(err("a rank describes more than 8 squares"));
                    }
                    self.place(piece, Square::new(File::new_unchecked(file as u8), rank));
                    file += 1;
                }

                if file > File::COUNT {
                    return Err(err("a rank describes more than 8 squares"));
                }
            }

            if file != File::COUNT {
                return Err(err("a rank describes fewer than 8 squares"));
            }
        }

        Ok(())
    }

    /// Renders this position as a FEN string.
    ///
    /// Move counters are not tracked, so they are always `0 1`.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// assert_eq!(Position::default().to_fen(), FEN_STARTPOS);
    /// ```
    pub fn to_fen(&self) -> String {
        let mut placement = String::with_capacity(72);

        for rank in Rank::iter().rev() {
            let mut empty = 0;
            for file in File::iter() {
                match self.piece_at(Square::new(file, rank)) {
                    Some(piece) => {
                        if empty > 0 {
                            placement.push_str(&empty.to_string());
                            empty = 0;
                        }
                        placement.push(piece.char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                placement.push_str(&empty.to_string());
            }
            if rank != Rank::ONE {
                placement.push('/');
            }
        }

        let ep = self
            .ep_square
            .map(|sq| sq.to_string())
            .unwrap_or(String::from("-"));

        format!(
            "{placement} {} {} {ep} 0 1",
            self.side_to_move, self.castling_rights
        )
    }

    #[inline(always)]
    pub const fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline(always)]
    pub const fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    #[inline(always)]
    pub const fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    /// The incrementally maintained Zobrist key of this position.
    #[inline(always)]
    pub const fn key(&self) -> ZobristKey {
        self.key
    }

    /// All squares occupied by `color`.
    #[inline(always)]
    pub const fn color(&self, color: Color) -> Bitboard {
        self.colors[color.index()]
    }

    /// All squares occupied by pieces of `kind`, of either color.
    #[inline(always)]
    pub const fn kind(&self, kind: PieceKind) -> Bitboard {
        self.kinds[kind.index()]
    }

    /// All squares occupied by `piece`.
    #[inline(always)]
    pub const fn piece_bb(&self, piece: Piece) -> Bitboard {
        self.color(piece.color()).and(self.kind(piece.kind()))
    }

    /// All occupied squares.
    #[inline(always)]
    pub const fn occupied(&self) -> Bitboard {
        self.colors[0].or(self.colors[1])
    }

    #[inline(always)]
    pub const fn is_occupied(&self, square: Square) -> bool {
        self.occupied().get(square)
    }

    /// The piece standing on `square`, if any.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// let pos = Position::default();
    /// assert_eq!(pos.piece_at(Square::D8), Some(Piece::BLACK_QUEEN));
    /// assert_eq!(pos.piece_at(Square::D4), None);
    /// ```
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        let color = Color::all()
            .into_iter()
            .find(|&color| self.color(color).get(square))?;
        let kind = PieceKind::all()
            .into_iter()
            .find(|&kind| self.kind(kind).get(square))?;
        Some(Piece::new(color, kind))
    }

    /// The square of `color`'s King.
    ///
    /// `None` if `color` has no King, which a FEN may describe. Such a side is never in check.
    #[inline(always)]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        let kings = self.piece_bb(Piece::new(color, PieceKind::King));
        debug_assert!(kings.population() <= 1, "{color} has more than one King");
        kings.lsb()
    }

    /// Returns `true` if `color` has anything besides pawns and the King.
    #[inline(always)]
    pub fn has_non_pawn_material(&self, color: Color) -> bool {
        let pawns_and_king = self.kind(PieceKind::Pawn) | self.kind(PieceKind::King);
        (self.color(color) & !pawns_and_king).is_nonempty()
    }

    /// Returns `true` if any piece of color `by` attacks `square`.
    ///
    /// Each piece kind's attacks are cast *from* `square` and intersected with where `by`'s pieces of that kind stand.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// let pos = Position::default();
    /// assert!(pos.is_square_attacked(Square::F3, Color::White));
    /// assert!(!pos.is_square_attacked(Square::F4, Color::White));
    /// ```
    pub fn is_square_attacked(&self, square: Square, by: Color) -> bool {
        let occupancy = self.occupied();
        let theirs = self.color(by);
        let queens = self.kind(PieceKind::Queen);

        // A pawn of `by` attacks `square` iff a pawn of the other color on `square` would attack it back
        pawn_attacks(square, by.opponent()).intersects(self.kind(PieceKind::Pawn) & theirs)
            || knight_attacks(square).intersects(self.kind(PieceKind::Knight) & theirs)
            || king_attacks(square).intersects(self.kind(PieceKind::King) & theirs)
            || bishop_attacks(square, occupancy)
                .intersects((self.kind(PieceKind::Bishop) | queens) & theirs)
            || rook_attacks(square, occupancy)
                .intersects((self.kind(PieceKind::Rook) | queens) & theirs)
    }

    /// Returns `true` if the side to move's King is attacked.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// let check = Position::from_fen("4r2k/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    /// assert!(check.is_check());
    ///
    /// let blocked = Position::from_fen("4r2k/8/8/8/8/8/4P3/4K3 w - - 0 1").unwrap();
    /// assert!(!blocked.is_check());
    /// ```
    #[inline(always)]
    pub fn is_check(&self) -> bool {
        let color = self.side_to_move;
        self.king_square(color)
            .is_some_and(|king| self.is_square_attacked(king, color.opponent()))
    }

    /// Puts `piece` on `square`, hashing it into the key.
    ///
    /// `square` must be empty.
    #[inline(always)]
    pub fn place(&mut self, piece: Piece, square: Square) {
        debug_assert!(!self.is_occupied(square), "{square} is occupied");
        self.colors[piece.color()].set(square);
        self.kinds[piece.kind()].set(square);
        self.key.hash_piece(square, piece);
    }

    /// Takes `piece` off `square`, hashing it out of the key.
    ///
    /// `piece` must be on `square`.
    #[inline(always)]
    pub fn remove(&mut self, piece: Piece, square: Square) {
        debug_assert_eq!(self.piece_at(square), Some(piece), "{piece} is not on {square}");
        self.colors[piece.color()].clear(square);
        self.kinds[piece.kind()].clear(square);
        self.key.hash_piece(square, piece);
    }

    #[inline(always)]
    pub fn toggle_side_to_move(&mut self) {
        self.side_to_move = self.side_to_move.opponent();
        self.key.hash_side();
    }

    /// Replaces the en passant target, hashing the old one out and the new one in.
    #[inline(always)]
    pub fn set_ep_square(&mut self, ep_square: Option<Square>) {
        if let Some(old) = self.ep_square {
            self.key.hash_ep_file(old.file());
        }
        if let Some(new) = ep_square {
            self.key.hash_ep_file(new.file());
        }
        self.ep_square = ep_square;
    }

    /// Keeps only the castling rights that are also in `mask`.
    #[inline(always)]
    pub fn mask_castling_rights(&mut self, mask: CastlingRights) {
        self.key.hash_castling(self.castling_rights);
        self.castling_rights = self.castling_rights.masked(mask);
        self.key.hash_castling(self.castling_rights);
    }

    /// Applies `mv` in place, returning `false` if it left the mover's King in check.
    ///
    /// If `capture_only` is set and `mv` is not a capture, nothing happens and this returns `false`.
    ///
    /// On an illegal move the position is left half-applied (though its key stays consistent),
    /// and the side to move is *not* switched. Callers must make moves on a copy and discard it on failure.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// let pos = Position::from_fen("4r2k/8/8/8/8/8/8/3K4 w - - 0 1").unwrap();
    ///
    /// // Stepping onto the Rook's file is pseudo-legal, but not legal
    /// let into_check = pos
    ///     .pseudo_legal_moves()
    ///     .into_iter()
    ///     .find(|mv| mv.to() == Square::E1)
    ///     .unwrap();
    /// let mut copy = pos;
    /// assert!(!copy.make_move(into_check, false));
    /// assert_eq!(copy.side_to_move(), Color::White);
    ///
    /// let mut copy = pos;
    /// assert!(copy.make_move(pos.find_move("d1c2").unwrap(), false));
    /// assert_eq!(copy.side_to_move(), Color::Black);
    /// ```
    pub fn make_move(&mut self, mv: Move, capture_only: bool) -> bool {
        if capture_only && !mv.is_capture() {
            return false;
        }

        let us = self.side_to_move;
        let (from, to, piece) = (mv.from(), mv.to(), mv.piece());

        self.remove(piece, from);

        if let Some(victim) = mv.captured() {
            // The pawn taken en passant stands beside the mover, not on the target
            let victim_square = if mv.is_en_passant() {
                Square::new(to.file(), from.rank())
            } else {
                to
            };
            self.remove(victim, victim_square);
        }

        self.place(mv.promotion().unwrap_or(piece), to);

        let ep_square = if mv.is_double_push() {
            from.offset(0, us.forward())
        } else {
            None
        };
        self.set_ep_square(ep_square);

        if mv.is_castle() {
            if let Some((rook_from, rook_to)) = castling_rook_squares(to) {
                let rook = Piece::new(us, PieceKind::Rook);
                self.remove(rook, rook_from);
                self.place(rook, rook_to);
            }
        }

        self.mask_castling_rights(CASTLING_MASKS[from].masked(CASTLING_MASKS[to]));

        debug_assert_eq!(self.key, ZobristKey::new(self), "key desynced after {mv:?}");

        if self
            .king_square(us)
            .is_some_and(|king| self.is_square_attacked(king, us.opponent()))
        {
            return false;
        }

        self.toggle_side_to_move();
        true
    }

    /// Passes the turn without moving, clearing any en passant target.
    ///
    /// Only meaningful for null-move pruning. Never call this while in check.
    #[inline(always)]
    pub fn make_null_move(&mut self) {
        self.set_ep_square(None);
        self.toggle_side_to_move();
    }

    /// Copy-make: returns the position after `mv`, or `None` if `mv` is illegal.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// let pos = Position::default();
    /// let e2e4 = pos.find_move("e2e4").unwrap();
    /// let after = pos.with_move_made(e2e4).unwrap();
    /// assert_eq!(after.ep_square(), Some(Square::E3));
    /// ```
    #[inline(always)]
    pub fn with_move_made(&self, mv: Move) -> Option<Self> {
        let mut copy = *self;
        copy.make_move(mv, false).then_some(copy)
    }

    /// All legal moves, in generation order.
    pub fn legal_moves(&self) -> MoveList {
        self.pseudo_legal_moves()
            .into_iter()
            .filter(|&mv| self.with_move_made(mv).is_some())
            .collect()
    }

    /// Finds the legal move written as `text` in coordinate notation, such as `e2e4` or `a7a8q`.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// let pos = Position::default();
    /// assert!(pos.find_move("g1f3").is_ok());
    /// assert!(pos.find_move("e2e5").is_err());
    /// ```
    pub fn find_move(&self, text: &str) -> Result<Move, ParseError> {
        let text = text.trim();
        self.legal_moves()
            .into_iter()
            .find(|mv| mv == &text)
            .ok_or_else(|| ParseError::IllegalMove(text.to_string()))
    }
}

impl FromStr for Position {
    type Err = ParseError;
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl Default for Position {
    /// The standard starting position.
    #[inline(always)]
    fn default() -> Self {
        // Safety: The FEN for startpos is always valid
        unsafe { Self::from_fen(FEN_STARTPOS).unwrap_unchecked() }
    }
}

impl fmt::Display for Position {
    /// Display this position's FEN string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}

impl fmt::Debug for Position {
    /// Draws the board, with the remaining state alongside it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            write!(f, "{rank}|")?;
            for file in File::iter() {
                let piece = self.piece_at(Square::new(file, rank));
                write!(f, " {}", piece.map(|p| p.char()).unwrap_or('.'))?;
            }

            if rank == Rank::SEVEN {
                write!(f, "      Side: {}", self.side_to_move)?;
            } else if rank == Rank::SIX {
                write!(f, "  Castling: {}", self.castling_rights)?;
            } else if rank == Rank::FIVE {
                let ep = self.ep_square.map(|sq| sq.to_string());
                write!(f, "        EP: {}", ep.as_deref().unwrap_or("-"))?;
            } else if rank == Rank::FOUR {
                write!(f, "       Key: {}", self.key)?;
            }
            writeln!(f)?;
        }

        write!(f, " +")?;
        for _ in File::iter() {
            write!(f, "--")?;
        }
        write!(f, "\n   ")?;
        for file in File::iter() {
            write!(f, "{file} ")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{XoShiRo, FEN_KIWIPETE};

    #[test]
    fn test_startpos_round_trip() {
        let pos = Position::default();

        assert_eq!(pos.occupied().population(), 32);
        assert_eq!(pos.side_to_move(), Color::White);
        assert_eq!(pos.castling_rights(), CastlingRights::ALL);
        assert_eq!(pos.ep_square(), None);

        let back_rank = "RNBQKBNR";
        for (file, c) in File::iter().zip(back_rank.chars()) {
            assert_eq!(pos.piece_at(Square::new(file, Rank::ONE)).map(|p| p.char()), Some(c));
            assert_eq!(
                pos.piece_at(Square::new(file, Rank::EIGHT)).map(|p| p.char()),
                Some(c.to_ascii_lowercase())
            );
            assert_eq!(pos.piece_at(Square::new(file, Rank::TWO)), Some(Piece::WHITE_PAWN));
            assert_eq!(pos.piece_at(Square::new(file, Rank::SEVEN)), Some(Piece::BLACK_PAWN));
        }

        assert_eq!(pos.to_fen(), FEN_STARTPOS);
    }

    #[test]
    fn test_fen_round_trips() {
        for fen in [
            FEN_KIWIPETE,
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 1",
            "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1",
        ] {
            let pos = Position::from_fen(fen).unwrap();
            assert_eq!(pos.to_fen(), fen);
            assert_eq!(pos.key(), ZobristKey::new(&pos));
        }
    }

    #[test]
    fn test_counters_are_optional() {
        let with = Position::from_fen(FEN_STARTPOS).unwrap();
        let without = Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -");
        assert_eq!(without, Ok(with));
    }

    #[test]
    fn test_bad_fens_are_rejected() {
        let cases = [
            ("", ParseError::MissingField("piece placement")),
            ("8/8/8/8/8/8/8/4K2k", ParseError::MissingField("side to move")),
            ("8/8/8/8/8/8/8/4K2k w", ParseError::MissingField("castling rights")),
            ("8/8/8/8/8/8/8/4K2k w -", ParseError::MissingField("en passant square")),
            ("8/8/8/8/8/8/8/4K2k x - -", ParseError::InvalidSideToMove("x".into())),
            ("8/8/8/8/8/8/8/4K2k w KX -", ParseError::InvalidCastling("KX".into())),
            ("8/8/8/8/8/8/8/4K2k w KQK -", ParseError::InvalidCastling("KQK".into())),
            ("8/8/8/8/8/8/8/4K2k w - z3", ParseError::InvalidSquare("z3".into())),
            ("8/8/8/8/8/8/8/4K2x w - -", ParseError::InvalidPiece('x')),
            ("8/8/8/8/8/8/8/4K2k w - - a 1", ParseError::InvalidCounter("a".into())),
            ("8/8/8/8/8/8/8/4K2k w - - 0 1 extra", ParseError::TrailingInput("extra".into())),
        ];

        for (fen, err) in cases {
            assert_eq!(Position::from_fen(fen), Err(err), "{fen:?}");
        }

        for fen in [
            "8/8/8/8/8/8/4K2k w - -",
            "8/8/8/8/8/8/8/4K2k1 w - -",
            "8/8/8/8/8/8/8/4K2 w - -",
        ] {
            assert!(
                matches!(Position::from_fen(fen), Err(ParseError::InvalidPlacement(..))),
                "{fen:?}"
            );
        }
    }

    #[test]
    fn test_well_formed_fens_are_accepted_as_written() {
        // No black King at all
        let pos = Position::from_fen("4r3/8/8/8/8/8/8/4K3 w - -").unwrap();
        assert_eq!(pos.king_square(Color::Black), None);
        assert_eq!(pos.key(), ZobristKey::new(&pos));

        // An en passant target off the third and sixth ranks is kept, though nothing can use it
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - e4").unwrap();
        assert_eq!(pos.ep_square(), Some(Square::E4));
        assert_eq!(pos.legal_moves().len(), 5);

        // Castling letters may come in any order
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w qkQK -").unwrap();
        assert_eq!(pos.castling_rights(), CastlingRights::ALL);
        assert_eq!(pos.to_fen(), "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    }

    #[test]
    fn test_check_detection() {
        let check = Position::from_fen("4r3/8/8/8/8/8/8/4K3 w - -").unwrap();
        assert!(check.is_check());
        assert!(check.is_square_attacked(Square::E1, Color::Black));

        let blocked = Position::from_fen("4r3/8/8/8/8/8/4P3/4K3 w - -").unwrap();
        assert!(!blocked.is_check());

        // A side without a King is never in check
        let kingless = Position::from_fen("4r3/8/8/8/8/8/8/4K3 b - -").unwrap();
        assert!(!kingless.is_check());
        assert!(!kingless.legal_moves().is_empty());

        // Pawns attack diagonally forward only
        let pawn = Position::from_fen("7k/8/8/8/8/3p4/4K3/8 w - - 0 1").unwrap();
        assert!(pawn.is_check());
        let pawn = Position::from_fen("7k/8/8/8/8/4K3/3p4/8 w - - 0 1").unwrap();
        assert!(!pawn.is_check());
    }

    #[test]
    fn test_key_stays_consistent_through_random_games() {
        let mut rng = XoShiRo::from_seed(7);

        for fen in [FEN_STARTPOS, FEN_KIWIPETE] {
            let mut pos = Position::from_fen(fen).unwrap();

            for _ in 0..200 {
                let moves = pos.pseudo_legal_moves();
                if moves.is_empty() {
                    break;
                }

                // Every attempt is checked, including the ones that turn out illegal
                for &mv in &moves {
                    let mut copy = pos;
                    copy.make_move(mv, false);
                    assert_eq!(copy.key(), ZobristKey::new(&copy), "{mv:?} on {pos}");
                }

                let legal = pos.legal_moves();
                if legal.is_empty() {
                    break;
                }
                let mv = legal[rng.next_u64() as usize % legal.len()];
                assert!(pos.make_move(mv, false));
                assert_eq!(pos.key(), ZobristKey::new(&pos));
            }
        }
    }

    #[test]
    fn test_illegal_make_rolls_back_to_the_copy() {
        // The e2 pawn is pinned against the King by the e8 rook
        let pos = Position::from_fen("4r2k/8/8/8/8/5p2/4P3/4K3 w - - 0 1").unwrap();
        let capture = pos
            .pseudo_legal_moves()
            .into_iter()
            .find(|mv| mv.from() == Square::E2 && mv.to() == Square::F3)
            .unwrap();

        let before = pos;
        let mut copy = pos;
        assert!(!copy.make_move(capture, false));
        assert_eq!(copy.side_to_move(), Color::White);
        assert_ne!(copy, before);

        // Discarding the copy leaves the original untouched
        assert_eq!(pos, before);
        assert_eq!(pos.key(), ZobristKey::new(&pos));
        assert!(pos.with_move_made(capture).is_none());
    }

    #[test]
    fn test_capture_only_skips_quiet_moves() {
        let pos = Position::default();
        let mut copy = pos;
        let e2e4 = pos.find_move("e2e4").unwrap();
        assert!(!copy.make_move(e2e4, true));
        assert_eq!(copy, pos);
    }

    #[test]
    fn test_castling_moves_the_rook_and_revokes_rights() {
        let pos = Position::from_fen(FEN_KIWIPETE).unwrap();
        let after = pos.with_move_made(pos.find_move("e1g1").unwrap()).unwrap();

        assert_eq!(after.piece_at(Square::G1), Some(Piece::WHITE_KING));
        assert_eq!(after.piece_at(Square::F1), Some(Piece::WHITE_ROOK));
        assert_eq!(after.piece_at(Square::H1), None);
        assert_eq!(after.castling_rights().to_string(), "kq");
    }

    #[test]
    fn test_capturing_a_rook_at_home_revokes_its_right() {
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/6b1/R3K2R b KQkq - 0 1").unwrap();
        let after = pos.with_move_made(pos.find_move("g2h1").unwrap()).unwrap();
        assert_eq!(after.castling_rights().to_string(), "Qkq");
    }

    #[test]
    fn test_en_passant_removes_the_passed_pawn() {
        let pos =
            Position::from_fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 1")
                .unwrap();
        let ep = pos.find_move("e5d6").unwrap();
        assert!(ep.is_en_passant());

        let after = pos.with_move_made(ep).unwrap();
        assert_eq!(after.piece_at(Square::D5), None);
        assert_eq!(after.piece_at(Square::D6), Some(Piece::WHITE_PAWN));
        assert_eq!(after.ep_square(), None);
        assert_eq!(after.key(), ZobristKey::new(&after));
    }

    #[test]
    fn test_null_move_clears_ep_and_passes() {
        let pos =
            Position::from_fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 1")
                .unwrap();
        let mut null = pos;
        null.make_null_move();
        assert_eq!(null.side_to_move(), Color::Black);
        assert_eq!(null.ep_square(), None);
        assert_eq!(null.key(), ZobristKey::new(&null));
    }
}
