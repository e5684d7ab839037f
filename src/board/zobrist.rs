/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use super::{CastlingRights, Color, File, Piece, Position, Square, XoShiRo};

/// Stores Zobrist hash keys, for hashing [`Position`]s.
///
/// Built at compile time from a fixed seed, so keys are identical between compilations.
const ZOBRIST_TABLE: ZobristHashTable = ZobristHashTable::new();

/// Seed of the generator that fills [`ZOBRIST_TABLE`].
const ZOBRIST_SEED: u64 = 0x2B1D_F00D_5EED_0001;

/// Represents a key generated from a Zobrist Hash
#[derive(Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
pub struct ZobristKey(u64);

impl ZobristKey {
    /// Computes the [`ZobristKey`] of `position` from scratch.
    ///
    /// Positions maintain their key incrementally, so this is only needed on construction and for verification.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// let pos = Position::default();
    /// assert_eq!(ZobristKey::new(&pos), pos.key());
    /// ```
    pub fn new(position: &Position) -> Self {
        let mut key = Self::default();

        for square in position.occupied() {
            if let Some(piece) = position.piece_at(square) {
                key.hash_piece(square, piece);
            }
        }

        if let Some(ep) = position.ep_square() {
            key.hash_ep_file(ep.file());
        }

        key.hash_castling(position.castling_rights());

        if position.side_to_move() == Color::Black {
            key.hash_side();
        }

        key
    }

    /// Return the inner `u64` of this key.
    #[inline(always)]
    pub const fn inner(&self) -> u64 {
        self.0
    }

    /// Adds/removes `hash_key` to this [`ZobristKey`].
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// let mut zero = ZobristKey::default();
    /// zero.hash(42);
    /// assert_ne!(zero.inner(), 0);
    ///
    /// // Calling again un-hashes it
    /// zero.hash(42);
    /// assert_eq!(zero.inner(), 0);
    /// ```
    #[inline(always)]
    pub fn hash(&mut self, hash_key: u64) {
        self.0 ^= hash_key;
    }

    /// Adds/removes the hash for the provided `piece` at `square`.
    #[inline(always)]
    pub fn hash_piece(&mut self, square: Square, piece: Piece) {
        self.hash(ZOBRIST_TABLE.piece_keys[piece][square]);
    }

    /// Adds/removes the hash for an en passant target on `file`.
    #[inline(always)]
    pub fn hash_ep_file(&mut self, file: File) {
        self.hash(ZOBRIST_TABLE.ep_keys[file.index()]);
    }

    /// Adds/removes the hash for the provided set of castling rights.
    #[inline(always)]
    pub fn hash_castling(&mut self, rights: CastlingRights) {
        self.hash(ZOBRIST_TABLE.castling_keys[rights.index()]);
    }

    /// Adds/removes the hash for Black being the side to move.
    #[inline(always)]
    pub fn hash_side(&mut self) {
        self.hash(ZOBRIST_TABLE.side_key);
    }
}

impl fmt::Display for ZobristKey {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Encapsulates the logic of Zobrist hashing.
#[derive(Debug)]
struct ZobristHashTable {
    /// One unique key for every possible piece and every possible square.
    piece_keys: [[u64; Square::COUNT]; Piece::COUNT],

    /// One key per file, for the en passant target.
    ep_keys: [u64; File::COUNT],

    /// One key for every possible combination of castling rights.
    castling_keys: [u64; CastlingRights::COUNT],

    /// Toggled in when Black is to move.
    side_key: u64,
}

impl ZobristHashTable {
    /// Fills the table from a generator seeded with [`ZOBRIST_SEED`].
    const fn new() -> Self {
        let mut piece_keys = [[0; Square::COUNT]; Piece::COUNT];
        let mut ep_keys = [0; File::COUNT];
        let mut castling_keys = [0; CastlingRights::COUNT];

        let mut prng = XoShiRo::from_seed(ZOBRIST_SEED);

        let mut i = 0;
        while i < Piece::COUNT {
            let mut j = 0;
            while j < Square::COUNT {
                let key;
                (key, prng) = prng.get_next_const();
                piece_keys[i][j] = key;
                j += 1;
            }
            i += 1;
        }

        i = 0;
        while i < CastlingRights::COUNT {
            let key;
            (key, prng) = prng.get_next_const();
            castling_keys[i] = key;
            i += 1;
        }

        i = 0;
        while i < File::COUNT {
            let key;
            (key, prng) = prng.get_next_const();
            ep_keys[i] = key;
            i += 1;
        }

        let (side_key, _) = prng.get_next_const();

        Self {
            piece_keys,
            ep_keys,
            castling_keys,
            side_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_keys_are_distinct() {
        let mut black_pawn_d7 = ZobristKey::default();
        black_pawn_d7.hash_piece(Square::D7, Piece::BLACK_PAWN);

        let mut black_pawn_d5 = ZobristKey::default();
        black_pawn_d5.hash_piece(Square::D5, Piece::BLACK_PAWN);

        let mut white_pawn_d7 = ZobristKey::default();
        white_pawn_d7.hash_piece(Square::D7, Piece::WHITE_PAWN);

        assert_ne!(black_pawn_d7, ZobristKey::default());
        assert_ne!(black_pawn_d7, black_pawn_d5);
        assert_ne!(black_pawn_d7, white_pawn_d7);
    }

    #[test]
    fn test_empty_castling_rights_still_have_a_key() {
        let mut none = ZobristKey::default();
        none.hash_castling(CastlingRights::NONE);

        let mut all = ZobristKey::default();
        all.hash_castling(CastlingRights::ALL);

        assert_ne!(none, ZobristKey::default());
        assert_ne!(none, all);
    }
}
