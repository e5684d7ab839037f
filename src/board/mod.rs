/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Precomputed attack tables, including magic lookups for sliding pieces.
mod attacks;

/// Bitboard representation of sets of squares.
mod bitboard;

/// Errors produced when parsing positions and moves.
mod error;

/// Pseudo-legal move generation.
mod movegen;

/// Compact move encoding.
mod moves;

/// Node counting for validating move generation.
mod perft;

/// Colors, piece kinds, and the 12-piece registry.
mod piece;

/// The mutable board state and make-move.
mod position;

/// Seedable pseudo-random number generation.
mod prng;

/// Squares, files, and ranks.
mod square;

/// Misc constants.
mod utils;

/// Zobrist hashing of positions.
mod zobrist;

pub use attacks::*;
pub use bitboard::*;
pub use error::*;
pub use moves::*;
pub use perft::*;
pub use piece::*;
pub use position::*;
pub use prng::*;
pub use square::*;
pub use utils::*;
pub use zobrist::*;
