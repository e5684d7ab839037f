/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use thiserror::Error;

/// Everything that can go wrong when reading a position or a move from text.
///
/// A failed parse never leaves a half-built [`Position`](super::Position) behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid piece character {0:?}")]
    InvalidPiece(char),

    #[error("invalid side to move {0:?}: expected `w` or `b`")]
    InvalidSideToMove(String),

    #[error("invalid castling rights {0:?}: expected each of `KQkq` at most once, in any order, or `-`")]
    InvalidCastling(String),

    #[error("invalid square {0:?}")]
    InvalidSquare(String),

    #[error("invalid piece placement {0:?}: {1}")]
    InvalidPlacement(String, &'static str),

    #[error("missing FEN field: {0}")]
    MissingField(&'static str),

    #[error("invalid move counter {0:?}")]
    InvalidCounter(String),

    #[error("unexpected trailing input {0:?}")]
    TrailingInput(String),

    #[error("{0:?} is not a legal move in this position")]
    IllegalMove(String),
}
