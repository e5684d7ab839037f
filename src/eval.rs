/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{PieceKind, Position, Score};

/// Encapsulates the logic of scoring a chess position.
///
/// During a negamax search, positions must be evaluated from the side-to-move's perspective.
/// That is, if it is Black's turn, a "good" evaluation for Black will be a positive number.
pub trait Evaluator {
    /// Evaluate `position` from the side-to-move's perspective.
    ///
    /// A positive/high number is good for the side-to-move, while a negative number is better for the opponent.
    /// A score of 0 is considered equal. Results must stay well clear of mate scores.
    fn evaluate(&self, position: &Position) -> Score;
}

impl<E: Evaluator + ?Sized> Evaluator for &E {
    #[inline(always)]
    fn evaluate(&self, position: &Position) -> Score {
        (**self).evaluate(position)
    }
}

/// Counts material and nothing else.
///
/// # Example
/// ```
/// # use newt::*;
/// let pos: Position = "4k3/8/8/8/8/8/8/R3K3 w - - 0 1".parse().unwrap();
/// assert_eq!(MaterialEvaluator.evaluate(&pos), Score::new(500));
///
/// let pos: Position = "4k3/8/8/8/8/8/8/R3K3 b - - 0 1".parse().unwrap();
/// assert_eq!(MaterialEvaluator.evaluate(&pos), Score::new(-500));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterialEvaluator;

impl Evaluator for MaterialEvaluator {
    fn evaluate(&self, position: &Position) -> Score {
        let us = position.side_to_move();
        let them = us.opponent();

        let material = PieceKind::all().into_iter().fold(0, |total, kind| {
            let ours = (position.color(us) & position.kind(kind)).population() as i32;
            let theirs = (position.color(them) & position.kind(kind)).population() as i32;
            total + value_of(kind) * (ours - theirs)
        });

        Score::new(material)
    }
}

/// Value of a piece, in centipawns.
///
/// Kings are priceless and never counted.
#[inline(always)]
pub const fn value_of(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Pawn => 100,
        PieceKind::Knight => 300,
        PieceKind::Bishop => 350,
        PieceKind::Rook => 500,
        PieceKind::Queen => 1_000,
        PieceKind::King => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startpos_is_balanced() {
        assert_eq!(MaterialEvaluator.evaluate(&Position::default()), Score::DRAW);
    }

    #[test]
    fn test_material_counts_every_kind() {
        // White: Q, R, B, N, 2P. Black: R, 3P.
        let pos = Position::from_fen("r3k3/ppp5/8/8/8/8/PP6/RNBQK3 w - - 0 1").unwrap();
        let expected = 1_000 + 500 + 350 + 300 + 200 - 500 - 300;
        assert_eq!(MaterialEvaluator.evaluate(&pos), Score::new(expected));
    }

    #[test]
    fn test_borrowed_evaluator() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/Q3K3 w - - 0 1").unwrap();
        let eval = &MaterialEvaluator;
        assert_eq!(eval.evaluate(&pos), Score::new(1_000));
    }
}
