/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use uci_parser::UciScore;

use crate::MAX_PLY;

pub type ScoreInternal = i32;

/// A numerical representation of the evaluation of a position / move, in units of ["centipawns"](https://www.chessprogramming.org/Score).
///
/// Scores are always from the perspective of the side to move. Mate scores are offset by the
/// number of plies between the root of the search and the mate, so shorter mates score higher.
#[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Score(ScoreInternal);

impl Score {
    /// Largest possible score ever achievable.
    pub const INF: Self = Self(50_000);

    /// Score of delivering mate in the current position.
    pub const MATE: Self = Self(49_000);

    /// Score of a draw, including stalemate.
    pub const DRAW: Self = Self(0);

    /// Initial value of alpha in alpha-beta pruning.
    pub const ALPHA: Self = Self(-Self::INF.0);

    /// Initial value of beta in alpha-beta pruning.
    pub const BETA: Self = Self::INF;

    /// Lowest possible score for mate.
    ///
    /// This is only obtainable if mate is possible in [`MAX_PLY`] plies.
    pub const LOWEST_MATE: Self = Self(Self::MATE.0 - MAX_PLY as ScoreInternal);

    /// Constructs a new [`Score`] instance.
    #[inline(always)]
    pub const fn new(score: ScoreInternal) -> Self {
        Self(score)
    }

    /// Score of the side to move being checkmated, `ply` plies from the root.
    ///
    /// # Example
    /// ```
    /// # use newt::Score;
    /// let mated = Score::mated_in(3);
    /// assert!(mated.is_mate());
    /// assert!(mated < Score::mated_in(5));
    /// ```
    #[inline(always)]
    pub const fn mated_in(ply: usize) -> Self {
        Self(-Self::MATE.0 + ply as ScoreInternal)
    }

    #[inline(always)]
    pub const fn inner(&self) -> ScoreInternal {
        self.0
    }

    /// Returns `true` if the score is a mate score.
    #[inline(always)]
    pub const fn is_mate(&self) -> bool {
        self.0.abs() >= Self::LOWEST_MATE.0
    }

    /// Converts this [`Score`] into a [`UciScore`],
    /// determining whether it is a centipawns score or a mate score.
    ///
    /// Used when sending the `info score` message.
    #[inline(always)]
    pub fn into_uci(self) -> UciScore {
        if self.is_mate() {
            UciScore::mate(self.moves_to_mate())
        } else {
            UciScore::cp(self.0)
        }
    }

    /// Returns the number of plies (half moves) this score is from mate.
    #[inline(always)]
    pub const fn plies_to_mate(&self) -> i32 {
        Self::MATE.0 - self.0.abs()
    }

    /// Returns the number of moves (full moves) this score is from mate.
    ///
    /// Positive if the side to move mates, negative if it gets mated.
    #[inline(always)]
    pub const fn moves_to_mate(&self) -> i32 {
        let plies = self.plies_to_mate();

        // Mating takes our own move too, so round up; being mated is counted in whole opponent moves
        let relative_to_side = if self.0 > 0 { plies + 1 } else { -plies };

        relative_to_side / 2
    }

    /// Re-expresses a root-relative mate score as relative to a node `ply` plies from the root.
    ///
    /// This is what gets stored in the transposition table, since the same position may be reached at different plies.
    ///
    /// # Example
    /// ```
    /// # use newt::Score;
    /// // Mate 5 plies from the root, found at a node 3 plies deep, is 2 plies from that node
    /// let root_relative = Score::MATE - 5;
    /// assert_eq!(root_relative.relative(3), Score::MATE - 2);
    /// ```
    #[inline(always)]
    pub const fn relative(self, ply: usize) -> Self {
        let ply = ply as ScoreInternal;
        if !self.is_mate() {
            self
        } else if self.0 > 0 {
            Self(self.0 + ply)
        } else {
            Self(self.0 - ply)
        }
    }

    /// Inverse of [`Score::relative`]: turns a node-relative mate score back into a root-relative one.
    #[inline(always)]
    pub const fn absolute(self, ply: usize) -> Self {
        let ply = ply as ScoreInternal;
        if !self.is_mate() {
            self
        } else if self.0 > 0 {
            Self(self.0 - ply)
        } else {
            Self(self.0 + ply)
        }
    }

    /// Returns the absolute value of this [`Score`].
    #[inline(always)]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }
}

impl From<Score> for UciScore {
    #[inline(always)]
    fn from(value: Score) -> Self {
        value.into_uci()
    }
}

macro_rules! impl_binary_op {
    ($trait:tt, $fn:ident) => {
        impl std::ops::$trait for Score {
            type Output = Self;

            #[inline(always)]
            fn $fn(self, rhs: Self) -> Self::Output {
                Self(self.0.$fn(rhs.0))
            }
        }

        impl std::ops::$trait<ScoreInternal> for Score {
            type Output = Self;

            #[inline(always)]
            fn $fn(self, rhs: ScoreInternal) -> Self::Output {
                Self(self.0.$fn(rhs))
            }
        }
    };
}

macro_rules! impl_binary_op_assign {
    ($trait:tt, $fn:ident) => {
        impl std::ops::$trait for Score {
            #[inline(always)]
            fn $fn(&mut self, rhs: Self) {
                self.0.$fn(rhs.0);
            }
        }

        impl std::ops::$trait<ScoreInternal> for Score {
            #[inline(always)]
            fn $fn(&mut self, rhs: ScoreInternal) {
                self.0.$fn(rhs);
            }
        }
    };
}

impl_binary_op!(Add, add);
impl_binary_op!(Sub, sub);

impl_binary_op_assign!(AddAssign, add_assign);
impl_binary_op_assign!(SubAssign, sub_assign);

impl std::ops::Neg for Score {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self::Output {
        Self(self.0.neg())
    }
}

impl fmt::Display for Score {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_mate() {
            write!(f, "mate {}", self.moves_to_mate())
        } else {
            write!(f, "cp {}", self.0)
        }
    }
}

impl fmt::Debug for Score {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_mate() {
            write!(
                f,
                "{} (mate in {} plies {} moves)",
                self.0,
                self.plies_to_mate(),
                self.moves_to_mate()
            )
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_absolute() {
        let plies = 3;

        let our_mate = Score::MATE - plies as ScoreInternal;
        assert_eq!(our_mate.plies_to_mate(), plies as i32);

        let their_mate = -(Score::MATE - plies as ScoreInternal);
        assert_eq!(their_mate.plies_to_mate(), plies as i32);

        // Relative to the node where the mate was found, it is immediate
        assert_eq!(our_mate.relative(plies), Score::MATE);
        assert_eq!(their_mate.relative(plies), -Score::MATE);

        // And back again
        assert_eq!(our_mate.relative(plies).absolute(plies), our_mate);
        assert_eq!(their_mate.relative(plies).absolute(plies), their_mate);
    }

    #[test]
    fn test_centipawns_are_untouched_by_ply_adjustment() {
        let score = Score::new(250);
        assert_eq!(score.relative(10), score);
        assert_eq!(score.absolute(10), score);
    }

    #[test]
    fn test_moves_to_mate() {
        // We mate on our next move
        assert_eq!((Score::MATE - 1).moves_to_mate(), 1);
        assert_eq!((Score::MATE - 3).moves_to_mate(), 2);

        // We are mated after our move and theirs
        assert_eq!(Score::mated_in(2).moves_to_mate(), -1);
        assert!(!Score::new(1_000).is_mate());
    }
}
