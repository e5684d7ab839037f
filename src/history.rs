/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::ops::Deref;

use crate::{tune, Move, Piece, Square, MAX_PLY};

/// Stores a score for moving a piece to a square.
///
/// Quiet moves that caused a beta cutoff get a bonus, so they are tried earlier elsewhere in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryTable([[i32; Square::COUNT]; Piece::COUNT]);

impl HistoryTable {
    /// Clear the history table, removing all scores.
    #[inline(always)]
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Rewards `mv` for causing a cutoff at `depth`.
    ///
    /// Deeper cutoffs earn more. Scores saturate at the maximum history score, which keeps them below the killers.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// let mut history = HistoryTable::default();
    /// let mv = Move::quiet(Square::G1, Square::F3, Piece::WHITE_KNIGHT);
    /// history.update(mv, 4);
    /// assert_eq!(history.score(mv), 16);
    /// ```
    #[inline(always)]
    pub fn update(&mut self, mv: Move, depth: u8) {
        let bonus = depth as i32 * depth as i32;
        let entry = &mut self.0[mv.piece()][mv.to()];

        *entry = (*entry + bonus).min(tune::max_history_score!());
    }

    /// The current score of `mv`.
    #[inline(always)]
    pub fn score(&self, mv: Move) -> i32 {
        self.0[mv.piece()][mv.to()]
    }
}

impl Default for HistoryTable {
    #[inline(always)]
    fn default() -> Self {
        Self([[0; Square::COUNT]; Piece::COUNT])
    }
}

impl Deref for HistoryTable {
    type Target = [[i32; Square::COUNT]; Piece::COUNT];
    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Two quiet moves per ply that most recently caused a beta cutoff there.
///
/// Sibling positions often share a refutation, so these get tried right after captures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KillerTable([[Move; 2]; MAX_PLY]);

impl KillerTable {
    /// Clear all killer moves.
    #[inline(always)]
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Records `mv` as the newest killer at `ply`, demoting the previous first killer.
    ///
    /// Storing the current first killer again changes nothing.
    #[inline(always)]
    pub fn store(&mut self, ply: usize, mv: Move) {
        let slots = &mut self.0[ply];
        if slots[0] != mv {
            slots[1] = slots[0];
            slots[0] = mv;
        }
    }

    /// The killers at `ply`, newest first. Empty slots hold [`Move::NULL`].
    #[inline(always)]
    pub fn get(&self, ply: usize) -> [Move; 2] {
        self.0[ply]
    }
}

impl Default for KillerTable {
    #[inline(always)]
    fn default() -> Self {
        Self([[Move::NULL; 2]; MAX_PLY])
    }
}
