/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Default size of the transposition table, in megabytes.
macro_rules! default_ttable_size {
    () => {
        16
    };
}
pub(crate) use default_ttable_size;

/// Half-width of the Aspiration Window placed around the previous iteration's score.
macro_rules! aspiration_window_delta {
    () => {
        50
    };
}
pub(crate) use aspiration_window_delta;

/// Minimum depth at which null move pruning can be applied.
macro_rules! min_nmp_depth {
    () => {
        3
    };
}
pub(crate) use min_nmp_depth;

/// Value to subtract from `depth` (on top of the move itself) when searching the null move.
macro_rules! nmp_reduction {
    () => {
        2
    };
}
pub(crate) use nmp_reduction;

/// Minimum depth at which late move reductions can be applied.
macro_rules! min_lmr_depth {
    () => {
        3
    };
}
pub(crate) use min_lmr_depth;

/// Number of moves that must be searched before late move reductions can be applied.
macro_rules! min_lmr_moves {
    () => {
        4
    };
}
pub(crate) use min_lmr_moves;

/// Total depth removed from a reduced late move.
macro_rules! lmr_reduction {
    () => {
        2
    };
}
pub(crate) use lmr_reduction;

/// Ordering score of the move from the previous iteration's PV, while it is being followed.
macro_rules! pv_move_score {
    () => {
        40_000
    };
}
pub(crate) use pv_move_score;

/// Ordering score of the transposition table's best move.
macro_rules! tt_move_score {
    () => {
        30_000
    };
}
pub(crate) use tt_move_score;

/// Ordering score added to every capture's MVV-LVA value.
macro_rules! capture_base_score {
    () => {
        15_000
    };
}
pub(crate) use capture_base_score;

/// Ordering score of the first killer move at a ply.
macro_rules! first_killer_score {
    () => {
        9_000
    };
}
pub(crate) use first_killer_score;

/// Ordering score of the second killer move at a ply.
macro_rules! second_killer_score {
    () => {
        8_000
    };
}
pub(crate) use second_killer_score;

/// History scores saturate here, below the killers.
macro_rules! max_history_score {
    () => {
        7_000
    };
}
pub(crate) use max_history_score;
