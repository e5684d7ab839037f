/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Board representation, move generation, and perft.
mod board;

/// Command-line interface to the engine.
mod cli;

/// Evaluation of chess positions.
mod eval;

/// Move-ordering heuristics that learn from cutoffs.
mod history;

/// Centipawn and mate scores.
mod score;

/// Main engine logic; all search related code.
mod search;

/// Transposition table.
mod ttable;

/// Tunable search constants.
mod tune;

/// Log levels for the search.
mod utils;

pub use board::*;
pub use cli::*;
pub use eval::*;
pub use history::*;
pub use score::*;
pub use search::*;
pub use ttable::*;
pub use utils::*;
