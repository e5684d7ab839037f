/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Compile-time verbosity of a search.
///
/// Output code is gated on these constants, so a silent search carries no printing at all.
pub trait LogLevel {
    /// Print `info` lines after each iteration and the final `bestmove`.
    const INFO: bool;

    /// Additionally print `info string` diagnostics.
    const DEBUG: bool;
}

/// Prints nothing. Used by tests and by callers that only want the [`crate::SearchResult`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNone;

/// Prints UCI `info` and `bestmove` lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogInfo;

/// Prints everything [`LogInfo`] does, plus search limits and transposition table statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDebug;

impl LogLevel for LogNone {
    const INFO: bool = false;
    const DEBUG: bool = false;
}

impl LogLevel for LogInfo {
    const INFO: bool = true;
    const DEBUG: bool = false;
}

impl LogLevel for LogDebug {
    const INFO: bool = true;
    const DEBUG: bool = true;
}
