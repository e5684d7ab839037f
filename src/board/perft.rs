/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
    thread,
};

use super::Position;

/// Perform a perft at the specified depth, collecting only data about the number of possible positions (nodes).
///
/// This performs bulk counting, meaning that, at depth 1, it returns the number of available moves,
/// rather than making them, recursing again, and returning 1 for each terminal case.
/// If you do *not* want to use bulk counting, use [`perft_generic`].
///
/// # Example
/// ```
/// # use newt::*;
/// assert_eq!(perft(&Position::default(), 2), 400);
/// ```
#[inline(always)]
pub fn perft(position: &Position, depth: usize) -> u64 {
    perft_generic::<true, false>(position, depth)
}

/// Perform a splitperft at the specified depth, printing the number of nodes reachable after each move available at the root node.
#[inline(always)]
pub fn splitperft(position: &Position, depth: usize) -> u64 {
    perft_generic::<true, true>(position, depth)
}

/// Generic version of `perft` that allows you to specify whether to perform bulk counting and splitperft.
///
/// If `BULK` is set to `true`, this will perform bulk counting.
/// If `SPLIT` is set to `true`, this will perform a splitperft.
pub fn perft_generic<const BULK: bool, const SPLIT: bool>(position: &Position, depth: usize) -> u64 {
    // Bulk counting; no need to recurse again just to apply a singular move and return 1.
    if BULK && !SPLIT && depth == 1 {
        return position.legal_moves().len() as u64;
    }
    // Recursion limit; return 1, since we're fathoming this node.
    else if depth == 0 {
        return 1;
    }

    // Illegal moves are discarded along with their copy
    position
        .pseudo_legal_moves()
        .into_iter()
        .filter_map(|mv| position.with_move_made(mv).map(|next| (mv, next)))
        .fold(0, |nodes, (mv, next)| {
            let new_nodes = perft_generic::<BULK, false>(&next, depth - 1);

            if SPLIT {
                println!("{mv}\t{new_nodes}");
            }

            nodes + new_nodes
        })
}

/// Perft spread across `threads` workers, which take root moves one at a time from a shared queue.
///
/// Only the total is reproducible; which worker counted which root move is not.
///
/// # Example
/// ```
/// # use newt::*;
/// let pos = Position::default();
/// assert_eq!(parallel_perft(&pos, 3, 4), perft(&pos, 3));
/// ```
#[inline(always)]
pub fn parallel_perft(position: &Position, depth: usize, threads: usize) -> u64 {
    // Nothing ever sets this flag, so a result is always produced
    let never = AtomicBool::new(false);
    parallel_perft_with_stop(position, depth, threads, &never).unwrap_or_default()
}

/// Same as [`parallel_perft`], but workers give up once `stop` is set, in which case `None` is returned.
///
/// `stop` is checked before each root move and at every node below it.
pub fn parallel_perft_with_stop(
    position: &Position,
    depth: usize,
    threads: usize,
    stop: &AtomicBool,
) -> Option<u64> {
    if depth == 0 {
        return Some(1);
    }

    let roots = position
        .pseudo_legal_moves()
        .into_iter()
        .filter_map(|mv| position.with_move_made(mv))
        .collect::<Vec<_>>();

    // Index of the next unclaimed root move, and the running total
    let queue = Mutex::new((0usize, 0u64));

    thread::scope(|s| {
        for _ in 0..threads.max(1) {
            s.spawn(|| loop {
                let next = {
                    let Ok(mut guard) = queue.lock() else {
                        return;
                    };
                    let index = guard.0;
                    guard.0 += 1;
                    index
                };

                let Some(root) = roots.get(next) else {
                    return;
                };
                if stop.load(Ordering::Relaxed) {
                    return;
                }

                let Some(nodes) = perft_until_stopped(root, depth - 1, stop) else {
                    return;
                };

                if let Ok(mut guard) = queue.lock() {
                    guard.1 += nodes;
                }
            });
        }
    });

    if stop.load(Ordering::Relaxed) {
        return None;
    }

    queue.into_inner().ok().map(|(_, total)| total)
}

/// Bulk-counting perft that polls `stop` at every node.
fn perft_until_stopped(position: &Position, depth: usize, stop: &AtomicBool) -> Option<u64> {
    if stop.load(Ordering::Relaxed) {
        return None;
    }

    match depth {
        0 => Some(1),
        1 => Some(position.legal_moves().len() as u64),
        _ => position
            .pseudo_legal_moves()
            .into_iter()
            .filter_map(|mv| position.with_move_made(mv))
            .try_fold(0, |nodes, next| {
                Some(nodes + perft_until_stopped(&next, depth - 1, stop)?)
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FEN_KIWIPETE;

    #[test]
    fn test_startpos_perft() {
        let pos = Position::default();
        assert_eq!(perft(&pos, 0), 1);
        assert_eq!(perft(&pos, 1), 20);
        assert_eq!(perft(&pos, 2), 400);
        assert_eq!(perft(&pos, 3), 8_902);
    }

    #[test]
    fn test_bulk_and_full_counting_agree() {
        let pos = Position::from_fen(FEN_KIWIPETE).unwrap();
        assert_eq!(
            perft_generic::<true, false>(&pos, 2),
            perft_generic::<false, false>(&pos, 2)
        );
    }

    #[test]
    fn test_parallel_matches_serial() {
        let pos = Position::from_fen(FEN_KIWIPETE).unwrap();
        let serial = perft(&pos, 3);

        for threads in [1, 3, 8, 64] {
            assert_eq!(parallel_perft(&pos, 3, threads), serial);
        }
    }

    #[test]
    fn test_stopped_parallel_perft_returns_nothing() {
        let stop = AtomicBool::new(true);
        assert_eq!(
            parallel_perft_with_stop(&Position::default(), 4, 2, &stop),
            None
        );
    }
}
