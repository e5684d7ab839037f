/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{Move, Score, SearchBounds, ZobristKey};

/// Number of bytes in a megabyte
const BYTES_IN_MB: usize = 1024 * 1024;

/// What the score of an entry says about the true value of its position.
///
/// See [CPW](https://www.chessprogramming.org/Node_Types) for the corresponding node types.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum Bound {
    /// The score is exact (a PV node).
    Exact,

    /// The score failed high, so the true value is at least this (a Cut node).
    Lower,

    /// No move improved alpha, so the true value is at most this (an All node).
    Upper,
}

impl Bound {
    /// Classifies `score` against the window it was searched with:
    ///
    /// ```text
    /// if score <= alpha:
    ///     UPPER
    /// else if score >= beta:
    ///     LOWER
    /// else:
    ///     EXACT
    /// ```
    #[inline(always)]
    pub fn new(score: Score, bounds: SearchBounds) -> Self {
        if score <= bounds.alpha {
            Self::Upper
        } else if score >= bounds.beta {
            Self::Lower
        } else {
            Self::Exact
        }
    }
}

/// An entry into a hash table
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct TTableEntry {
    /// Full key of the node this entry represents, used to reject index aliases.
    pub key: ZobristKey,

    /// Depth at which the data for this entry was found.
    pub depth: u8,

    /// Best move found for this position.
    ///
    /// [`Move::NULL`] if no move improved alpha.
    pub bestmove: Move,

    /// Best score found for this position, with mate scores relative to this node.
    pub score: Score,

    /// How `score` bounds the true value.
    pub bound: Bound,
}

impl TTableEntry {
    /// Creates a new [`TTableEntry`] from the provided parameters.
    ///
    /// The bound is classified from the score as searched, then mate scores are
    /// made relative to this node so they remain valid at any ply.
    #[inline(always)]
    pub fn new(
        key: ZobristKey,
        bestmove: Move,
        score: Score,
        bounds: SearchBounds,
        depth: u8,
        ply: usize,
    ) -> Self {
        let bound = Bound::new(score, bounds);

        Self {
            key,
            bestmove,
            score: score.relative(ply),
            depth,
            bound,
        }
    }

    /// Determine whether the score in this entry can be used and, if so, return it.
    ///
    /// An entry's score can be used if and only if:
    ///     1. The entry is exact ([`Bound::Exact`]).
    ///     2. The entry is an upper bound ([`Bound::Upper`]) and its score is `<= alpha`.
    ///     3. The entry is a lower bound ([`Bound::Lower`]) and its score is `>= beta`.
    ///
    /// Depth is not considered here.
    #[inline(always)]
    pub fn try_score(&self, bounds: SearchBounds, ply: usize) -> Option<Score> {
        let score = self.score.absolute(ply);

        match self.bound {
            Bound::Exact => Some(score),
            Bound::Upper => (score <= bounds.alpha).then_some(score),
            Bound::Lower => (score >= bounds.beta).then_some(score),
        }
    }
}

/// Transposition Table.
///
/// Used during a search to keep track of previous search results on positions,
/// avoiding unnecessary re-computations.
///
/// Entries live at `key % capacity`. There is no bucketing: a store always replaces.
#[derive(Debug)]
pub struct TTable {
    /// Internal cache of the TTable.
    cache: Vec<Option<TTableEntry>>,

    /// Number of stores that overwrote an entry for a different position since last clearing.
    pub(crate) collisions: usize,

    /// Number of accesses that have occurred since last clearing.
    pub(crate) accesses: usize,

    /// Number of hits that have occurred since last clearing.
    pub(crate) hits: usize,
}

impl TTable {
    /// Default size of the Transposition Table, in megabytes.
    pub const DEFAULT_SIZE: usize = crate::tune::default_ttable_size!();

    /// Minimum size of the Transposition Table, in megabytes.
    pub const MIN_SIZE: usize = 1;

    /// Maximum size of the Transposition Table, in megabytes.
    pub const MAX_SIZE: usize = 1_024;

    /// Create a new [`TTable`] that is `size` megabytes, clamped to [`TTable::MIN_SIZE`] and [`TTable::MAX_SIZE`].
    ///
    /// # Example
    /// ```
    /// # use newt::TTable;
    /// let tt = TTable::new(1);
    /// assert!(tt.capacity() > 0);
    /// assert_eq!(tt.num_entries(), 0);
    /// ```
    #[inline(always)]
    pub fn new(size: usize) -> Self {
        let size = size.clamp(Self::MIN_SIZE, Self::MAX_SIZE);
        Self::from_capacity((size * BYTES_IN_MB) / size_of::<Option<TTableEntry>>())
    }

    /// Create a new [`TTable`] that can hold `capacity` entries.
    ///
    /// A capacity of zero is raised to one.
    #[inline(always)]
    pub fn from_capacity(capacity: usize) -> Self {
        Self {
            cache: vec![None; capacity.max(1)],
            collisions: 0,
            accesses: 0,
            hits: 0,
        }
    }

    /// Clears the entries of this [`TTable`].
    ///
    /// This is the "new game" boundary; nothing else empties the table.
    #[inline(always)]
    pub fn clear(&mut self) {
        self.cache.iter_mut().for_each(|entry| *entry = None);
        self.collisions = 0;
        self.accesses = 0;
        self.hits = 0;
    }

    /// Returns the number of entries that can fit within this [`TTable`]
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.cache.len()
    }

    /// Returns the size of this [`TTable`], in megabytes.
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.cache.len() * size_of::<Option<TTableEntry>>() / BYTES_IN_MB
    }

    /// Returns the number of `Some` entries in this [`TTable`].
    #[inline(always)]
    pub fn num_entries(&self) -> usize {
        self.cache.iter().filter(|entry| entry.is_some()).count()
    }

    /// Map `key` to an index into this [`TTable`].
    #[inline(always)]
    pub fn index(&self, key: &ZobristKey) -> usize {
        (key.inner() % self.capacity() as u64) as usize
    }

    /// Get the entry if and only if it matches the provided key
    #[inline(always)]
    pub fn get(&self, key: &ZobristKey) -> Option<&TTableEntry> {
        self.entry(key).filter(|e| &e.key == key)
    }

    /// Get the entry, without regards for whether it matches the provided key
    #[inline(always)]
    fn entry(&self, key: &ZobristKey) -> Option<&TTableEntry> {
        // `index` is always in bounds, since the cache is never empty
        self.cache[self.index(key)].as_ref()
    }

    /// Store `entry` in the table at `entry.key`, overriding and returning whatever was there.
    #[inline(always)]
    pub fn store(&mut self, entry: TTableEntry) -> Option<TTableEntry> {
        let index = self.index(&entry.key);
        self.cache[index].replace(entry)
    }
}

impl Default for TTable {
    #[inline(always)]
    fn default() -> Self {
        Self::new(Self::DEFAULT_SIZE)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::*;

    fn window(alpha: i32, beta: i32) -> SearchBounds {
        SearchBounds::new(Score::new(alpha), Score::new(beta))
    }

    #[test]
    fn test_ttable_always_replaces() {
        let pos1 = Position::default();
        let pos2 = Position::from_fen(FEN_KIWIPETE).unwrap();

        // With a single slot, every key shares an index
        let mut tt = TTable::from_capacity(1);
        assert_eq!(tt.index(&pos1.key()), tt.index(&pos2.key()));

        let bounds = SearchBounds::default();
        let entry1 = TTableEntry::new(pos1.key(), Move::NULL, Score::DRAW, bounds, 1, 0);
        let entry2 = TTableEntry::new(pos2.key(), Move::NULL, Score::new(30), bounds, 2, 0);

        assert!(tt.store(entry1).is_none());
        assert_eq!(tt.get(&pos1.key()), Some(&entry1));

        // Overwritten, so the first position is no longer found
        assert_eq!(tt.store(entry2), Some(entry1));
        assert!(tt.get(&pos1.key()).is_none());
        assert_eq!(tt.get(&pos2.key()), Some(&entry2));
        assert_eq!(tt.num_entries(), 1);

        tt.clear();
        assert_eq!(tt.num_entries(), 0);
    }

    #[test]
    fn test_exact_round_trip() {
        let key = Position::default().key();
        let score = Score::new(42);
        let entry = TTableEntry::new(key, Move::NULL, score, window(-100, 100), 5, 3);

        assert_eq!(entry.bound, Bound::Exact);
        assert_eq!(entry.try_score(window(-100, 100), 3), Some(score));
        assert_eq!(entry.try_score(window(0, 10), 7), Some(score));
    }

    #[test]
    fn test_mate_scores_follow_the_ply() {
        let key = Position::default().key();

        // Mate found 6 plies from the root, stored at a node 2 plies deep
        let score = Score::MATE - 6;
        let entry = TTableEntry::new(key, Move::NULL, score, SearchBounds::default(), 4, 2);
        assert_eq!(entry.score, Score::MATE - 4);

        // Read back at the same ply it is unchanged; two plies deeper, the mate is two plies further from the root
        assert_eq!(entry.try_score(SearchBounds::default(), 2), Some(score));
        assert_eq!(
            entry.try_score(SearchBounds::default(), 4),
            Some(Score::MATE - 8)
        );

        // Same for being mated
        let mated = Score::mated_in(5);
        let entry = TTableEntry::new(key, Move::NULL, mated, SearchBounds::default(), 4, 1);
        assert_eq!(entry.try_score(SearchBounds::default(), 1), Some(mated));
        assert_eq!(
            entry.try_score(SearchBounds::default(), 3),
            Some(Score::mated_in(7))
        );
    }

    #[test]
    fn test_bounds_only_cut_on_their_side() {
        let key = Position::default().key();
        let bounds = window(0, 50);

        let upper = TTableEntry::new(key, Move::NULL, Score::new(-20), bounds, 3, 0);
        assert_eq!(upper.bound, Bound::Upper);
        assert!(upper.try_score(window(-10, 40), 0).is_some());
        assert!(upper.try_score(window(-30, 40), 0).is_none());

        let lower = TTableEntry::new(key, Move::NULL, Score::new(80), bounds, 3, 0);
        assert_eq!(lower.bound, Bound::Lower);
        assert!(lower.try_score(window(0, 60), 0).is_some());
        assert!(lower.try_score(window(0, 100), 0).is_none());
    }
}
