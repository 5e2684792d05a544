//! Transposition Table for caching search results
//!
//! The transposition table stores search results indexed by Zobrist hash,
//! so positions reached through different move orders are searched once.
//! Entries carry the generation (move request) that last touched them;
//! [`TranspositionTable::new_search`] uses it to evict the stalest entries
//! once the table fills past its usage ceiling.
//!
//! # Example
//!
//! ```
//! use connectn::search::{EntryType, Probe, TranspositionTable};
//!
//! let mut tt = TranspositionTable::new(1, 90); // 1 MB, evict above 90% usage
//!
//! // Store a search result found at ply 0
//! let hash = 0x1234_5678_9ABC_DEF0;
//! tt.store(hash, 5, 100, EntryType::Exact, Some(4), 0);
//!
//! // An exact entry at least as deep settles the node
//! match tt.probe(hash, 5, -1000, 1000, 0) {
//!     Probe::Cutoff { score, .. } => assert_eq!(score, 100),
//!     other => panic!("expected cutoff, got {other:?}"),
//! }
//! ```

use std::collections::BTreeMap;

use log::trace;

use crate::eval::WIN_THRESHOLD;

/// Smallest table ever allocated
pub const MIN_TT_ENTRIES: usize = 1024;

/// Entry type for score interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// Exact score - the search completed inside the window
    Exact,
    /// Lower bound - score >= stored value (beta cutoff)
    LowerBound,
    /// Upper bound - score <= stored value (alpha fail-low)
    UpperBound,
}

impl EntryType {
    /// Classify a node result against the window the node actually searched
    #[inline]
    pub fn classify(best: i32, alpha: i32, beta: i32) -> Self {
        if best <= alpha {
            EntryType::UpperBound
        } else if best >= beta {
            EntryType::LowerBound
        } else {
            EntryType::Exact
        }
    }
}

/// Transposition table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TTEntry {
    /// Zobrist hash of the position
    pub hash: u64,
    /// Remaining search depth this result was computed with
    pub depth: u8,
    /// Score, with win distances relative to this node
    pub score: i32,
    /// Type of score (exact, lower bound, upper bound)
    pub entry_type: EntryType,
    /// Best column found for this position
    pub best_move: Option<u8>,
    /// Generation that last stored or probed this entry
    pub generation: u32,
}

impl TTEntry {
    /// Best column as an index
    #[inline]
    pub fn best_column(&self) -> Option<usize> {
        self.best_move.map(usize::from)
    }
}

/// Outcome of probing the table at one node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// Stored result settles the node
    Cutoff { score: i32, best_move: Option<usize> },
    /// Entry found; the window may have been narrowed and the stored
    /// move is offered for ordering
    Hint {
        alpha: i32,
        beta: i32,
        best_move: Option<usize>,
    },
    /// No entry for this position
    Miss,
}

/// Convert a score to node-relative form for storage.
///
/// Win scores are `WIN - ply` from the root; storing them relative to the
/// node keeps them valid when the same position is reached at another ply.
#[inline]
pub fn score_to_tt(score: i32, ply: usize) -> i32 {
    let ply = ply as i32;
    if score > WIN_THRESHOLD {
        score + ply
    } else if score < -WIN_THRESHOLD {
        score - ply
    } else {
        score
    }
}

/// Convert a stored score back to root-relative form
#[inline]
pub fn score_from_tt(score: i32, ply: usize) -> i32 {
    let ply = ply as i32;
    if score > WIN_THRESHOLD {
        score - ply
    } else if score < -WIN_THRESHOLD {
        score + ply
    } else {
        score
    }
}

/// Transposition table for caching search results.
///
/// Direct-mapped: each hash maps to exactly one slot (`hash % size`).
/// Collisions are resolved by a generation- and depth-aware replacement
/// policy; a store never fails.
pub struct TranspositionTable {
    entries: Vec<Option<TTEntry>>,
    size: usize,
    used: usize,
    generation: u32,
    usage_ceiling_percent: u8,
}

impl TranspositionTable {
    /// Create a table of roughly `size_mb` megabytes (at least
    /// [`MIN_TT_ENTRIES`] slots). `usage_ceiling_percent` is the occupancy
    /// above which [`TranspositionTable::new_search`] evicts entries.
    #[must_use]
    pub fn new(size_mb: usize, usage_ceiling_percent: u8) -> Self {
        let entry_size = std::mem::size_of::<Option<TTEntry>>();
        let size = ((size_mb * 1024 * 1024) / entry_size).max(MIN_TT_ENTRIES);

        Self {
            entries: vec![None; size],
            size,
            used: 0,
            generation: 0,
            usage_ceiling_percent: usage_ceiling_percent.min(100),
        }
    }

    #[inline]
    fn index(&self, hash: u64) -> usize {
        (hash % self.size as u64) as usize
    }

    /// Current generation
    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Probe the table at a node searched to `depth` with window
    /// `(alpha, beta)` at distance `ply` from the root.
    ///
    /// An entry at least as deep as requested can settle the node: exact
    /// entries always, bounds only when they close the window. Shallower
    /// entries only contribute their best move. A hit refreshes the
    /// entry's generation.
    pub fn probe(&mut self, hash: u64, depth: u8, alpha: i32, beta: i32, ply: usize) -> Probe {
        let idx = self.index(hash);
        let generation = self.generation;
        let entry = match self.entries[idx].as_mut() {
            Some(e) if e.hash == hash => {
                e.generation = generation;
                *e
            }
            _ => return Probe::Miss,
        };

        let best_move = entry.best_column();
        if entry.depth < depth {
            return Probe::Hint {
                alpha,
                beta,
                best_move,
            };
        }

        let score = score_from_tt(entry.score, ply);
        let (mut alpha, mut beta) = (alpha, beta);
        match entry.entry_type {
            EntryType::Exact => return Probe::Cutoff { score, best_move },
            EntryType::LowerBound => alpha = alpha.max(score),
            EntryType::UpperBound => beta = beta.min(score),
        }

        if alpha >= beta {
            Probe::Cutoff { score, best_move }
        } else {
            Probe::Hint {
                alpha,
                beta,
                best_move,
            }
        }
    }

    /// Read an entry without touching its generation
    #[must_use]
    pub fn get(&self, hash: u64) -> Option<TTEntry> {
        self.entries[self.index(hash)].filter(|e| e.hash == hash)
    }

    /// Best column recorded for a position, for move ordering
    #[must_use]
    pub fn best_move(&self, hash: u64) -> Option<usize> {
        self.get(hash).and_then(|e| e.best_column())
    }

    /// Store a position in the table.
    ///
    /// The slot is overwritten if it is empty, holds the same position,
    /// holds an entry from an older generation, or the new result is at
    /// least as deep as the stored one.
    pub fn store(
        &mut self,
        hash: u64,
        depth: u8,
        score: i32,
        entry_type: EntryType,
        best_move: Option<usize>,
        ply: usize,
    ) {
        let idx = self.index(hash);
        let generation = self.generation;

        let should_replace = match &self.entries[idx] {
            None => true,
            Some(e) => e.hash == hash || e.generation != generation || e.depth <= depth,
        };
        if !should_replace {
            return;
        }

        if self.entries[idx].is_none() {
            self.used += 1;
        }
        self.entries[idx] = Some(TTEntry {
            hash,
            depth,
            score: score_to_tt(score, ply),
            entry_type,
            best_move: best_move.and_then(|c| u8::try_from(c).ok()),
            generation,
        });
    }

    /// Start a new move request.
    ///
    /// Advances the generation, then, if occupancy exceeds the usage
    /// ceiling, evicts the least recently touched entries until occupancy
    /// is at most half the ceiling. Returns the number of evicted entries.
    pub fn new_search(&mut self) -> usize {
        self.generation = self.generation.wrapping_add(1);

        let ceiling = self.size * usize::from(self.usage_ceiling_percent) / 100;
        if self.used <= ceiling {
            return 0;
        }
        let target = ceiling / 2;
        let evicted = self.evict_oldest(self.used - target);
        trace!(
            "tt eviction: removed {} entries, {} of {} in use (generation {})",
            evicted,
            self.used,
            self.size,
            self.generation
        );
        evicted
    }

    /// Remove `count` entries, oldest generation first
    fn evict_oldest(&mut self, count: usize) -> usize {
        let generation = self.generation;

        // Histogram of ages, oldest first after reversal
        let mut ages: BTreeMap<u32, usize> = BTreeMap::new();
        for e in self.entries.iter().flatten() {
            *ages.entry(generation.wrapping_sub(e.generation)).or_default() += 1;
        }

        // Every age above `cutoff` goes; `partial` entries of age `cutoff` go too
        let mut remaining = count;
        let mut cutoff = 0;
        let mut partial = 0;
        for (&age, &n) in ages.iter().rev() {
            cutoff = age;
            if n >= remaining {
                partial = remaining;
                break;
            }
            remaining -= n;
        }

        let mut evicted = 0;
        for slot in self.entries.iter_mut() {
            let Some(e) = slot else { continue };
            let age = generation.wrapping_sub(e.generation);
            if age > cutoff || (age == cutoff && partial > 0) {
                if age == cutoff {
                    partial -= 1;
                }
                *slot = None;
                evicted += 1;
            }
        }
        self.used -= evicted;
        evicted
    }

    /// Clear all entries in the table.
    ///
    /// Called when a new match starts or the geometry changes.
    pub fn clear(&mut self) {
        self.entries.fill(None);
        self.used = 0;
        self.generation = 0;
    }

    /// Get statistics about table usage.
    #[must_use]
    pub fn stats(&self) -> TTStats {
        TTStats {
            size: self.size,
            used: self.used,
            usage_percent: (self.used as f64 / self.size as f64 * 100.0) as u8,
        }
    }
}

/// Statistics about transposition table usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TTStats {
    /// Total number of slots in the table
    pub size: usize,
    /// Number of slots currently occupied
    pub used: usize,
    /// Percentage of table in use (0-100)
    pub usage_percent: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{loss_in, win_in, EvalScore};

    const HASH: u64 = 0x1234_5678_9ABC_DEF0;

    #[test]
    fn test_tt_store_probe_exact() {
        let mut tt = TranspositionTable::new(1, 90);
        tt.store(HASH, 5, 100, EntryType::Exact, Some(4), 0);

        assert_eq!(
            tt.probe(HASH, 5, -1000, 1000, 0),
            Probe::Cutoff {
                score: 100,
                best_move: Some(4)
            }
        );
        // Shallower request is also settled
        assert!(matches!(
            tt.probe(HASH, 3, -1000, 1000, 0),
            Probe::Cutoff { score: 100, .. }
        ));
    }

    #[test]
    fn test_tt_depth_requirement() {
        let mut tt = TranspositionTable::new(1, 90);
        tt.store(HASH, 5, 100, EntryType::Exact, Some(2), 0);

        // Stored at D, probed at D+1: only the move is usable
        assert_eq!(
            tt.probe(HASH, 6, -1000, 1000, 0),
            Probe::Hint {
                alpha: -1000,
                beta: 1000,
                best_move: Some(2)
            }
        );
    }

    #[test]
    fn test_tt_lower_bound() {
        let mut tt = TranspositionTable::new(1, 90);
        tt.store(HASH, 5, 200, EntryType::LowerBound, None, 0);

        // Score (200) >= beta (150) closes the window
        assert!(matches!(
            tt.probe(HASH, 5, -1000, 150, 0),
            Probe::Cutoff { score: 200, .. }
        ));
        // Score (200) < beta (300) only raises alpha
        assert_eq!(
            tt.probe(HASH, 5, -1000, 300, 0),
            Probe::Hint {
                alpha: 200,
                beta: 300,
                best_move: None
            }
        );
    }

    #[test]
    fn test_tt_upper_bound() {
        let mut tt = TranspositionTable::new(1, 90);
        tt.store(HASH, 5, 50, EntryType::UpperBound, None, 0);

        // Score (50) <= alpha (100) closes the window
        assert!(matches!(
            tt.probe(HASH, 5, 100, 1000, 0),
            Probe::Cutoff { score: 50, .. }
        ));
        // Score (50) > alpha (0) only lowers beta
        assert_eq!(
            tt.probe(HASH, 5, 0, 1000, 0),
            Probe::Hint {
                alpha: 0,
                beta: 50,
                best_move: None
            }
        );
    }

    #[test]
    fn test_tt_hash_mismatch() {
        let mut tt = TranspositionTable::new(1, 90);
        tt.store(HASH, 5, 100, EntryType::Exact, Some(1), 0);

        // Same slot, different position
        let size = tt.stats().size as u64;
        let other = HASH.wrapping_add(size);
        assert_eq!(tt.probe(other, 5, -1000, 1000, 0), Probe::Miss);
        assert_eq!(tt.get(other), None);
        assert_eq!(tt.best_move(other), None);
    }

    #[test]
    fn test_tt_best_move() {
        let mut tt = TranspositionTable::new(1, 90);
        assert_eq!(tt.best_move(HASH), None);
        tt.store(HASH, 1, 0, EntryType::UpperBound, Some(7), 0);
        assert_eq!(tt.best_move(HASH), Some(7));
    }

    #[test]
    fn test_tt_classify() {
        assert_eq!(EntryType::classify(-5, 0, 10), EntryType::UpperBound);
        assert_eq!(EntryType::classify(0, 0, 10), EntryType::UpperBound);
        assert_eq!(EntryType::classify(5, 0, 10), EntryType::Exact);
        assert_eq!(EntryType::classify(10, 0, 10), EntryType::LowerBound);
    }

    #[test]
    fn test_tt_replacement_deeper() {
        let mut tt = TranspositionTable::new(1, 90);
        let size = tt.stats().size as u64;
        let other = HASH.wrapping_add(size);

        tt.store(HASH, 3, 100, EntryType::Exact, Some(1), 0);
        tt.store(other, 5, 200, EntryType::Exact, Some(2), 0);
        assert_eq!(tt.get(other).map(|e| e.score), Some(200));
        assert_eq!(tt.get(HASH), None);
    }

    #[test]
    fn test_tt_no_replacement_shallower_same_generation() {
        let mut tt = TranspositionTable::new(1, 90);
        let size = tt.stats().size as u64;
        let other = HASH.wrapping_add(size);

        tt.store(HASH, 5, 100, EntryType::Exact, Some(1), 0);
        tt.store(other, 3, 200, EntryType::Exact, Some(2), 0);
        assert_eq!(tt.get(HASH).map(|e| e.score), Some(100));
        assert_eq!(tt.get(other), None);
    }

    #[test]
    fn test_tt_replacement_older_generation() {
        let mut tt = TranspositionTable::new(1, 90);
        let size = tt.stats().size as u64;
        let other = HASH.wrapping_add(size);

        tt.store(HASH, 9, 100, EntryType::Exact, Some(1), 0);
        tt.new_search();
        tt.store(other, 1, 200, EntryType::Exact, Some(2), 0);
        assert_eq!(tt.get(other).map(|e| e.score), Some(200));
    }

    #[test]
    fn test_tt_probe_refreshes_generation() {
        let mut tt = TranspositionTable::new(1, 90);
        tt.store(HASH, 4, 100, EntryType::Exact, None, 0);
        tt.new_search();
        tt.new_search();
        assert_eq!(tt.get(HASH).map(|e| e.generation), Some(0));

        let _ = tt.probe(HASH, 4, -1000, 1000, 0);
        assert_eq!(tt.get(HASH).map(|e| e.generation), Some(2));
    }

    #[test]
    fn test_tt_mate_scores_are_ply_relative() {
        let mut tt = TranspositionTable::new(1, 90);
        // Win found 7 plies from the root, at a node 3 plies deep
        tt.store(HASH, 4, win_in(7), EntryType::Exact, None, 3);
        assert_eq!(tt.get(HASH).map(|e| e.score), Some(win_in(4)));

        // Same node reached at ply 5: the win is now 9 plies away
        assert!(matches!(
            tt.probe(HASH, 4, -EvalScore::INF, EvalScore::INF, 5),
            Probe::Cutoff { score, .. } if score == win_in(9)
        ));

        assert_eq!(score_from_tt(score_to_tt(loss_in(6), 2), 2), loss_in(6));
        assert_eq!(score_to_tt(42, 10), 42);
    }

    #[test]
    fn test_tt_new_search_evicts_oldest_first() {
        // Tiny table: MIN_TT_ENTRIES slots, ceiling 50%
        let mut tt = TranspositionTable::new(0, 50);
        let size = tt.stats().size;
        assert_eq!(size, MIN_TT_ENTRIES);

        // Generation 0: first 400 slots; generation 1: next 300
        for h in 0..400u64 {
            tt.store(h, 1, 0, EntryType::Exact, None, 0);
        }
        tt.new_search();
        for h in 400..700u64 {
            tt.store(h, 1, 0, EntryType::Exact, None, 0);
        }
        assert_eq!(tt.stats().used, 700);

        // 700 > 512: evict down to 256, oldest first
        let evicted = tt.new_search();
        assert_eq!(evicted, 700 - 256);
        assert_eq!(tt.stats().used, 256);
        assert!((0..400u64).all(|h| tt.get(h).is_none()));
        assert_eq!((400..700u64).filter(|&h| tt.get(h).is_some()).count(), 256);
    }

    #[test]
    fn test_tt_new_search_below_ceiling_keeps_entries() {
        let mut tt = TranspositionTable::new(0, 90);
        for h in 0..100u64 {
            tt.store(h, 1, 0, EntryType::Exact, None, 0);
        }
        assert_eq!(tt.new_search(), 0);
        assert_eq!(tt.stats().used, 100);
        assert_eq!(tt.generation(), 1);
    }

    #[test]
    fn test_tt_clear() {
        let mut tt = TranspositionTable::new(1, 90);
        tt.store(HASH, 5, 100, EntryType::Exact, Some(4), 0);
        tt.clear();
        assert_eq!(tt.probe(HASH, 5, -1000, 1000, 0), Probe::Miss);
        assert_eq!(tt.stats().used, 0);
    }

    #[test]
    fn test_tt_stats() {
        let mut tt = TranspositionTable::new(1, 90);
        let initial = tt.stats();
        assert_eq!(initial.used, 0);
        assert_eq!(initial.usage_percent, 0);

        for h in 0..10u64 {
            tt.store(h, 1, 0, EntryType::Exact, None, 0);
        }
        // Same slot twice counts once
        tt.store(3, 2, 0, EntryType::Exact, None, 0);
        assert_eq!(tt.stats().used, 10);
    }

    #[test]
    fn test_tt_size_calculation() {
        let tt = TranspositionTable::new(1, 90);
        let entry_size = std::mem::size_of::<Option<TTEntry>>();
        assert_eq!(tt.stats().size, (1024 * 1024) / entry_size);
    }
}
