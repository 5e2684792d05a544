//! Zobrist hashing for position identification
//!
//! Zobrist hashing allows O(1) incremental hash updates when a counter is
//! dropped. Keys are drawn from a fixed-seed generator, so the same
//! geometry always hashes the same way.
//!
//! # Example
//!
//! ```
//! use connectn::board::{Board, Counter, GameConfig, Position};
//! use connectn::search::ZobristTable;
//!
//! let config = GameConfig::new(7, 6, 4).unwrap();
//! let zt = ZobristTable::new(config);
//! let board = Board::new(config);
//!
//! let hash1 = zt.hash(&board, Counter::O);
//!
//! // Drop a counter and hash the successor from scratch
//! let next = board.play(3, Counter::O).unwrap();
//! let hash2 = zt.hash(&next, Counter::X);
//!
//! // Incremental update is equivalent to full recomputation
//! let pos = connectn::board::Pos::new(3, 0);
//! assert_eq!(zt.update_place(hash1, pos, Counter::O), hash2);
//! ```

use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::board::{Counter, GameConfig, Pos, Position};

/// Fixed seed so hashes are reproducible across runs
const ZOBRIST_SEED: u64 = 0x1234_5678_9ABC_DEF0;

/// Zobrist keys for one board geometry.
///
/// One random value per (cell, counter) plus a side-to-move key.
#[derive(Debug, Clone)]
pub struct ZobristTable {
    config: GameConfig,
    /// Keys indexed by `cell_index * 2 + counter.index()`
    keys: Vec<u64>,
    /// XORed in when O is to move
    o_to_move: u64,
}

impl ZobristTable {
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(ZOBRIST_SEED);
        let keys = (0..config.cell_count() * 2).map(|_| rng.next_u64()).collect();
        Self {
            config,
            keys,
            o_to_move: rng.next_u64(),
        }
    }

    /// Geometry the keys were generated for
    #[inline]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[inline]
    fn key(&self, pos: Pos, counter: Counter) -> u64 {
        self.keys[pos.to_index(self.config.height()) * 2 + counter.index()]
    }

    /// Compute the full hash for a position.
    ///
    /// During search use [`ZobristTable::update_place`] instead.
    #[must_use]
    pub fn hash<P: Position>(&self, position: &P, side_to_move: Counter) -> u64 {
        let mut h = 0u64;
        for col in 0..self.config.width() {
            for row in 0..self.config.height() {
                let pos = Pos::new(col as u8, row as u8);
                if let Some(counter) = position.counter_at(pos) {
                    h ^= self.key(pos, counter);
                }
            }
        }
        if side_to_move == Counter::O {
            h ^= self.o_to_move;
        }
        h
    }

    /// Incrementally update a hash after dropping `counter` on `pos`.
    ///
    /// Also toggles the side-to-move component.
    #[inline]
    #[must_use]
    pub fn update_place(&self, hash: u64, pos: Pos, counter: Counter) -> u64 {
        hash ^ self.key(pos, counter) ^ self.o_to_move
    }
}
