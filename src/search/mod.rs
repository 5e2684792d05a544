//! Search module for the Connect-N engine
//!
//! Contains:
//! - Zobrist hashing for position identification
//! - Transposition table for caching search results
//! - Threat detection and tiered move ordering
//! - Time governor with an injectable clock
//! - Alpha-Beta search with iterative deepening and quiescence

pub mod alphabeta;
pub mod clock;
pub mod ordering;
pub mod threat;
pub mod tt;
pub mod zobrist;

pub use alphabeta::{SearchResult, SearchStats, Searcher};
pub use clock::{Clock, ManualClock, MonotonicClock, TimeGovernor};
pub use ordering::{MoveOrderer, OrderScore};
pub use threat::{count_new_threats, created_threats, is_poisoned};
pub use tt::{EntryType, Probe, TTEntry, TTStats, TranspositionTable};
pub use zobrist::ZobristTable;
