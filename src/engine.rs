//! Engine façade: one move decision per request
//!
//! The engine answers a move request in a fixed priority order:
//!
//! 1. **Legality**: a position with no playable column is an error
//! 2. **Table maintenance**: TT generation bump, history aging
//! 3. **Immediate win**: a drop that completes a run is played at once
//! 4. **Forced block**: a single opponent winning column is blocked
//! 5. **Search**: iterative-deepening alpha-beta under the time budget
//! 6. **Fallback**: the most central playable column if the search
//!    produced nothing usable
//!
//! # Example
//!
//! ```
//! use connectn::board::{Board, Counter, GameConfig};
//! use connectn::config::EngineConfig;
//! use connectn::engine::{Engine, MoveSource};
//!
//! let game = GameConfig::new(7, 6, 4).unwrap();
//! let config = EngineConfig {
//!     max_depth: 4,
//!     tt_size_mb: 1,
//!     ..EngineConfig::default()
//! };
//! let mut engine = Engine::new(Counter::O, config);
//!
//! let mut board = Board::new(game);
//! for col in 0..3 {
//!     board.place(col, Counter::O).unwrap();
//!     board.place(6, Counter::X).unwrap();
//! }
//!
//! let result = engine.select_move_with_stats(&board).unwrap();
//! assert_eq!(result.column, 3);
//! assert_eq!(result.source, MoveSource::ImmediateWin);
//! ```

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::board::{Counter, GameConfig, Position};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::eval::win_in;
use crate::rules::winning_columns;
use crate::search::{Clock, MonotonicClock, SearchResult, Searcher, TTStats, TimeGovernor};

/// A participant that chooses columns.
///
/// [`Player::select_move`] is generic over the board provider, so the
/// trait is not object safe: a harness holds players by concrete type or
/// behind a generic parameter, not as `Box<dyn Player>`.
pub trait Player {
    /// Side this player moves for
    fn counter(&self) -> Counter;

    /// Display name
    fn name(&self) -> &str;

    /// Choose a playable column for [`Player::counter`] to move in `position`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoLegalMoves`] when every column is full.
    fn select_move<P: Position>(&mut self, position: &P) -> Result<usize, EngineError>;
}

/// Stage of the decision pipeline that produced the move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveSource {
    /// Drop completes a winning run
    ImmediateWin,
    /// Drop blocks the opponent's only winning column
    ForcedBlock,
    /// Best move of the deepest completed search depth
    Search,
    /// No completed depth; most central playable column
    Fallback,
}

/// Move decision with search statistics.
#[derive(Debug, Clone)]
pub struct MoveResult {
    /// Chosen column, always playable in the requested position
    pub column: usize,
    /// Score from the mover's point of view
    pub score: i32,
    /// Deepest completed search depth (0 when no search ran)
    pub depth: u8,
    /// Nodes visited
    pub nodes: u64,
    /// Time spent on the request
    pub elapsed: Duration,
    /// Pipeline stage that decided
    pub source: MoveSource,
}

impl MoveResult {
    #[inline]
    fn immediate_win(column: usize) -> Self {
        Self {
            column,
            score: win_in(1),
            depth: 0,
            nodes: 1,
            elapsed: Duration::ZERO,
            source: MoveSource::ImmediateWin,
        }
    }

    #[inline]
    fn forced_block(column: usize) -> Self {
        Self {
            column,
            score: 0,
            depth: 0,
            nodes: 1,
            elapsed: Duration::ZERO,
            source: MoveSource::ForcedBlock,
        }
    }

    #[inline]
    fn from_search(column: usize, result: &SearchResult) -> Self {
        Self {
            column,
            score: result.score,
            depth: result.depth,
            nodes: result.nodes,
            elapsed: Duration::ZERO,
            source: MoveSource::Search,
        }
    }

    #[inline]
    fn fallback(column: usize, nodes: u64) -> Self {
        Self {
            column,
            score: 0,
            depth: 0,
            nodes,
            elapsed: Duration::ZERO,
            source: MoveSource::Fallback,
        }
    }
}

/// Connect-N engine for one side of a match.
///
/// Search tables persist across requests and are rebuilt only when the
/// board geometry changes.
pub struct Engine {
    counter: Counter,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    searcher: Option<Searcher>,
}

impl Engine {
    /// Engine on the wall clock.
    #[must_use]
    pub fn new(counter: Counter, config: EngineConfig) -> Self {
        Self::with_clock(counter, config, Arc::new(MonotonicClock::new()))
    }

    /// Engine reading time from `clock`.
    #[must_use]
    pub fn with_clock(counter: Counter, config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            counter,
            config,
            clock,
            searcher: None,
        }
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Transposition table occupancy, `None` before the first request
    pub fn tt_stats(&self) -> Option<TTStats> {
        self.searcher.as_ref().map(Searcher::tt_stats)
    }

    /// Choose a move under the configured time budget.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoLegalMoves`] when every column is full.
    pub fn select_move_with_stats<P: Position>(
        &mut self,
        position: &P,
    ) -> Result<MoveResult, EngineError> {
        let budget = self.config.time_budget();
        self.select_move_within(position, budget)
    }

    /// Choose a move under `budget` instead of the configured one.
    ///
    /// The configured safety buffer still applies; a buffer at least as
    /// large as `budget` leaves no search time and the fallback answers.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoLegalMoves`] when every column is full.
    pub fn select_move_within<P: Position>(
        &mut self,
        position: &P,
        budget: Duration,
    ) -> Result<MoveResult, EngineError> {
        let start = self.clock.now();
        if position.legal_columns().is_empty() {
            return Err(EngineError::NoLegalMoves);
        }

        let side = self.counter;
        let governor = TimeGovernor::new(
            Arc::clone(&self.clock),
            budget,
            self.config.safety_buffer(),
            self.config.soft_time_percent,
            self.config.check_interval_for(position.config()),
        );
        let (min_depth, max_depth) = (self.config.min_depth, self.config.max_depth);

        let searcher = self.searcher_for(position.config());
        let evicted = searcher.new_search();
        if evicted > 0 {
            debug!("evicted {} stale TT entries", evicted);
        }

        let wins = winning_columns(position, side);
        let threats = winning_columns(position, side.other());
        let center_order = position.config().center_order();

        let immediate_win = center_order.iter().copied().find(|c| wins.contains(c));

        let mut result = if let Some(column) = immediate_win {
            MoveResult::immediate_win(column)
        } else if let [block] = threats[..] {
            MoveResult::forced_block(block)
        } else {
            let search = searcher.search(position, side, min_depth, max_depth, governor);
            match search.best_move.filter(|&c| position.is_playable(c)) {
                Some(column) => MoveResult::from_search(column, &search),
                None => {
                    let column = center_order
                        .iter()
                        .copied()
                        .find(|&c| position.is_playable(c))
                        .ok_or(EngineError::NoLegalMoves)?;
                    warn!(
                        "no completed search depth after {} nodes, falling back to column {}",
                        search.nodes, column
                    );
                    MoveResult::fallback(column, search.nodes)
                }
            }
        };

        result.elapsed = self.clock.now().saturating_sub(start);
        info!(
            "{:?} plays column {} ({:?}, score {}, depth {}, {} nodes, {:?})",
            side,
            result.column,
            result.source,
            result.score,
            result.depth,
            result.nodes,
            result.elapsed
        );
        Ok(result)
    }

    /// Forget all match state: TT, killers, history.
    pub fn reset(&mut self) {
        if let Some(searcher) = self.searcher.as_mut() {
            searcher.clear();
        }
    }

    /// Searcher for `game`, rebuilt when the geometry changed.
    fn searcher_for(&mut self, game: &GameConfig) -> &mut Searcher {
        let stale = self
            .searcher
            .as_ref()
            .map_or(true, |s| s.game_config() != game);
        if stale {
            debug!(
                "building search tables for {}x{} connect {}",
                game.width(),
                game.height(),
                game.win_length()
            );
            self.searcher = Some(Searcher::new(*game, &self.config));
        }
        self.searcher.get_or_insert_with(|| Searcher::new(*game, &self.config))
    }
}

impl Player for Engine {
    fn counter(&self) -> Counter {
        self.counter
    }

    fn name(&self) -> &str {
        "connectn"
    }

    fn select_move<P: Position>(&mut self, position: &P) -> Result<usize, EngineError> {
        self.select_move_with_stats(position).map(|result| result.column)
    }
}
