//! Alpha-Beta search with iterative deepening and transposition table
//!
//! This module implements the core search algorithm of the engine.
//! It uses negamax with alpha-beta pruning over the [`Position`] trait.
//!
//! # Features
//!
//! - Iterative deepening; only fully completed depths are accepted
//! - Transposition table keyed by incremental Zobrist hashes
//! - Immediate-win shortcut at every node
//! - Quiescence over forced blocks and threat-creating moves
//! - Killer and history move ordering
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use connectn::board::{Board, Counter, GameConfig};
//! use connectn::config::EngineConfig;
//! use connectn::search::{ManualClock, Searcher, TimeGovernor};
//!
//! let game = GameConfig::new(7, 6, 4).unwrap();
//! let config = EngineConfig { tt_size_mb: 1, ..EngineConfig::default() };
//! let mut searcher = Searcher::new(game, &config);
//!
//! // A frozen clock never expires, so the search is bounded by depth only
//! let governor = TimeGovernor::new(
//!     Arc::new(ManualClock::new()),
//!     Duration::from_secs(10),
//!     Duration::ZERO,
//!     100,
//!     1024,
//! );
//! let board = Board::new(game);
//! let result = searcher.search(&board, Counter::O, 1, 4, governor);
//! assert_eq!(result.depth, 4);
//! assert!(result.best_move.is_some());
//! ```

use std::time::Duration;

use log::debug;

use crate::board::{Counter, GameConfig, Pos, Position};
use crate::config::EngineConfig;
use crate::eval::{is_mate_score, loss_in, win_in, EvalScore, Evaluator};
use crate::rules::{has_win_at, winning_columns};

use super::clock::TimeGovernor;
use super::ordering::MoveOrderer;
use super::threat::count_new_threats;
use super::tt::{EntryType, Probe, TTStats, TranspositionTable};
use super::zobrist::ZobristTable;

/// Infinity score for alpha-beta bounds
const INF: i32 = EvalScore::INF;

/// Search statistics for diagnostics and tuning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes visited inside quiescence
    pub qnodes: u64,
    /// Total beta cutoffs (fail-high)
    pub beta_cutoffs: u64,
    /// Beta cutoffs on the first move tried (measures move ordering quality)
    pub first_move_cutoffs: u64,
    /// Total TT probes
    pub tt_probes: u64,
    /// TT probes that settled the node
    pub tt_cutoffs: u64,
}

impl SearchStats {
    /// First-move cutoff rate in percent
    pub fn first_move_rate(&self) -> f64 {
        if self.beta_cutoffs == 0 {
            0.0
        } else {
            self.first_move_cutoffs as f64 / self.beta_cutoffs as f64 * 100.0
        }
    }

    /// TT cutoff rate in percent
    pub fn tt_cutoff_rate(&self) -> f64 {
        if self.tt_probes == 0 {
            0.0
        } else {
            self.tt_cutoffs as f64 / self.tt_probes as f64 * 100.0
        }
    }
}

/// Result of one iterative-deepening search.
#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    /// Best column of the deepest completed depth, if any depth completed
    pub best_move: Option<usize>,
    /// Score of that column from the searching side's point of view
    pub score: i32,
    /// Deepest fully completed depth (0 if none)
    pub depth: u8,
    /// Total nodes visited, including aborted depths
    pub nodes: u64,
    /// Time spent, as seen by the governor's clock
    pub elapsed: Duration,
    /// Search diagnostics
    pub stats: SearchStats,
}

/// Negamax searcher for one board geometry.
///
/// Owns the transposition table, Zobrist keys, evaluator and move-ordering
/// tables; all of them persist across move requests of one match.
pub struct Searcher {
    game: GameConfig,
    zobrist: ZobristTable,
    tt: TranspositionTable,
    evaluator: Evaluator,
    orderer: MoveOrderer,
    quiescence_depth: u8,
    governor: Option<TimeGovernor>,
    stopped: bool,
    nodes: u64,
    stats: SearchStats,
}

impl Searcher {
    /// Create a searcher for `game` sized by `config`.
    #[must_use]
    pub fn new(game: GameConfig, config: &EngineConfig) -> Self {
        Self {
            game,
            zobrist: ZobristTable::new(game),
            tt: TranspositionTable::new(config.tt_size_mb, config.tt_usage_ceiling_percent),
            evaluator: Evaluator::new(game),
            orderer: MoveOrderer::new(game.width()),
            quiescence_depth: config.quiescence_depth,
            governor: None,
            stopped: false,
            nodes: 0,
            stats: SearchStats::default(),
        }
    }

    /// Geometry this searcher was built for
    #[inline]
    pub fn game_config(&self) -> &GameConfig {
        &self.game
    }

    /// Table maintenance at the start of a move request: advance the TT
    /// generation (evicting stale entries above the ceiling) and age the
    /// history table. Returns the number of evicted TT entries.
    pub fn new_search(&mut self) -> usize {
        self.orderer.new_search();
        self.tt.new_search()
    }

    /// Forget all match state.
    pub fn clear(&mut self) {
        self.tt.clear();
        self.orderer.clear();
    }

    /// Get statistics about the transposition table.
    #[must_use]
    pub fn tt_stats(&self) -> TTStats {
        self.tt.stats()
    }

    /// Iterative deepening search for `side` to move.
    ///
    /// Deepening starts at `min_depth`, lowered to the number of empty
    /// cells when fewer remain. That first depth starts unless the hard
    /// deadline has passed; deeper ones also need the governor's soft limit
    /// to allow them. A depth aborted by the deadline is discarded entirely.
    pub fn search<P: Position>(
        &mut self,
        position: &P,
        side: Counter,
        min_depth: u8,
        max_depth: u8,
        governor: TimeGovernor,
    ) -> SearchResult {
        self.governor = Some(governor);
        self.stopped = false;
        self.nodes = 0;
        self.stats = SearchStats::default();

        let hash = self.zobrist.hash(position, side);
        let empty_cells = self.game.cell_count().saturating_sub(position.piece_count());
        let mut result = SearchResult::default();
        let mut last_depth_time = Duration::ZERO;

        let max_depth = max_depth.max(1);
        let solved_depth = u8::try_from(empty_cells).unwrap_or(u8::MAX);
        let first_depth = min_depth.clamp(1, max_depth).min(solved_depth).max(1);

        for depth in first_depth..=max_depth {
            // Tree fully solved once depth covers every empty cell
            if usize::from(depth) > empty_cells {
                break;
            }
            let Some(governor) = self.governor.as_mut() else {
                break;
            };
            if governor.check_now() {
                break;
            }
            if depth > first_depth && !governor.can_start_depth(last_depth_time) {
                break;
            }
            let depth_start = governor.elapsed();

            let Some((column, score)) = self.search_root(position, side, depth, hash) else {
                debug!("depth {} aborted after {} nodes", depth, self.nodes);
                break;
            };

            let elapsed = self.elapsed();
            last_depth_time = elapsed.saturating_sub(depth_start);
            result.best_move = Some(column);
            result.score = score;
            result.depth = depth;
            debug!(
                "depth {} score {} move {} nodes {} elapsed {:?} first-cut {:.1}% tt-cut {:.1}%",
                depth,
                score,
                column,
                self.nodes,
                elapsed,
                self.stats.first_move_rate(),
                self.stats.tt_cutoff_rate()
            );

            if is_mate_score(score) {
                break;
            }
        }

        result.nodes = self.nodes;
        result.elapsed = self.elapsed();
        result.stats = self.stats.clone();
        self.governor = None;
        result
    }

    fn elapsed(&self) -> Duration {
        self.governor
            .as_ref()
            .map_or(Duration::ZERO, TimeGovernor::elapsed)
    }

    /// Count a node and poll the deadline.
    #[inline]
    fn tick(&mut self) -> bool {
        self.nodes += 1;
        if !self.stopped {
            if let Some(governor) = self.governor.as_mut() {
                self.stopped = governor.tick();
            }
        }
        self.stopped
    }

    /// Root-level search with a full window.
    ///
    /// Returns `None` if the deadline interrupted this depth.
    fn search_root<P: Position>(
        &mut self,
        position: &P,
        side: Counter,
        depth: u8,
        hash: u64,
    ) -> Option<(usize, i32)> {
        let mut alpha = -INF;
        let beta = INF;
        let mut best: Option<(usize, i32)> = None;

        let tt_move = self.tt.best_move(hash);
        let moves = self.orderer.order(position, side, 0, tt_move);

        for column in moves {
            let Some(row) = position.landing_row(column) else {
                continue;
            };
            let Ok(child) = position.play(column, side) else {
                continue;
            };
            let pos = Pos::new(column as u8, row);
            let child_hash = self.zobrist.update_place(hash, pos, side);

            let score = -self.alpha_beta(
                &child,
                side.other(),
                depth - 1,
                -beta,
                -alpha,
                1,
                pos,
                child_hash,
            );
            if self.stopped {
                return None;
            }

            if best.map_or(true, |(_, s)| score > s) {
                best = Some((column, score));
            }
            alpha = alpha.max(score);
        }

        let (column, score) = best?;
        self.tt.store(hash, depth, score, EntryType::Exact, Some(column), 0);
        Some((column, score))
    }

    /// Recursive alpha-beta search with negamax formulation.
    ///
    /// `last_move` is the cell the opponent just filled; it drives the
    /// terminal fast path.
    #[allow(clippy::too_many_arguments)]
    fn alpha_beta<P: Position>(
        &mut self,
        position: &P,
        side: Counter,
        depth: u8,
        alpha: i32,
        beta: i32,
        ply: usize,
        last_move: Pos,
        hash: u64,
    ) -> i32 {
        if self.tick() {
            return 0;
        }

        // Terminal: opponent just won, or the board is full
        if has_win_at(position, last_move, side.other()) {
            return loss_in(ply);
        }
        if position.is_full() {
            return 0;
        }

        // Immediate win shortcut
        if !winning_columns(position, side).is_empty() {
            return win_in(ply + 1);
        }

        if depth == 0 {
            return self.resolve_quiet(position, side, alpha, beta, ply, 0);
        }

        // TT probe
        self.stats.tt_probes += 1;
        let (mut alpha, beta, tt_move) = match self.tt.probe(hash, depth, alpha, beta, ply) {
            Probe::Cutoff { score, .. } => {
                self.stats.tt_cutoffs += 1;
                return score;
            }
            Probe::Hint {
                alpha,
                beta,
                best_move,
            } => (alpha, beta, best_move),
            Probe::Miss => (alpha, beta, None),
        };
        let alpha_searched = alpha;

        let moves = self.orderer.order(position, side, ply, tt_move);
        let mut best_score = -INF;
        let mut best_move = None;

        for (i, column) in moves.into_iter().enumerate() {
            let Some(row) = position.landing_row(column) else {
                continue;
            };
            let Ok(child) = position.play(column, side) else {
                continue;
            };
            let pos = Pos::new(column as u8, row);
            let child_hash = self.zobrist.update_place(hash, pos, side);

            let score = -self.alpha_beta(
                &child,
                side.other(),
                depth - 1,
                -beta,
                -alpha,
                ply + 1,
                pos,
                child_hash,
            );
            if self.stopped {
                return 0;
            }

            if score > best_score {
                best_score = score;
                best_move = Some(column);
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                self.stats.beta_cutoffs += 1;
                if i == 0 {
                    self.stats.first_move_cutoffs += 1;
                }
                self.orderer.record_cutoff(side, ply, column, depth);
                break;
            }
        }

        if best_move.is_none() {
            return 0;
        }

        let entry_type = EntryType::classify(best_score, alpha_searched, beta);
        self.tt.store(hash, depth, best_score, entry_type, best_move, ply);

        best_score
    }

    /// Quiescence entry for a child node: terminal and immediate-win checks,
    /// then [`Searcher::resolve_quiet`].
    #[allow(clippy::too_many_arguments)]
    fn quiescence<P: Position>(
        &mut self,
        position: &P,
        side: Counter,
        alpha: i32,
        beta: i32,
        ply: usize,
        qs_depth: u8,
        last_move: Pos,
    ) -> i32 {
        if self.tick() {
            return 0;
        }
        self.stats.qnodes += 1;

        if has_win_at(position, last_move, side.other()) {
            return loss_in(ply);
        }
        if position.is_full() {
            return 0;
        }
        if !winning_columns(position, side).is_empty() {
            return win_in(ply + 1);
        }

        self.resolve_quiet(position, side, alpha, beta, ply, qs_depth)
    }

    /// Quiescence body for a node known to be non-terminal with no
    /// immediate win for `side`.
    ///
    /// - Two or more opponent winning columns: the loss is forced.
    /// - Exactly one: only the block is searched.
    /// - Otherwise: stand-pat lower bound, then threat-creating moves only.
    fn resolve_quiet<P: Position>(
        &mut self,
        position: &P,
        side: Counter,
        mut alpha: i32,
        beta: i32,
        ply: usize,
        qs_depth: u8,
    ) -> i32 {
        let threats = winning_columns(position, side.other());
        if threats.len() >= 2 {
            return loss_in(ply + 2);
        }

        let stand_pat = self.evaluator.evaluate(position, side);
        if qs_depth >= self.quiescence_depth {
            return stand_pat;
        }

        if let [block] = threats[..] {
            let Some(row) = position.landing_row(block) else {
                return stand_pat;
            };
            let Ok(child) = position.play(block, side) else {
                return stand_pat;
            };
            let pos = Pos::new(block as u8, row);
            let score = -self.quiescence(
                &child,
                side.other(),
                -beta,
                -alpha,
                ply + 1,
                qs_depth + 1,
                pos,
            );
            return if self.stopped { 0 } else { score };
        }

        // Stand-pat: static evaluation as lower bound
        if stand_pat >= beta {
            return stand_pat;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        // Noisy moves: drops that create at least one new threat
        let mut noisy: Vec<(usize, u8, usize)> = Vec::new();
        for column in self.game.center_order() {
            let Some(row) = position.landing_row(column) else {
                continue;
            };
            let created = count_new_threats(position, Pos::new(column as u8, row), side);
            if created > 0 {
                noisy.push((column, row, created));
            }
        }
        noisy.sort_by(|a, b| b.2.cmp(&a.2));

        let mut best_score = stand_pat;
        for (column, row, _) in noisy {
            let Ok(child) = position.play(column, side) else {
                continue;
            };
            let pos = Pos::new(column as u8, row);
            let score = -self.quiescence(
                &child,
                side.other(),
                -beta,
                -alpha,
                ply + 1,
                qs_depth + 1,
                pos,
            );
            if self.stopped {
                return 0;
            }

            if score > best_score {
                best_score = score;
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                break;
            }
        }

        best_score
    }
}
