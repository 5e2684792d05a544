//! Heuristic evaluation of Connect-N positions
//!
//! The evaluator scores a non-terminal position from one side's point of
//! view as the sum of three terms:
//! - Positional weight (central columns and low rows)
//! - Connectivity of windows only one side still occupies
//! - Immediate threats (playable cells that complete a run)
//!
//! Every term is computed as `own - opponent`, which keeps the evaluation
//! symmetric for negamax: `evaluate(p, A) == -evaluate(p, B)`.

use crate::board::{Counter, GameConfig, Pos, Position};
use crate::rules::{winning_columns, DIRECTIONS};

use super::patterns::{connectivity_weight, EvalScore};

/// Position evaluator with per-geometry precomputed tables
#[derive(Debug, Clone)]
pub struct Evaluator {
    config: GameConfig,
    /// Every line segment of exactly `win_length` cells, flattened
    windows: Vec<Pos>,
    /// Positional weight per column-major cell index
    weights: Vec<i32>,
}

impl Evaluator {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            windows: build_windows(&config),
            weights: build_weights(&config),
        }
    }

    /// Geometry the tables were built for
    #[inline]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Number of precomputed windows
    pub fn window_count(&self) -> usize {
        self.windows.len() / self.config.win_length()
    }

    /// Positional weight of a single cell
    #[inline]
    pub fn weight_at(&self, pos: Pos) -> i32 {
        self.weights[pos.to_index(self.config.height())]
    }

    /// Evaluate the position from the perspective of `perspective`.
    ///
    /// Positive values favor `perspective`. The result is clamped to
    /// `±EvalScore::MAX_HEURISTIC`, so it never competes with a terminal
    /// score. Callers are expected to handle won and drawn positions
    /// before asking for a heuristic.
    #[must_use]
    pub fn evaluate<P: Position>(&self, position: &P, perspective: Counter) -> i32 {
        let total = self.positional_score(position, perspective)
            + self.connectivity_score(position, perspective)
            + self.threat_score(position, perspective);
        total.clamp(-EvalScore::MAX_HEURISTIC, EvalScore::MAX_HEURISTIC)
    }

    /// Positional table sum, own minus opponent
    pub fn positional_score<P: Position>(&self, position: &P, perspective: Counter) -> i32 {
        let height = self.config.height();
        let mut score = 0;
        for col in 0..self.config.width() {
            for row in 0..height {
                let pos = Pos::new(col as u8, row as u8);
                match position.counter_at(pos) {
                    Some(c) if c == perspective => score += self.weights[pos.to_index(height)],
                    Some(_) => score -= self.weights[pos.to_index(height)],
                    None => {}
                }
            }
        }
        score
    }

    /// Connectivity over all windows, own minus opponent.
    ///
    /// Windows holding counters of both sides are dead and score nothing.
    pub fn connectivity_score<P: Position>(&self, position: &P, perspective: Counter) -> i32 {
        let win_length = self.config.win_length();
        let mut score = 0;
        for window in self.windows.chunks_exact(win_length) {
            let mut own = 0;
            let mut opp = 0;
            for &pos in window {
                match position.counter_at(pos) {
                    Some(c) if c == perspective => own += 1,
                    Some(_) => opp += 1,
                    None => {}
                }
            }
            if own > 0 && opp > 0 {
                continue;
            }
            score += connectivity_weight(own, win_length) - connectivity_weight(opp, win_length);
        }
        score
    }

    /// Threat bonus, own minus opponent.
    ///
    /// Under gravity a cell is playable only where a column lands, so each
    /// winning column is exactly one distinct completing cell.
    pub fn threat_score<P: Position>(&self, position: &P, perspective: Counter) -> i32 {
        let own = winning_columns(position, perspective).len() as i32;
        let opp = winning_columns(position, perspective.other()).len() as i32;
        (own - opp) * EvalScore::THREAT_BONUS
    }
}

/// Enumerate every in-bounds segment of `win_length` cells in the four
/// line directions.
fn build_windows(config: &GameConfig) -> Vec<Pos> {
    let span = config.win_length() as i32 - 1;
    let mut windows = Vec::new();
    for col in 0..config.width() as i32 {
        for row in 0..config.height() as i32 {
            for &(dc, dr) in &DIRECTIONS {
                if !config.contains(col + dc * span, row + dr * span) {
                    continue;
                }
                for i in 0..=span {
                    windows.push(Pos::new((col + dc * i) as u8, (row + dr * i) as u8));
                }
            }
        }
    }
    windows
}

/// Central columns and lower rows weigh more
fn build_weights(config: &GameConfig) -> Vec<i32> {
    let width = config.width();
    let height = config.height();
    let mut weights = vec![0; config.cell_count()];
    for col in 0..width {
        let centrality = ((width - 1 - config.center_distance(col)) / 2) as i32;
        for row in 0..height {
            let pos = Pos::new(col as u8, row as u8);
            weights[pos.to_index(height)] = EvalScore::CENTER_WEIGHT * centrality
                + EvalScore::HEIGHT_WEIGHT * (height - row) as i32;
        }
    }
    weights
}
