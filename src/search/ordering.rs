//! Move ordering for alpha-beta search
//!
//! Columns are scored in tiers, then sorted descending with ties broken by
//! center-out rank. Ordering only affects how many nodes the search
//! visits, never the value it returns.

use crate::board::{Counter, Pos, Position};
use crate::rules::completes_run;

use super::threat::{count_new_threats, is_poisoned};

/// Ordering scores per tier
pub struct OrderScore;

impl OrderScore {
    /// Drop wins immediately
    pub const WIN: i32 = 1_000_000;
    /// Drop blocks an opponent immediate win
    pub const BLOCK: i32 = 900_000;
    /// Best move stored in the transposition table
    pub const TT_MOVE: i32 = 800_000;
    /// Drop creates two or more new threats
    pub const DOUBLE_THREAT: i32 = 700_000;
    /// Drop creates one new threat
    pub const SINGLE_THREAT: i32 = 600_000;
    /// First killer slot at this ply
    pub const KILLER_1: i32 = 500_000;
    /// Second killer slot at this ply
    pub const KILLER_2: i32 = 490_000;
    /// History scores saturate here, below every tier
    pub const HISTORY_CAP: i32 = 100_000;
    /// Bonus per half-step closer to the center
    pub const CENTER_BIAS: i32 = 10;
    /// Landing under an opponent winning cell sinks below every unpoisoned move
    pub const POISON_PENALTY: i32 = 2_000_000;
}

/// Killer and history tables plus the tiered column scorer.
///
/// Killers are kept per ply (two slots), history per (side, column).
#[derive(Debug, Clone)]
pub struct MoveOrderer {
    width: usize,
    killers: Vec<[Option<u8>; 2]>,
    history: [Vec<i32>; 2],
}

impl MoveOrderer {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            killers: Vec::new(),
            history: [vec![0; width], vec![0; width]],
        }
    }

    /// Playable columns, most promising first
    pub fn order<P: Position>(
        &self,
        position: &P,
        side: Counter,
        ply: usize,
        tt_move: Option<usize>,
    ) -> Vec<usize> {
        self.scored_moves(position, side, ply, tt_move)
            .into_iter()
            .map(|(col, _)| col)
            .collect()
    }

    /// Playable columns with their ordering scores, sorted descending.
    ///
    /// Columns are scored in center-out order and sorted stably, so equal
    /// scores keep the center-out rank.
    pub fn scored_moves<P: Position>(
        &self,
        position: &P,
        side: Counter,
        ply: usize,
        tt_move: Option<usize>,
    ) -> Vec<(usize, i32)> {
        let mut moves: Vec<(usize, i32)> = position
            .config()
            .center_order()
            .into_iter()
            .filter_map(|col| {
                self.score_move(position, col, side, ply, tt_move)
                    .map(|score| (col, score))
            })
            .collect();
        moves.sort_by(|a, b| b.1.cmp(&a.1));
        moves
    }

    /// Ordering score of dropping `side` into `column`, `None` if the
    /// column is not playable.
    pub fn score_move<P: Position>(
        &self,
        position: &P,
        column: usize,
        side: Counter,
        ply: usize,
        tt_move: Option<usize>,
    ) -> Option<i32> {
        let row = position.landing_row(column)?;
        let pos = Pos::new(column as u8, row);

        let tier = if completes_run(position, pos, side) {
            OrderScore::WIN
        } else if completes_run(position, pos, side.other()) {
            OrderScore::BLOCK
        } else if tt_move == Some(column) {
            OrderScore::TT_MOVE
        } else {
            match count_new_threats(position, pos, side) {
                0 => self.killer_score(ply, column),
                1 => OrderScore::SINGLE_THREAT,
                _ => OrderScore::DOUBLE_THREAT,
            }
        };

        let center = (self.width - position.config().center_distance(column)) as i32;
        let mut score = tier + self.history_score(side, column) + center * OrderScore::CENTER_BIAS;

        // A forced move is played whatever sits above it
        if tier < OrderScore::BLOCK && is_poisoned(position, column, side) {
            score -= OrderScore::POISON_PENALTY;
        }
        Some(score)
    }

    fn killer_score(&self, ply: usize, column: usize) -> i32 {
        let Some(slots) = self.killers.get(ply) else {
            return 0;
        };
        let col = Some(column as u8);
        if slots[0] == col {
            OrderScore::KILLER_1
        } else if slots[1] == col {
            OrderScore::KILLER_2
        } else {
            0
        }
    }

    /// Killer columns recorded at `ply`
    pub fn killers(&self, ply: usize) -> [Option<usize>; 2] {
        match self.killers.get(ply) {
            Some(slots) => [slots[0].map(usize::from), slots[1].map(usize::from)],
            None => [None, None],
        }
    }

    /// Accumulated history score of (side, column)
    #[inline]
    pub fn history_score(&self, side: Counter, column: usize) -> i32 {
        self.history[side.index()].get(column).copied().unwrap_or(0)
    }

    /// Record a beta cutoff caused by `column` at `ply` with `depth` remaining
    pub fn record_cutoff(&mut self, side: Counter, ply: usize, column: usize, depth: u8) {
        if self.killers.len() <= ply {
            self.killers.resize(ply + 1, [None; 2]);
        }
        let col = Some(column as u8);
        let slots = &mut self.killers[ply];
        if slots[0] != col {
            slots[1] = slots[0];
            slots[0] = col;
        }

        if let Some(h) = self.history[side.index()].get_mut(column) {
            let bonus = i32::from(depth) * i32::from(depth);
            *h = (*h + bonus).min(OrderScore::HISTORY_CAP);
        }
    }

    /// Start of a move request: killers are position-specific and go,
    /// history is halved so it ages across the match.
    pub fn new_search(&mut self) {
        self.killers.clear();
        for side in self.history.iter_mut() {
            for h in side.iter_mut() {
                *h /= 2;
            }
        }
    }

    /// Forget everything (new match)
    pub fn clear(&mut self) {
        self.killers.clear();
        for side in self.history.iter_mut() {
            side.fill(0);
        }
    }
}
