//! Score constants for Connect-N evaluation
//!
//! Terminal scores live far above anything the heuristic can produce, so a
//! proven result always dominates a positional one. Mate distance is folded
//! in as `WIN - ply`.

use crate::board::MAX_DIMENSION;

/// Score constants shared by the evaluator and the search
pub struct EvalScore;

impl EvalScore {
    /// Base score of a won position (adjusted by ply)
    pub const WIN: i32 = 100_000_000;
    /// Deepest ply a game can reach on the largest supported board
    pub const MAX_PLY: i32 = (MAX_DIMENSION * MAX_DIMENSION) as i32;
    /// Search window bound, strictly above any reachable score
    pub const INF: i32 = Self::WIN + 1;
    /// Heuristic totals are clamped into `[-MAX_HEURISTIC, MAX_HEURISTIC]`
    pub const MAX_HEURISTIC: i32 = 50_000_000;

    /// Playable cell that completes a run for one side
    pub const THREAT_BONUS: i32 = 10_000;

    // Connectivity per window of exactly win-length cells
    /// One counter in an otherwise empty window
    pub const CONNECT_SINGLE: i32 = 1;
    /// Window two counters short of a win
    pub const CONNECT_BUILD: i32 = 10;
    /// Window one counter short of a win
    pub const CONNECT_NEAR: i32 = 100;

    // Positional table
    /// Weight per step towards the central column
    pub const CENTER_WEIGHT: i32 = 3;
    /// Weight per row below the top of the board
    pub const HEIGHT_WEIGHT: i32 = 1;
}

/// Any score beyond this magnitude is a proven win or loss
pub const WIN_THRESHOLD: i32 = EvalScore::WIN - EvalScore::MAX_PLY;

/// Score for winning at `ply` plies from the root
#[inline]
pub fn win_in(ply: usize) -> i32 {
    EvalScore::WIN - ply as i32
}

/// Score for losing at `ply` plies from the root
#[inline]
pub fn loss_in(ply: usize) -> i32 {
    -win_in(ply)
}

/// Check if a score is a proven win or loss
#[inline]
pub fn is_mate_score(score: i32) -> bool {
    score.abs() > WIN_THRESHOLD
}

/// Connectivity weight for a window holding `count` counters of one side
/// and nothing of the other.
///
/// One counter scores [`EvalScore::CONNECT_SINGLE`], `win_length - 2`
/// scores [`EvalScore::CONNECT_BUILD`] and `win_length - 1` scores
/// [`EvalScore::CONNECT_NEAR`]; counts in between grow quadratically.
/// When one counter is also `win_length - 2` (win length 3) it keeps the
/// single weight. Empty and complete windows score zero.
pub fn connectivity_weight(count: usize, win_length: usize) -> i32 {
    if count == 0 || count >= win_length {
        return 0;
    }
    if count + 1 == win_length {
        return EvalScore::CONNECT_NEAR;
    }
    if count == 1 {
        return EvalScore::CONNECT_SINGLE;
    }
    // 2 <= count <= win_length - 2, so win_length >= 4
    let step = (count - 1) as i32;
    let span = (win_length - 3) as i32;
    EvalScore::CONNECT_SINGLE
        + (EvalScore::CONNECT_BUILD - EvalScore::CONNECT_SINGLE) * step * step / (span * span)
}
