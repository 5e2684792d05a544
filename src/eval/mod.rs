//! Position evaluation

pub mod heuristic;
pub mod patterns;

pub use heuristic::Evaluator;
pub use patterns::{connectivity_weight, is_mate_score, loss_in, win_in, EvalScore, WIN_THRESHOLD};
