//! Game rules for Connect-N
//!
//! Only what the search needs to terminate: win detection, draw detection
//! and immediate-win enumeration.

pub mod win;

pub use win::{
    classify, completes_run, has_win, has_win_at, run_length, winning_columns, GameOutcome,
    DIRECTIONS,
};
