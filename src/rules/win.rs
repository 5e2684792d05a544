//! Terminal detection for Connect-N
//!
//! A side wins with `win_length` or more contiguous counters along a row,
//! a column or either diagonal. The game is drawn when every column is
//! full and nobody has won.

use crate::board::{Counter, Pos, Position};

/// Direction vectors for line checking as (column, row) steps
pub const DIRECTIONS: [(i32, i32); 4] = [
    (1, 0),  // Horizontal
    (0, 1),  // Vertical
    (1, 1),  // Diagonal up-right
    (1, -1), // Diagonal down-right
];

/// State of the game at one node of the search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Win(Counter),
    Draw,
    Ongoing,
}

/// Count contiguous `counter` cells through `pos` along one direction,
/// including `pos` itself.
#[inline]
pub fn run_length<P: Position>(
    position: &P,
    pos: Pos,
    dc: i32,
    dr: i32,
    counter: Counter,
) -> usize {
    let config = position.config();
    let mut count = 1;
    for sign in [1, -1] {
        let mut cur = pos;
        while let Some(next) = cur.offset(dc * sign, dr * sign, config) {
            if position.counter_at(next) != Some(counter) {
                break;
            }
            count += 1;
            cur = next;
        }
    }
    count
}

/// Fast win check restricted to the lines through one cell.
///
/// The cell itself is assumed to hold `counter` (typically the last move).
#[inline]
pub fn has_win_at<P: Position>(position: &P, pos: Pos, counter: Counter) -> bool {
    let win_length = position.win_length();
    DIRECTIONS
        .iter()
        .any(|&(dc, dr)| run_length(position, pos, dc, dr, counter) >= win_length)
}

/// Full-board scan for a winning run of `counter`
pub fn has_win<P: Position>(position: &P, counter: Counter) -> bool {
    for col in 0..position.width() {
        for row in 0..position.height() {
            let pos = Pos::new(col as u8, row as u8);
            if position.counter_at(pos) == Some(counter) && has_win_at(position, pos, counter) {
                return true;
            }
        }
    }
    false
}

/// Classify a position.
///
/// With `last_move` known only the lines through that cell are examined,
/// which is enough when the position was not terminal before that move.
pub fn classify<P: Position>(position: &P, last_move: Option<Pos>) -> GameOutcome {
    match last_move {
        Some(pos) => {
            if let Some(counter) = position.counter_at(pos) {
                if has_win_at(position, pos, counter) {
                    return GameOutcome::Win(counter);
                }
            }
        }
        None => {
            for counter in [Counter::O, Counter::X] {
                if has_win(position, counter) {
                    return GameOutcome::Win(counter);
                }
            }
        }
    }

    if position.is_full() {
        GameOutcome::Draw
    } else {
        GameOutcome::Ongoing
    }
}

/// Columns where dropping `counter` wins immediately, in ascending order
pub fn winning_columns<P: Position>(position: &P, counter: Counter) -> Vec<usize> {
    (0..position.width())
        .filter(|&col| {
            position
                .landing_row(col)
                .is_some_and(|row| completes_run(position, Pos::new(col as u8, row), counter))
        })
        .collect()
}

/// Would a `counter` placed on the empty cell `pos` complete a winning run?
#[inline]
pub fn completes_run<P: Position>(position: &P, pos: Pos, counter: Counter) -> bool {
    // run_length counts `pos` as one of ours without reading it
    has_win_at(position, pos, counter)
}
