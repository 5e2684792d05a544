//! Threat detection for move ordering and quiescence
//!
//! A threat is an empty cell that would complete a winning run for one
//! side. Threats are the currency of Connect-N tactics:
//! - A move creating two threats at once is usually decisive
//! - A move creating one threat forces a reply or shapes the endgame
//! - A move whose landing cell sits directly under an opponent threat
//!   hands the opponent the win on the next turn

use crate::board::{Counter, Pos, Position};
use crate::rules::{completes_run, DIRECTIONS};

/// Empty cells that become threats for `counter` once it drops on `pos`.
///
/// Only threats running through `pos` are reported, so each returned cell
/// is new: it did not complete a run before the move. Cells are distinct,
/// playable or not.
pub fn created_threats<P: Position>(position: &P, pos: Pos, counter: Counter) -> Vec<Pos> {
    let config = position.config();
    let win_length = config.win_length() as i32;
    let mut threats: Vec<Pos> = Vec::new();

    for &(dc, dr) in &DIRECTIONS {
        // Every window of win_length cells along this line containing pos
        for start in -(win_length - 1)..=0 {
            let mut empty: Option<Pos> = None;
            let mut blocked = false;
            for i in start..start + win_length {
                let Some(cell) = pos.offset(dc * i, dr * i, config) else {
                    blocked = true;
                    break;
                };
                if cell == pos {
                    continue;
                }
                match position.counter_at(cell) {
                    Some(c) if c == counter => {}
                    Some(_) => {
                        blocked = true;
                        break;
                    }
                    None if empty.is_none() => empty = Some(cell),
                    // Second empty cell: window is not one short
                    None => {
                        blocked = true;
                        break;
                    }
                }
            }
            if blocked {
                continue;
            }
            if let Some(cell) = empty {
                if !threats.contains(&cell) {
                    threats.push(cell);
                }
            }
        }
    }
    threats
}

/// Number of new threats a drop on `pos` creates for `counter`
#[inline]
pub fn count_new_threats<P: Position>(position: &P, pos: Pos, counter: Counter) -> usize {
    created_threats(position, pos, counter).len()
}

/// Dropping into `column` would let the opponent of `counter` win on the
/// cell directly above.
pub fn is_poisoned<P: Position>(position: &P, column: usize, counter: Counter) -> bool {
    let Some(row) = position.landing_row(column) else {
        return false;
    };
    let above = usize::from(row) + 1;
    if above >= position.height() {
        return false;
    }
    completes_run(position, Pos::new(column as u8, above as u8), counter.other())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, GameConfig};

    fn standard() -> GameConfig {
        GameConfig::new(10, 8, 4).unwrap()
    }

    fn play_all(moves: &[(usize, Counter)]) -> Board {
        let mut board = Board::new(standard());
        for &(col, counter) in moves {
            board.place(col, counter).unwrap();
        }
        board
    }

    #[test]
    fn test_no_threats_on_empty_board() {
        let board = Board::new(standard());
        assert!(created_threats(&board, Pos::new(4, 0), Counter::O).is_empty());
    }

    #[test]
    fn test_single_threat() {
        // O O _ on the floor at the left edge; O on column 2 makes a three
        // that can only be completed at column 3
        let board = play_all(&[(0, Counter::O), (1, Counter::O)]);
        assert_eq!(
            created_threats(&board, Pos::new(2, 0), Counter::O),
            vec![Pos::new(3, 0)]
        );
    }

    #[test]
    fn test_double_threat() {
        // _ _ O O _ _ : O on column 4 gives an open three
        let board = play_all(&[(2, Counter::O), (3, Counter::O)]);
        let mut threats = created_threats(&board, Pos::new(4, 0), Counter::O);
        threats.sort_by_key(|p| p.col);
        assert_eq!(threats, vec![Pos::new(1, 0), Pos::new(5, 0)]);
        assert_eq!(count_new_threats(&board, Pos::new(4, 0), Counter::O), 2);
    }

    #[test]
    fn test_gap_threat() {
        // O _ O : filling a side creates the gap threat
        let board = play_all(&[(3, Counter::O), (5, Counter::O)]);
        let threats = created_threats(&board, Pos::new(6, 0), Counter::O);
        assert_eq!(threats, vec![Pos::new(4, 0)]);
    }

    #[test]
    fn test_blocked_window_is_not_a_threat() {
        // X O O _ _ at the floor: O on 3 threatens only column 4
        let board = play_all(&[(0, Counter::X), (1, Counter::O), (2, Counter::O)]);
        assert_eq!(
            created_threats(&board, Pos::new(3, 0), Counter::O),
            vec![Pos::new(4, 0)]
        );
    }

    #[test]
    fn test_vertical_threat() {
        let board = play_all(&[(7, Counter::X), (7, Counter::X)]);
        assert_eq!(
            created_threats(&board, Pos::new(7, 2), Counter::X),
            vec![Pos::new(7, 3)]
        );
    }

    #[test]
    fn test_poisoned_column() {
        // X threatens (3,1) along row 1; dropping into column 3 lets X win there
        let board = play_all(&[
            (0, Counter::O),
            (1, Counter::O),
            (2, Counter::X),
            (0, Counter::X),
            (1, Counter::X),
            (2, Counter::X),
        ]);
        assert!(is_poisoned(&board, 3, Counter::O));
        assert!(!is_poisoned(&board, 4, Counter::O));
        // For X the same column is its own threat, not poison
        assert!(!is_poisoned(&board, 3, Counter::X));
    }

    #[test]
    fn test_poisoned_top_row_is_safe() {
        let config = GameConfig::new(4, 1, 4).unwrap();
        let board = Board::new(config);
        assert!(!is_poisoned(&board, 0, Counter::O));
    }
}
