use super::*;
use crate::error::BoardError;

fn standard() -> GameConfig {
    GameConfig::new(10, 8, 4).unwrap()
}

#[test]
fn test_game_config_validation() {
    assert!(GameConfig::new(7, 6, 4).is_ok());
    assert!(GameConfig::new(0, 6, 4).is_err());
    assert!(GameConfig::new(7, 0, 4).is_err());
    assert!(GameConfig::new(7, 6, 0).is_err());
    assert!(GameConfig::new(3, 3, 4).is_err());
    assert!(GameConfig::new(MAX_DIMENSION + 1, 6, 4).is_err());
    // Fits vertically only
    assert!(GameConfig::new(2, 6, 4).is_ok());
}

#[test]
fn test_center_order_even_width() {
    assert_eq!(standard().center_order(), vec![5, 6, 4, 7, 3, 8, 2, 9, 1, 0]);
}

#[test]
fn test_center_order_odd_width() {
    let config = GameConfig::new(7, 6, 4).unwrap();
    assert_eq!(config.center_order(), vec![3, 4, 2, 5, 1, 6, 0]);
    let narrow = GameConfig::new(1, 4, 4).unwrap();
    assert_eq!(narrow.center_order(), vec![0]);
}

#[test]
fn test_center_distance_symmetric() {
    let config = standard();
    assert_eq!(config.center_distance(4), config.center_distance(5));
    assert_eq!(config.center_distance(0), config.center_distance(9));
    assert!(config.center_distance(4) < config.center_distance(3));
}

#[test]
fn test_new_board_is_empty() {
    let board = Board::new(standard());
    assert_eq!(board.piece_count(), 0);
    assert_eq!(board.legal_columns(), (0..10).collect::<Vec<_>>());
    assert!(!board.is_full());
}

#[test]
fn test_play_stacks_with_gravity() {
    let board = Board::new(standard());
    let board = board.play(2, Counter::O).unwrap();
    let board = board.play(2, Counter::X).unwrap();

    assert_eq!(board.counter_at(Pos::new(2, 0)), Some(Counter::O));
    assert_eq!(board.counter_at(Pos::new(2, 1)), Some(Counter::X));
    assert_eq!(board.counter_at(Pos::new(2, 2)), None);
    assert_eq!(board.landing_row(2), Some(2));
    assert_eq!(board.piece_count(), 2);
}

#[test]
fn test_play_leaves_original_untouched() {
    let board = Board::new(standard());
    let next = board.play(0, Counter::O).unwrap();
    assert_eq!(board.piece_count(), 0);
    assert_eq!(next.piece_count(), 1);
}

#[test]
fn test_play_full_column_fails() {
    let config = GameConfig::new(4, 2, 2).unwrap();
    let board = Board::from_columns(config, &[&[Counter::O, Counter::X]]).unwrap();
    assert!(!board.is_playable(0));
    assert_eq!(board.landing_row(0), None);
    assert_eq!(
        board.play(0, Counter::O),
        Err(BoardError::ColumnFull { column: 0 })
    );
}

#[test]
fn test_play_out_of_range_fails() {
    let board = Board::new(standard());
    assert_eq!(
        board.play(10, Counter::O),
        Err(BoardError::ColumnOutOfRange { column: 10, width: 10 })
    );
    assert!(!board.is_playable(10));
}

#[test]
fn test_cell_playable_respects_gravity() {
    let board = Board::from_columns(standard(), &[&[Counter::O]]).unwrap();
    assert!(board.is_cell_playable(Pos::new(0, 1)));
    assert!(!board.is_cell_playable(Pos::new(0, 0)));
    assert!(!board.is_cell_playable(Pos::new(0, 2)));
    assert!(board.is_cell_playable(Pos::new(1, 0)));
    assert!(!board.is_cell_playable(Pos::new(1, 1)));
}

#[test]
fn test_full_board() {
    let config = GameConfig::new(2, 2, 2).unwrap();
    let board = Board::from_columns(
        config,
        &[&[Counter::O, Counter::X], &[Counter::X, Counter::O]],
    )
    .unwrap();
    assert!(board.is_full());
    assert!(board.legal_columns().is_empty());
    assert_eq!(board.piece_count(), 4);
}

/// Minimal provider relying on every default method of the trait.
#[derive(Clone)]
struct GridPosition {
    config: GameConfig,
    cells: Vec<Option<Counter>>,
}

impl Position for GridPosition {
    fn config(&self) -> &GameConfig {
        &self.config
    }

    fn counter_at(&self, pos: Pos) -> Option<Counter> {
        self.cells[pos.to_index(self.config.height())]
    }

    fn play(&self, column: usize, counter: Counter) -> Result<Self, BoardError> {
        let width = self.config.width();
        if column >= width {
            return Err(BoardError::ColumnOutOfRange { column, width });
        }
        let row = self.landing_row(column).ok_or(BoardError::ColumnFull { column })?;
        let mut next = self.clone();
        next.cells[Pos::new(column as u8, row).to_index(self.config.height())] = Some(counter);
        Ok(next)
    }
}

#[test]
fn test_default_trait_methods_match_board() {
    let config = GameConfig::new(5, 4, 3).unwrap();
    let mut grid = GridPosition {
        config,
        cells: vec![None; config.cell_count()],
    };
    let mut board = Board::new(config);
    for (col, counter) in [(0, Counter::O), (0, Counter::X), (3, Counter::O), (0, Counter::O)] {
        grid = grid.play(col, counter).unwrap();
        board.place(col, counter).unwrap();
    }

    for col in 0..5 {
        assert_eq!(grid.landing_row(col), board.landing_row(col));
        assert_eq!(grid.is_playable(col), board.is_playable(col));
    }
    assert_eq!(grid.piece_count(), board.piece_count());
    assert_eq!(grid.legal_columns(), board.legal_columns());
    assert!(grid.is_cell_playable(Pos::new(0, 3)));
    assert!(!grid.is_cell_playable(Pos::new(1, 1)));
}
