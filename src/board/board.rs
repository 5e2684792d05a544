//! Board structure with column heights

use super::bitboard::Bitboard;
use super::{Counter, GameConfig, Pos, Position};
use crate::error::BoardError;

/// Gravity board: per-side bitboards plus the fill height of every column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    config: GameConfig,
    o: Bitboard,
    x: Bitboard,
    heights: Vec<u8>,
}

impl Board {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            o: Bitboard::new(config.cell_count()),
            x: Bitboard::new(config.cell_count()),
            heights: vec![0; config.width()],
        }
    }

    /// Build a position from column stacks, bottom counter first.
    ///
    /// # Errors
    ///
    /// Fails if a stack overflows its column or there are more stacks than columns.
    pub fn from_columns(config: GameConfig, columns: &[&[Counter]]) -> Result<Self, BoardError> {
        let mut board = Self::new(config);
        for (col, stack) in columns.iter().enumerate() {
            for &counter in stack.iter() {
                board.place(col, counter)?;
            }
        }
        Ok(board)
    }

    /// Drop a counter in place. Used for setting up positions;
    /// the search only ever goes through [`Position::play`].
    ///
    /// # Errors
    ///
    /// Fails if the column is out of range or full.
    pub fn place(&mut self, column: usize, counter: Counter) -> Result<Pos, BoardError> {
        let width = self.config.width();
        if column >= width {
            return Err(BoardError::ColumnOutOfRange { column, width });
        }
        let row = self.heights[column];
        if row as usize >= self.config.height() {
            return Err(BoardError::ColumnFull { column });
        }
        let pos = Pos::new(column as u8, row);
        let idx = pos.to_index(self.config.height());
        match counter {
            Counter::O => self.o.set(idx),
            Counter::X => self.x.set(idx),
        }
        self.heights[column] += 1;
        Ok(pos)
    }
}

impl Position for Board {
    #[inline]
    fn config(&self) -> &GameConfig {
        &self.config
    }

    #[inline]
    fn counter_at(&self, pos: Pos) -> Option<Counter> {
        let idx = pos.to_index(self.config.height());
        if self.o.get(idx) {
            Some(Counter::O)
        } else if self.x.get(idx) {
            Some(Counter::X)
        } else {
            None
        }
    }

    fn play(&self, column: usize, counter: Counter) -> Result<Self, BoardError> {
        let mut next = self.clone();
        next.place(column, counter)?;
        Ok(next)
    }

    #[inline]
    fn landing_row(&self, column: usize) -> Option<u8> {
        let height = *self.heights.get(column)?;
        (usize::from(height) < self.config.height()).then_some(height)
    }

    #[inline]
    fn is_playable(&self, column: usize) -> bool {
        self.landing_row(column).is_some()
    }

    #[inline]
    fn is_cell_playable(&self, pos: Pos) -> bool {
        self.heights[pos.col as usize] == pos.row
    }

    #[inline]
    fn piece_count(&self) -> usize {
        (self.o.count() + self.x.count()) as usize
    }
}
