//! Board representation for Connect-N
//!
//! The engine only talks to boards through the [`Position`] trait, so any
//! harness can plug in its own board-state provider. [`Board`] is the
//! bitboard-backed implementation shipped with the crate.

pub mod bitboard;
pub mod board;

#[cfg(test)]
mod tests;

// Re-exports
pub use bitboard::Bitboard;
pub use board::Board;

use crate::error::BoardError;

/// Largest supported width or height
pub const MAX_DIMENSION: usize = 64;

/// The two sides of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    O,
    X,
}

impl Counter {
    /// Get the other side
    #[inline]
    pub fn other(self) -> Counter {
        match self {
            Counter::O => Counter::X,
            Counter::X => Counter::O,
        }
    }

    /// Dense index for per-side tables
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Counter::O => 0,
            Counter::X => 1,
        }
    }
}

/// Cell on the board. Row 0 is the floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub col: u8,
    pub row: u8,
}

impl Pos {
    #[inline]
    pub fn new(col: u8, row: u8) -> Self {
        Self { col, row }
    }

    /// Column-major index for a board of the given height
    #[inline]
    pub fn to_index(self, height: usize) -> usize {
        self.col as usize * height + self.row as usize
    }

    /// Offset by a direction, returning `None` when leaving the board
    #[inline]
    pub fn offset(self, dc: i32, dr: i32, config: &GameConfig) -> Option<Pos> {
        let c = i32::from(self.col) + dc;
        let r = i32::from(self.row) + dr;
        if config.contains(c, r) {
            Some(Pos::new(c as u8, r as u8))
        } else {
            None
        }
    }
}

/// Board geometry: width, height and the run length that wins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameConfig {
    width: usize,
    height: usize,
    win_length: usize,
}

impl GameConfig {
    /// Validate and build a geometry.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidGeometry`] for zero or oversized
    /// dimensions and for a win length that fits in neither direction.
    pub fn new(width: usize, height: usize, win_length: usize) -> Result<Self, BoardError> {
        if width == 0 || height == 0 {
            return Err(BoardError::InvalidGeometry(format!(
                "dimensions must be non-zero, got {width}x{height}"
            )));
        }
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(BoardError::InvalidGeometry(format!(
                "dimensions must be at most {MAX_DIMENSION}, got {width}x{height}"
            )));
        }
        if win_length == 0 || win_length > width.max(height) {
            return Err(BoardError::InvalidGeometry(format!(
                "win length {win_length} does not fit a {width}x{height} board"
            )));
        }
        Ok(Self {
            width,
            height,
            win_length,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn win_length(&self) -> usize {
        self.win_length
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Check signed coordinates against the board bounds
    #[inline]
    pub fn contains(&self, col: i32, row: i32) -> bool {
        col >= 0 && row >= 0 && (col as usize) < self.width && (row as usize) < self.height
    }

    /// Columns from the center outwards: center, then right/left alternating.
    pub fn center_order(&self) -> Vec<usize> {
        let center = self.width / 2;
        let mut order = Vec::with_capacity(self.width);
        order.push(center);
        for offset in 1..=center.max(self.width - center) {
            if center + offset < self.width {
                order.push(center + offset);
            }
            if offset <= center {
                order.push(center - offset);
            }
        }
        order
    }

    /// Doubled distance from the geometric center, so even widths stay symmetric.
    #[inline]
    pub fn center_distance(&self, col: usize) -> usize {
        (2 * col).abs_diff(self.width - 1)
    }
}

/// Board-state provider consumed by the engine.
///
/// Implementors supply geometry, occupancy and a move simulator that
/// returns a fresh position. Everything else has a default in terms of
/// those three.
pub trait Position: Sized {
    /// Board geometry
    fn config(&self) -> &GameConfig;

    /// Counter occupying a cell, `None` if empty
    fn counter_at(&self, pos: Pos) -> Option<Counter>;

    /// Drop `counter` into `column`, producing the successor position.
    ///
    /// # Errors
    ///
    /// Fails with [`BoardError::ColumnFull`] or [`BoardError::ColumnOutOfRange`].
    fn play(&self, column: usize, counter: Counter) -> Result<Self, BoardError>;

    #[inline]
    fn width(&self) -> usize {
        self.config().width()
    }

    #[inline]
    fn height(&self) -> usize {
        self.config().height()
    }

    #[inline]
    fn win_length(&self) -> usize {
        self.config().win_length()
    }

    /// Row a counter dropped into `column` would land on
    fn landing_row(&self, column: usize) -> Option<u8> {
        if column >= self.width() {
            return None;
        }
        let col = column as u8;
        (0..self.height() as u8).find(|&row| self.counter_at(Pos::new(col, row)).is_none())
    }

    /// A column is playable iff its top cell is empty
    #[inline]
    fn is_playable(&self, column: usize) -> bool {
        column < self.width()
            && self
                .counter_at(Pos::new(column as u8, (self.height() - 1) as u8))
                .is_none()
    }

    /// Empty cell resting on the floor or on another counter
    fn is_cell_playable(&self, pos: Pos) -> bool {
        if self.counter_at(pos).is_some() {
            return false;
        }
        pos.row == 0 || self.counter_at(Pos::new(pos.col, pos.row - 1)).is_some()
    }

    /// Playable columns in ascending order
    fn legal_columns(&self) -> Vec<usize> {
        (0..self.width()).filter(|&c| self.is_playable(c)).collect()
    }

    /// Total counters on the board
    fn piece_count(&self) -> usize {
        let mut count = 0;
        for col in 0..self.width() {
            for row in 0..self.height() {
                if self.counter_at(Pos::new(col as u8, row as u8)).is_some() {
                    count += 1;
                }
            }
        }
        count
    }

    /// Every column's top cell is occupied
    fn is_full(&self) -> bool {
        (0..self.width()).all(|c| !self.is_playable(c))
    }
}
