//! Connect-N move-selection engine
//!
//! Chooses a column for one side of a gravity-drop Connect-N game:
//! - Configurable board width, height and winning run length
//! - Counters drop to the lowest empty cell of a column
//! - A horizontal, vertical or diagonal run of the win length wins
//! - Full board without a run is a draw
//!
//! # Architecture
//!
//! - [`board`]: Geometry, the [`board::Position`] contract and a bitboard implementation
//! - [`rules`]: Win and draw detection
//! - [`eval`]: Score scale and static evaluation
//! - [`search`]: Alpha-beta with transposition table, ordering and time management
//! - [`engine`]: Move-request pipeline and the [`engine::Player`] trait
//! - [`config`]: Tunable engine settings loadable from TOML
//!
//! # Quick Start
//!
//! ```
//! use connectn::{Board, Counter, Engine, EngineConfig, GameConfig, Player};
//!
//! let game = GameConfig::new(10, 8, 4).unwrap();
//! let mut board = Board::new(game);
//! board.place(4, Counter::X).unwrap();
//!
//! let config = EngineConfig {
//!     max_depth: 4,
//!     tt_size_mb: 1,
//!     ..EngineConfig::default()
//! };
//! let mut engine = Engine::new(Counter::O, config);
//! let column = engine.select_move(&board).unwrap();
//! board.place(column, Counter::O).unwrap();
//! ```
//!
//! # Logging
//!
//! The crate logs through the `log` facade and installs no logger. Per-move
//! decisions go to `info`, per-depth progress to `debug`.

pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod eval;
pub mod rules;
pub mod search;

// Re-export commonly used types for convenience
pub use board::{Board, Counter, GameConfig, Pos, Position};
pub use config::EngineConfig;
pub use engine::{Engine, MoveResult, MoveSource, Player};
pub use error::{BoardError, ConfigError, EngineError};
