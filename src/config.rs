//! Engine configuration, loadable from TOML
//!
//! Every field has a default, so a config file only needs the values it
//! overrides:
//!
//! ```toml
//! time_budget_ms = 5000
//! max_depth = 16
//! ```

use std::path::Path;
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::board::GameConfig;
use crate::error::ConfigError;

/// Deepest nominal depth the search accepts
pub const MAX_SEARCH_DEPTH: u8 = 64;

/// Board size (10x8) up to which `node_check_interval` applies unscaled
pub const CHECK_INTERVAL_REFERENCE_CELLS: u64 = 80;

/// Search and resource settings for one engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Iterative deepening starts here; this first depth ignores the soft time limit
    pub min_depth: u8,
    /// Iterative deepening stops here
    pub max_depth: u8,
    /// Wall time the harness grants per move
    pub time_budget_ms: u64,
    /// Kept in reserve; the hard deadline is `time_budget_ms - safety_buffer_ms`
    pub safety_buffer_ms: u64,
    /// Share of the hard deadline after which no new depth starts
    pub soft_time_percent: u8,
    /// Transposition table size
    pub tt_size_mb: usize,
    /// Table occupancy that triggers eviction at the start of a request
    pub tt_usage_ceiling_percent: u8,
    /// Nodes visited between two clock reads on boards up to 10x8
    pub node_check_interval: u64,
    /// Extra plies of forcing moves searched past the nominal depth
    pub quiescence_depth: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_depth: 1,
            max_depth: 24,
            time_budget_ms: 10_000,
            safety_buffer_ms: 2_000,
            soft_time_percent: 50,
            tt_size_mb: 64,
            tt_usage_ceiling_percent: 90,
            node_check_interval: 1024,
            quiescence_depth: 6,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_depth == 0 {
            return Err(ConfigError::Validation("min_depth must be > 0".into()));
        }
        if self.max_depth < self.min_depth {
            return Err(ConfigError::Validation(
                "max_depth must be >= min_depth".into(),
            ));
        }
        if self.max_depth > MAX_SEARCH_DEPTH {
            return Err(ConfigError::Validation(format!(
                "max_depth must be <= {MAX_SEARCH_DEPTH}"
            )));
        }
        if self.time_budget_ms == 0 {
            return Err(ConfigError::Validation(
                "time_budget_ms must be > 0".into(),
            ));
        }
        if self.safety_buffer_ms >= self.time_budget_ms {
            return Err(ConfigError::Validation(
                "safety_buffer_ms must be < time_budget_ms".into(),
            ));
        }
        if self.soft_time_percent == 0 || self.soft_time_percent > 100 {
            return Err(ConfigError::Validation(
                "soft_time_percent must be in [1, 100]".into(),
            ));
        }
        if self.tt_usage_ceiling_percent == 0 || self.tt_usage_ceiling_percent > 100 {
            return Err(ConfigError::Validation(
                "tt_usage_ceiling_percent must be in [1, 100]".into(),
            ));
        }
        if self.node_check_interval == 0 {
            return Err(ConfigError::Validation(
                "node_check_interval must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Nodes between two clock reads when searching `game`.
    ///
    /// Node cost grows with the board, so boards larger than
    /// [`CHECK_INTERVAL_REFERENCE_CELLS`] poll proportionally more often.
    pub fn check_interval_for(&self, game: &GameConfig) -> u64 {
        let cells = game.cell_count() as u64;
        if cells <= CHECK_INTERVAL_REFERENCE_CELLS {
            return self.node_check_interval;
        }
        (self.node_check_interval.saturating_mul(CHECK_INTERVAL_REFERENCE_CELLS) / cells).max(1)
    }

    #[inline]
    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }

    #[inline]
    pub fn safety_buffer(&self) -> Duration {
        Duration::from_millis(self.safety_buffer_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.time_budget() - config.safety_buffer(), Duration::from_secs(8));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config =
            EngineConfig::from_toml_str("max_depth = 12\ntime_budget_ms = 5000\n").unwrap();
        assert_eq!(config.max_depth, 12);
        assert_eq!(config.time_budget_ms, 5000);
        assert_eq!(config.tt_size_mb, EngineConfig::default().tt_size_mb);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = EngineConfig {
            quiescence_depth: 2,
            ..EngineConfig::default()
        };
        let text = toml::to_string(&config).unwrap();
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_parse_error() {
        let err = EngineConfig::from_toml_str("max_depth = \"deep\"").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn test_validation_errors() {
        let cases = [
            EngineConfig {
                min_depth: 0,
                ..EngineConfig::default()
            },
            EngineConfig {
                min_depth: 5,
                max_depth: 4,
                ..EngineConfig::default()
            },
            EngineConfig {
                max_depth: MAX_SEARCH_DEPTH + 1,
                ..EngineConfig::default()
            },
            EngineConfig {
                time_budget_ms: 0,
                ..EngineConfig::default()
            },
            EngineConfig {
                safety_buffer_ms: 10_000,
                ..EngineConfig::default()
            },
            EngineConfig {
                soft_time_percent: 0,
                ..EngineConfig::default()
            },
            EngineConfig {
                tt_usage_ceiling_percent: 101,
                ..EngineConfig::default()
            },
            EngineConfig {
                node_check_interval: 0,
                ..EngineConfig::default()
            },
        ];
        for config in &cases {
            assert!(
                matches!(config.validate(), Err(ConfigError::Validation(_))),
                "expected validation error for {:?}",
                config
            );
        }
    }

    #[test]
    fn test_check_interval_scales_with_board() {
        let config = EngineConfig::default();
        let standard = GameConfig::new(10, 8, 4).unwrap();
        let small = GameConfig::new(7, 6, 4).unwrap();
        let large = GameConfig::new(64, 64, 10).unwrap();

        assert_eq!(config.check_interval_for(&standard), 1024);
        assert_eq!(config.check_interval_for(&small), 1024);
        assert_eq!(config.check_interval_for(&large), 20);

        let eager = EngineConfig {
            node_check_interval: 1,
            ..EngineConfig::default()
        };
        assert_eq!(eager.check_interval_for(&large), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let path = Path::new("/nonexistent/connectn-engine.toml");
        assert!(matches!(
            EngineConfig::load(path),
            Err(ConfigError::FileRead { .. })
        ));
        assert_eq!(
            EngineConfig::load_or_default(path).unwrap(),
            EngineConfig::default()
        );
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "connectn-engine-config-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "quiescence_depth = 3\n").unwrap();
        let config = EngineConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.quiescence_depth, 3);
    }
}
