//! Configuration loading and typed config structures for the planner.
//!
//! The planner reads an optional `craftplan.yaml`. Every field has a
//! default, so an empty file (or no file at all) yields the standard game
//! economics: orange 1.00, yellow 0.75, green 0.25, gray 0.00, at most six
//! convergence passes, and recipes of quality 3 or better kept out of
//! leveling plans.

use std::path::Path;

use craftplan_types::{DEFAULT_QUALITY_CUTOFF, DifficultyColor};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is out of range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level planner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlannerConfig {
    /// Skill-up probability per difficulty color.
    #[serde(default)]
    pub chances: ChanceTable,

    /// Upper bound on planning passes in the intermediate-credit loop,
    /// including the first pass.
    #[serde(default = "default_max_convergence_passes")]
    pub max_convergence_passes: u32,

    /// Output quality tier at which recipes leave the leveling pool.
    #[serde(default = "default_quality_cutoff")]
    pub quality_cutoff: u8,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            chances: ChanceTable::default(),
            max_convergence_passes: default_max_convergence_passes(),
            quality_cutoff: default_quality_cutoff(),
        }
    }
}

impl PlannerConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// Chances must lie in `[0, 1]` and must not increase from orange to
    /// gray. At least one planning pass is required.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.chances.validate()?;
        if self.max_convergence_passes == 0 {
            return Err(ConfigError::Invalid {
                field: "max_convergence_passes",
                reason: String::from("must be at least 1"),
            });
        }
        Ok(())
    }
}

/// Skill-up probability for each difficulty color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ChanceTable {
    /// Chance while the recipe is orange.
    #[serde(default = "default_orange")]
    pub orange: Decimal,
    /// Chance while the recipe is yellow.
    #[serde(default = "default_yellow")]
    pub yellow: Decimal,
    /// Chance while the recipe is green.
    #[serde(default = "default_green")]
    pub green: Decimal,
    /// Chance once the recipe is gray.
    #[serde(default = "default_gray")]
    pub gray: Decimal,
}

impl Default for ChanceTable {
    fn default() -> Self {
        Self {
            orange: default_orange(),
            yellow: default_yellow(),
            green: default_green(),
            gray: default_gray(),
        }
    }
}

impl ChanceTable {
    /// Probability for `color`.
    pub const fn get(&self, color: DifficultyColor) -> Decimal {
        match color {
            DifficultyColor::Orange => self.orange,
            DifficultyColor::Yellow => self.yellow,
            DifficultyColor::Green => self.green,
            DifficultyColor::Gray => self.gray,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let entries = [
            ("chances.orange", self.orange),
            ("chances.yellow", self.yellow),
            ("chances.green", self.green),
            ("chances.gray", self.gray),
        ];
        for (field, value) in entries {
            if value < Decimal::ZERO || value > Decimal::ONE {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} is outside [0, 1]"),
                });
            }
        }
        for pair in entries.windows(2) {
            if let [(_, higher), (field, lower)] = pair {
                if lower > higher {
                    return Err(ConfigError::Invalid {
                        field: *field,
                        reason: format!("{lower} exceeds the chance of the harder color ({higher})"),
                    });
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_max_convergence_passes() -> u32 {
    6
}

const fn default_quality_cutoff() -> u8 {
    DEFAULT_QUALITY_CUTOFF
}

const fn default_orange() -> Decimal {
    Decimal::ONE
}

const fn default_yellow() -> Decimal {
    Decimal::from_parts(75, 0, 0, false, 2)
}

const fn default_green() -> Decimal {
    Decimal::from_parts(25, 0, 0, false, 2)
}

const fn default_gray() -> Decimal {
    Decimal::ZERO
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn default_config_values() {
        let config = PlannerConfig::default();
        assert_eq!(config.chances.orange, dec!(1));
        assert_eq!(config.chances.yellow, dec!(0.75));
        assert_eq!(config.chances.green, dec!(0.25));
        assert_eq!(config.chances.gray, dec!(0));
        assert_eq!(config.max_convergence_passes, 6);
        assert_eq!(config.quality_cutoff, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
chances:
  orange: 1.0
  yellow: 0.8
  green: 0.3
  gray: 0.0
max_convergence_passes: 3
quality_cutoff: 4
";
        let config = PlannerConfig::parse(yaml).unwrap();
        assert_eq!(config.chances.yellow, dec!(0.8));
        assert_eq!(config.chances.green, dec!(0.3));
        assert_eq!(config.max_convergence_passes, 3);
        assert_eq!(config.quality_cutoff, 4);
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "chances:\n  green: 0.2\n";
        let config = PlannerConfig::parse(yaml).unwrap();

        // Green is overridden
        assert_eq!(config.chances.green, dec!(0.2));
        // Everything else uses defaults
        assert_eq!(config.chances.yellow, dec!(0.75));
        assert_eq!(config.max_convergence_passes, 6);
    }

    #[test]
    fn parse_empty_yaml() {
        let config = PlannerConfig::parse("{}");
        assert!(config.is_ok());
    }

    #[test]
    fn rejects_chance_above_one() {
        let err = PlannerConfig::parse("chances:\n  orange: 1.5\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "chances.orange",
                ..
            }
        ));
    }

    #[test]
    fn rejects_non_monotone_table() {
        let err = PlannerConfig::parse("chances:\n  green: 0.9\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "chances.green",
                ..
            }
        ));
    }

    #[test]
    fn rejects_zero_passes() {
        let err = PlannerConfig::parse("max_convergence_passes: 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "max_convergence_passes",
                ..
            }
        ));
    }

    #[test]
    fn chance_table_lookup() {
        let table = ChanceTable::default();
        assert_eq!(table.get(DifficultyColor::Orange), dec!(1));
        assert_eq!(table.get(DifficultyColor::Gray), dec!(0));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("craftplan.yaml");
        if path.exists() {
            let config = PlannerConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
