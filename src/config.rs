//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every tunable has a default, so the engine runs without a config file;
//! the file only overrides the knobs it names.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::odds::{VigMethod, DEFAULT_OVERROUND};

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub projection: ProjectionConfig,
    pub simulation: SimulationConfig,
    pub snapshots: SnapshotsConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub name: String,
    /// Where the recommendations JSON is written.
    pub output_path: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: "GRIDIRON-001".to_string(),
            output_path: "recommendations.json".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Fixed overround stripped from one-sided ladder quotes.
    pub vig: f64,
    /// Derive the vig from both sides of a market where available,
    /// instead of the fixed constant.
    pub market_derived_vig: bool,
    /// Gaussian kernel floor for the synthetic over/under distribution.
    pub sigma_floor: f64,
    /// Gaussian kernel width as a fraction of the line.
    pub sigma_scale: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            vig: DEFAULT_OVERROUND,
            market_derived_vig: false,
            sigma_floor: 1.0,
            sigma_scale: 0.3,
        }
    }
}

impl ProjectionConfig {
    /// The vig-removal method this configuration selects.
    pub fn vig_method(&self) -> VigMethod {
        if self.market_derived_vig {
            VigMethod::TwoSided
        } else {
            VigMethod::Fixed(self.vig)
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimulationConfig {
    /// Whether Monte Carlo profiles are computed at all.
    pub enabled: bool,
    /// Draws per player per stat.
    pub draws: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            draws: 10_000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SnapshotsConfig {
    pub odds: String,
    pub tiers: String,
    pub rosters: String,
    pub backup: String,
}

impl Default for SnapshotsConfig {
    fn default() -> Self {
        Self {
            odds: "snapshots/odds.json".to_string(),
            tiers: "snapshots/tiers.json".to_string(),
            rosters: "snapshots/rosters.json".to_string(),
            backup: "snapshots/backup_projections.json".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Load configuration if the file exists, defaults otherwise.
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}
