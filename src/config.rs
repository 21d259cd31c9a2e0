// src/config.rs
//! Engine configuration: scoring mode and color bands, loaded from TOML.
//!
//! Invalid values are sanitized instead of rejected; grading keeps working
//! with whatever config ships.

use crate::grade::criteria::CriteriaSet;
use crate::grade::scoring::{ColorBands, ScoringMode};
use crate::grade::GradeOptions;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

pub const DEFAULT_ENGINE_CONFIG_PATH: &str = "config/engine.toml";
pub const ENV_ENGINE_CONFIG_PATH: &str = "GRADER_CONFIG_PATH";

/// Mode selector as written in config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModeChoice {
    /// Pick per criteria set: weighted-sum when weights sum to 100.
    #[default]
    Auto,
    WeightedSum,
    BaseDensity,
}

impl ModeChoice {
    pub fn resolve(self, set: &CriteriaSet) -> ScoringMode {
        match self {
            ModeChoice::Auto => ScoringMode::default_for(set),
            ModeChoice::WeightedSum => ScoringMode::WeightedSum,
            ModeChoice::BaseDensity => ScoringMode::BaseDensity,
        }
    }
}

/// Named banding scheme as written in config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandChoice {
    #[default]
    Standard,
    Strict,
}

impl BandChoice {
    pub fn bands(self) -> ColorBands {
        match self {
            BandChoice::Standard => ColorBands::standard(),
            BandChoice::Strict => ColorBands::strict(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub grading: GradingSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GradingSection {
    #[serde(default)]
    pub mode: ModeChoice,
    #[serde(default)]
    pub bands: BandChoice,
    /// Explicit thresholds override the named scheme when present.
    #[serde(default)]
    pub green_min: Option<u32>,
    #[serde(default)]
    pub yellow_min: Option<u32>,
}

impl EngineConfig {
    /// Load from `GRADER_CONFIG_PATH` or the default path. A missing file is
    /// not an error; defaults apply.
    pub fn load() -> anyhow::Result<Self> {
        let path = env::var(ENV_ENGINE_CONFIG_PATH)
            .unwrap_or_else(|_| DEFAULT_ENGINE_CONFIG_PATH.to_string());
        if !Path::new(&path).exists() {
            return Ok(Self::default());
        }
        Self::load_from_file(&path)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!(
                "Failed to read engine config at {}: {}",
                path.as_ref().display(),
                e
            )
        })?;
        let cfg: EngineConfig = toml::from_str(&data)?;
        Ok(cfg)
    }

    /// Effective bands: named scheme, explicit thresholds on top, sanitized.
    pub fn bands(&self) -> ColorBands {
        let base = self.grading.bands.bands();
        ColorBands {
            green_min: self.grading.green_min.unwrap_or(base.green_min),
            yellow_min: self.grading.yellow_min.unwrap_or(base.yellow_min),
        }
        .sanitized()
    }

    /// Grading options for one run against `set`.
    pub fn options_for(&self, set: &CriteriaSet) -> GradeOptions {
        GradeOptions {
            mode: Some(self.grading.mode.resolve(set)),
            bands: self.bands(),
        }
    }
}
