//! Runtime configuration.
//!
//! Configuration is read from a TOML file. Every field is optional and falls back to the value
//! shown here:
//!
//! ```toml
//! [detection]
//! min_pose_confidence = 0.1
//!
//! [scoring]
//! # reference = "reference.json"
//! metric = "cosine"
//! smoothing = "none"
//! ema_alpha = 0.5
//! moving_average_len = 5
//!
//! [output]
//! log_distances = true
//! ```

use std::{fs, path::Path, path::PathBuf};

use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};

use crate::filter::{Filter, Smoothing};
use crate::reference::ReferenceVector;
use crate::similarity::Metric;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub detection: DetectionConfig,
    pub scoring: ScoringConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Matches of poses with a lower overall score are flagged as not confident.
    ///
    /// Such poses are still scored.
    pub min_pose_confidence: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_pose_confidence: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// JSON file with the reference vector. Uses the built-in reference if unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<PathBuf>,
    /// The metric used for the smoothed score.
    pub metric: Metric,
    pub smoothing: Smoothing,
    pub ema_alpha: f32,
    pub moving_average_len: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            reference: None,
            metric: Metric::Cosine,
            smoothing: Smoothing::None,
            ema_alpha: 0.5,
            moving_average_len: 5,
        }
    }
}

impl ScoringConfig {
    /// Loads the configured reference vector, or returns the built-in one.
    pub fn load_reference(&self) -> anyhow::Result<ReferenceVector> {
        match &self.reference {
            Some(path) => ReferenceVector::load(path),
            None => Ok(ReferenceVector::builtin().clone()),
        }
    }

    /// Creates the configured score filter.
    pub fn score_filter(&self) -> Box<dyn Filter<f32> + Send> {
        self.smoothing.build(self.ema_alpha, self.moving_average_len)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Logs both distances of every frame at *debug* level.
    pub log_distances: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            log_distances: true,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Parses and validates a TOML configuration.
    pub fn parse(toml: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(toml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            (0.0..=1.0).contains(&self.detection.min_pose_confidence),
            "`detection.min_pose_confidence` must be between 0.0 and 1.0, got {}",
            self.detection.min_pose_confidence
        );

        let scoring = &self.scoring;
        ensure!(
            (0.0..=1.0).contains(&scoring.ema_alpha),
            "`scoring.ema_alpha` must be between 0.0 and 1.0, got {}",
            scoring.ema_alpha
        );
        ensure!(
            scoring.moving_average_len > 0,
            "`scoring.moving_average_len` must be at least 1"
        );
        Ok(())
    }
}
