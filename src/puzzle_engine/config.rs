//! Engine tuning parameters.
//!
//! Threshold values are calibration constants, not truths: every field has a
//! default and can be overridden from host-supplied JSON.
//!
//! ```rust
//! use sequence_puzzle_gen::EngineConfig;
//!
//! let config = EngineConfig {
//!     anti_repeat_limit: 2,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::puzzle_engine::error::{EngineError, Result};

/// Upper bound on `max_generation_retries` accepted by [`EngineConfig::validate`].
pub const MAX_GENERATION_RETRIES: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Number of recent outcomes kept per family.
    pub rolling_window_size: usize,
    /// Rolling accuracy at or above which the tier goes up.
    pub promote_threshold: f32,
    /// Rolling accuracy at or below which the tier goes down.
    pub demote_threshold: f32,
    /// Most consecutive puzzles allowed from one family.
    pub anti_repeat_limit: u32,
    pub min_distractor_distance: f32,
    pub max_distractor_distance: f32,
    /// Regeneration attempts after the first candidate fails screening.
    pub max_generation_retries: u32,
    /// Window samples needed at the current tier before it may move.
    pub min_samples_for_adjustment: usize,
    /// Total correct answers per player level.
    pub correct_per_level: u32,
    pub max_hint_level: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rolling_window_size: 10,
            promote_threshold: 0.8,
            demote_threshold: 0.5,
            anti_repeat_limit: 3,
            min_distractor_distance: 1.0,
            max_distractor_distance: 3.0,
            max_generation_retries: 5,
            min_samples_for_adjustment: 3,
            correct_per_level: 10,
            max_hint_level: 4,
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON object and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)
            .map_err(|e| EngineError::config(format!("unreadable config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rolling_window_size == 0 {
            return Err(EngineError::config("rollingWindowSize must be at least 1"));
        }
        for (name, v) in [
            ("promoteThreshold", self.promote_threshold),
            ("demoteThreshold", self.demote_threshold),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(EngineError::config(format!("{name} must be within [0, 1], got {v}")));
            }
        }
        if self.demote_threshold >= self.promote_threshold {
            return Err(EngineError::config("demoteThreshold must be below promoteThreshold"));
        }
        if self.anti_repeat_limit == 0 {
            return Err(EngineError::config("antiRepeatLimit must be at least 1"));
        }
        if self.min_distractor_distance < 0.0
            || self.min_distractor_distance > self.max_distractor_distance
        {
            return Err(EngineError::config(
                "distractor distance range must satisfy 0 <= min <= max",
            ));
        }
        if self.min_samples_for_adjustment > self.rolling_window_size {
            return Err(EngineError::config(
                "minSamplesForAdjustment cannot exceed rollingWindowSize",
            ));
        }
        if self.correct_per_level == 0 {
            return Err(EngineError::config("correctPerLevel must be at least 1"));
        }
        if self.max_generation_retries > MAX_GENERATION_RETRIES {
            return Err(EngineError::config(format!(
                "maxGenerationRetries must be at most {MAX_GENERATION_RETRIES}"
            )));
        }
        if self.max_hint_level < 1 {
            return Err(EngineError::config("maxHintLevel must be at least 1"));
        }
        Ok(())
    }
}
