//! # Snake Model Configuration
//!
//! Body geometry, initial gait, control-loop timing and an optional command
//! schedule, all loaded from one TOML file. Every section has defaults.
//!
//! ## Example: TOML Configuration
//!
//! ```toml
//! [snake]
//! segment_count = 12
//! body_length = 1500.0
//! target_speed = 50.0
//! propagation = "single_step"
//!
//! [gait]
//! a = 1.0471975511965976
//! b = 1.5707963267948966
//! c = 0.0
//!
//! [control]
//! rate_hz = 50.0
//! duration = 5.0
//!
//! [[schedule]]
//! at = 1.0
//! gait = { a = 0.5, b = 1.57, c = 0.0 }
//!
//! [[schedule]]
//! at = 2.0
//! target_speed = 80.0
//! ```

// src/config.rs - Single configuration file
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::motion::{GaitParameters, PropagationPolicy};
use crate::scheduler::ScheduledCommand;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration struct for the snake body, gait, control loop and schedule.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub snake: SnakeConfig,
    #[serde(default)]
    pub gait: GaitParameters,
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub schedule: Vec<ScheduledCommand>,
}

/// Body geometry and travel.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SnakeConfig {
    #[serde(default = "default_segment_count")]
    pub segment_count: usize,
    #[serde(default = "default_body_length")]
    pub body_length: f64,
    #[serde(default = "default_target_speed")]
    pub target_speed: f64,
    #[serde(default)]
    pub propagation: PropagationPolicy,
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self {
            segment_count: default_segment_count(),
            body_length: default_body_length(),
            target_speed: default_target_speed(),
            propagation: PropagationPolicy::default(),
        }
    }
}

/// Control-loop timing for the binaries.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControlConfig {
    #[serde(default = "default_rate_hz")]
    pub rate_hz: f64,
    #[serde(default = "default_duration")]
    pub duration: f64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            rate_hz: default_rate_hz(),
            duration: default_duration(),
        }
    }
}

/// Longest control period the loop accepts (seconds).
pub const MAX_PERIOD: f64 = 3600.0;
/// Upper bound on ticks in one configured run.
pub const MAX_TICKS: f64 = 1.0e9;

impl ControlConfig {
    pub fn period(&self) -> f64 {
        1.0 / self.rate_hz
    }

    pub fn period_duration(&self) -> Result<Duration, ConfigError> {
        Duration::try_from_secs_f64(self.period())
            .map_err(|e| ConfigError::Invalid(format!("control period {}s: {}", self.period(), e)))
    }

    /// Ticks needed to cover `duration` at `rate_hz`, including the tick at t=0.
    pub fn tick_count(&self) -> Result<usize, ConfigError> {
        let ticks = (self.duration * self.rate_hz).ceil() + 1.0;
        if !(ticks.is_finite() && ticks <= MAX_TICKS) {
            return Err(ConfigError::Invalid(format!(
                "control.duration * control.rate_hz must be <= {}, got {}",
                MAX_TICKS,
                self.duration * self.rate_hz
            )));
        }
        Ok(ticks as usize)
    }
}

impl Config {
    /// Validate ranges the model and control loop rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.snake.segment_count < 2 {
            return Err(ConfigError::Invalid(format!(
                "snake.segment_count must be >= 2, got {}",
                self.snake.segment_count
            )));
        }
        if !(self.snake.body_length.is_finite() && self.snake.body_length > 0.0) {
            return Err(ConfigError::Invalid("snake.body_length must be > 0".to_string()));
        }
        if !self.snake.target_speed.is_finite() {
            return Err(ConfigError::Invalid("snake.target_speed must be finite".to_string()));
        }
        if !self.gait.is_finite() {
            return Err(ConfigError::Invalid("gait parameters must be finite".to_string()));
        }
        if !(self.control.rate_hz.is_finite() && self.control.rate_hz > 0.0) {
            return Err(ConfigError::Invalid("control.rate_hz must be > 0".to_string()));
        }
        if self.control.period() > MAX_PERIOD {
            return Err(ConfigError::Invalid(format!(
                "control.rate_hz must give a period <= {}s",
                MAX_PERIOD
            )));
        }
        if !(self.control.duration.is_finite() && self.control.duration >= 0.0) {
            return Err(ConfigError::Invalid("control.duration must be >= 0".to_string()));
        }
        self.control.tick_count()?;
        for (i, command) in self.schedule.iter().enumerate() {
            if !(command.at.is_finite() && command.at >= 0.0) {
                return Err(ConfigError::Invalid(format!("schedule[{}].at must be >= 0", i)));
            }
            if command.gait.is_some_and(|g| !g.is_finite())
                || command.target_speed.is_some_and(|v| !v.is_finite())
            {
                return Err(ConfigError::Invalid(format!("schedule[{}] has non-finite values", i)));
            }
        }
        Ok(())
    }

    /// Override a single value by dotted key, e.g. `gait.a=0.5`.
    pub fn set_param(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |e: &dyn std::fmt::Display| {
            ConfigError::Invalid(format!("bad value '{}' for {}: {}", value, key, e))
        };
        let float = || value.parse::<f64>().map_err(|e| invalid(&e));
        match key {
            "snake.segment_count" => {
                self.snake.segment_count = value.parse::<usize>().map_err(|e| invalid(&e))?
            }
            "snake.body_length" => self.snake.body_length = float()?,
            "snake.target_speed" => self.snake.target_speed = float()?,
            "snake.propagation" => {
                self.snake.propagation = match value {
                    "single_step" => PropagationPolicy::SingleStep,
                    "drain" => PropagationPolicy::Drain,
                    other => return Err(invalid(&format!("unknown policy '{}'", other))),
                }
            }
            "gait.a" => self.gait.a = float()?,
            "gait.b" => self.gait.b = float()?,
            "gait.c" => self.gait.c = float()?,
            "control.rate_hz" => self.control.rate_hz = float()?,
            "control.duration" => self.control.duration = float()?,
            _ => return Err(ConfigError::Invalid(format!("unknown parameter '{}'", key))),
        }
        Ok(())
    }
}

// Default value functions
fn default_segment_count() -> usize { 12 }
fn default_body_length() -> f64 { 1500.0 }
fn default_target_speed() -> f64 { 50.0 }
fn default_rate_hz() -> f64 { 50.0 }
fn default_duration() -> f64 { 5.0 }

/// Load configuration from a TOML file at the given path.
pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    let config: Config = match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Failed to parse config TOML: {}", e);
                return Err(ConfigError::Toml(e));
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file '{}': {}", path, e);
            return Err(ConfigError::Io(e));
        }
    };
    config.validate()?;
    Ok(config)
}
