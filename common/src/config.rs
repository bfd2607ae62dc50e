use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("temperature thresholds must be finite (min {min}, max {max})")]
    NonFiniteThreshold { min: f32, max: f32 },
    #[error("temp_min ({min}) must be below temp_max ({max})")]
    InvertedHysteresis { min: f32, max: f32 },
    #[error("power rating must be a positive number of watts, got {0}")]
    InvalidPower(f32),
    #[error("device name must not be empty")]
    EmptyName,
    #[error("{0} must be at least 1 ms")]
    ZeroInterval(&'static str),
    #[error("tank volume must be a positive number of litres, got {0}")]
    InvalidTankVolume(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub min_on_ms: u64,
    /// `0` disables the limit.
    pub max_on_ms: u64,
    pub min_off_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            min_on_ms: 0,
            max_on_ms: 10_800_000,
            min_off_ms: 0,
        }
    }
}

impl TimingConfig {
    pub fn max_on_enabled(&self) -> bool {
        self.max_on_ms != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HysteresisConfig {
    pub temp_min: f32,
    pub temp_max: f32,
}

impl Default for HysteresisConfig {
    fn default() -> Self {
        Self {
            temp_min: 55.0,
            temp_max: 65.0,
        }
    }
}

impl HysteresisConfig {
    pub fn new(temp_min: f32, temp_max: f32) -> Result<Self, ConfigError> {
        let hysteresis = Self { temp_min, temp_max };
        hysteresis.validate()?;
        Ok(hysteresis)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.temp_min.is_finite() || !self.temp_max.is_finite() {
            return Err(ConfigError::NonFiniteThreshold {
                min: self.temp_min,
                max: self.temp_max,
            });
        }
        if self.temp_min >= self.temp_max {
            return Err(ConfigError::InvertedHysteresis {
                min: self.temp_min,
                max: self.temp_max,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatingRodConfig {
    pub name: String,
    pub power_w: f32,
    pub timing: TimingConfig,
    pub hysteresis: HysteresisConfig,
    pub log_enabled: bool,
}

impl Default for HeatingRodConfig {
    fn default() -> Self {
        Self {
            name: "heatingRod0".to_string(),
            power_w: 1_000.0,
            timing: TimingConfig::default(),
            hysteresis: HysteresisConfig::default(),
            log_enabled: false,
        }
    }
}

impl HeatingRodConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if !self.power_w.is_finite() || self.power_w <= 0.0 {
            return Err(ConfigError::InvalidPower(self.power_w));
        }
        self.hysteresis.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub heating_rod: HeatingRodConfig,
    pub poll_interval_ms: u64,
    pub available_power_w: f32,
    pub snapshot_interval_ms: u64,
    pub initial_temp: f32,
    pub ambient_temp: f32,
    pub tank_litres: f32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            heating_rod: HeatingRodConfig::default(),
            poll_interval_ms: 1_000,
            available_power_w: 1_200.0,
            snapshot_interval_ms: 10_000,
            initial_temp: 42.0,
            ambient_temp: 20.0,
            tank_litres: 5.0,
        }
    }
}

impl RuntimeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("poll_interval_ms"));
        }
        if self.snapshot_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("snapshot_interval_ms"));
        }
        if !self.tank_litres.is_finite() || self.tank_litres <= 0.0 {
            return Err(ConfigError::InvalidTankVolume(self.tank_litres));
        }
        self.heating_rod.validate()
    }
}
