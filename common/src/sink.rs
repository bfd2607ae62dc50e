use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PowerRange {
    pub min: f32,
    pub max: f32,
}

impl PowerRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn fixed(power: f32) -> Self {
        Self::new(power, power)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PowerSink {
    name: String,
    requesting: PowerRange,
    allowed: f32,
}

impl PowerSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requesting: PowerRange::default(),
            allowed: 0.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn requesting_power(&self) -> PowerRange {
        self.requesting
    }

    pub fn set_requesting_power(&mut self, min: f32, max: f32) {
        self.requesting = PowerRange::new(min, max);
    }

    pub fn allowed_power(&self) -> f32 {
        self.allowed
    }

    pub fn set_allowed_power(&mut self, power: f32) {
        self.allowed = power;
    }

    pub fn snapshot(&self) -> PowerSinkSnapshot {
        PowerSinkSnapshot {
            name: self.name.clone(),
            requested_power: self.requesting,
            allowed_power: self.allowed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerSinkSnapshot {
    pub name: String,
    #[serde(rename = "requestedPower")]
    pub requested_power: PowerRange,
    #[serde(rename = "allowedPower")]
    pub allowed_power: f32,
}

pub trait PowerConsumer {
    fn name(&self) -> &str;

    fn using_power(&self) -> f32;

    fn allow_power(&mut self, power: f32) -> bool;

    fn serialize(&self) -> serde_json::Result<serde_json::Value>;
}
