use serde::{Deserialize, Serialize};

use crate::sink::PowerSinkSnapshot;

// Report only, never used to gate a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionState {
    #[default]
    Ready,
    CoolDown,
    MinTimeOn,
}

impl DecisionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::CoolDown => "cool_down",
            Self::MinTimeOn => "min_time_on",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HeatingRodSnapshot {
    #[serde(flatten)]
    pub sink: PowerSinkSnapshot,
    #[serde(rename = "type")]
    pub device_type: &'static str,
    pub on: bool,
    #[serde(rename = "onTimeMs")]
    pub on_time_ms: Option<u64>,
    #[serde(rename = "offTimeMs")]
    pub off_time_ms: Option<u64>,
    #[serde(rename = "minOnMs")]
    pub min_on_ms: u64,
    #[serde(rename = "maxOnMs")]
    pub max_on_ms: u64,
    #[serde(rename = "minOffMs")]
    pub min_off_ms: u64,
    pub temperature: Option<f32>,
    #[serde(rename = "tempMin")]
    pub temp_min: f32,
    #[serde(rename = "tempMax")]
    pub temp_max: f32,
    pub state: DecisionState,
}
