pub mod clock;
pub mod config;
pub mod heating_rod;
pub mod sink;
pub mod types;

pub use clock::{Clock, SystemClock, VirtualClock};
pub use config::{ConfigError, HeatingRodConfig, HysteresisConfig, RuntimeConfig, TimingConfig};
pub use heating_rod::{HeatingRod, PowerSwitch, TemperatureSensor, HEATING_ROD_TYPE};
pub use sink::{PowerConsumer, PowerRange, PowerSink, PowerSinkSnapshot};
pub use types::{DecisionState, HeatingRodSnapshot};
