use std::fmt;

use tracing::{debug, info, warn};

use crate::{
    clock::Clock,
    config::{ConfigError, HeatingRodConfig, HysteresisConfig, TimingConfig},
    sink::{PowerConsumer, PowerRange, PowerSink},
    types::{DecisionState, HeatingRodSnapshot},
};

pub const HEATING_ROD_TYPE: &str = "HeatingRod";

pub trait PowerSwitch {
    fn switch_power(&mut self, on: bool);
}

impl<F: FnMut(bool)> PowerSwitch for F {
    fn switch_power(&mut self, on: bool) {
        self(on)
    }
}

pub trait TemperatureSensor {
    fn read_temperature(&mut self) -> f32;
}

impl<F: FnMut() -> f32> TemperatureSensor for F {
    fn read_temperature(&mut self) -> f32 {
        self()
    }
}

pub struct HeatingRod {
    sink: PowerSink,
    timing: TimingConfig,
    hysteresis: HysteresisConfig,
    state: DecisionState,
    on: bool,

    time_turn_on: Option<u64>,
    time_turn_off: Option<u64>,
    // Completed intervals only. The active one is computed from the clock.
    on_duration: Option<u64>,
    off_duration: Option<u64>,

    first_decision_pending: bool,
    last_read_temperature: Option<f32>,
    log_enabled: bool,

    clock: Box<dyn Clock + Send>,
    switch: Option<Box<dyn PowerSwitch + Send>>,
    sensor: Option<Box<dyn TemperatureSensor + Send>>,
}

impl HeatingRod {
    pub fn new(
        name: impl Into<String>,
        power_w: f32,
        clock: impl Clock + Send + 'static,
    ) -> Self {
        let mut sink = PowerSink::new(name);
        sink.set_requesting_power(power_w, power_w);
        Self {
            sink,
            timing: TimingConfig::default(),
            hysteresis: HysteresisConfig::default(),
            state: DecisionState::Ready,
            on: false,
            time_turn_on: None,
            time_turn_off: None,
            on_duration: None,
            off_duration: None,
            first_decision_pending: true,
            last_read_temperature: None,
            log_enabled: false,
            clock: Box::new(clock),
            switch: None,
            sensor: None,
        }
    }

    pub fn from_config(
        config: &HeatingRodConfig,
        clock: impl Clock + Send + 'static,
        switch: impl PowerSwitch + Send + 'static,
        sensor: impl TemperatureSensor + Send + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rod = Self::new(config.name.clone(), config.power_w, clock);
        rod.timing = config.timing;
        rod.hysteresis = config.hysteresis;
        rod.log_enabled = config.log_enabled;
        rod.set_switch_power(switch);
        rod.set_read_temperature(sensor);
        Ok(rod)
    }

    pub fn name(&self) -> &str {
        self.sink.name()
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn state(&self) -> DecisionState {
        self.state
    }

    pub fn requested_power(&self) -> PowerRange {
        self.sink.requesting_power()
    }

    pub fn last_read_temperature(&self) -> Option<f32> {
        self.last_read_temperature
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    pub fn timing_mut(&mut self) -> &mut TimingConfig {
        &mut self.timing
    }

    pub fn set_timing(&mut self, timing: TimingConfig) {
        self.timing = timing;
    }

    pub fn hysteresis(&self) -> &HysteresisConfig {
        &self.hysteresis
    }

    pub fn set_hysteresis(&mut self, hysteresis: HysteresisConfig) -> Result<(), ConfigError> {
        hysteresis.validate()?;
        self.hysteresis = hysteresis;
        Ok(())
    }

    pub fn set_switch_power(&mut self, switch: impl PowerSwitch + Send + 'static) {
        self.switch = Some(Box::new(switch));
    }

    pub fn clear_switch_power(&mut self) {
        self.switch = None;
    }

    pub fn set_read_temperature(&mut self, sensor: impl TemperatureSensor + Send + 'static) {
        self.sensor = Some(Box::new(sensor));
    }

    pub fn is_ready(&self) -> bool {
        self.switch.is_some() && self.sensor.is_some()
    }

    pub fn enable_log(&mut self) {
        self.log_enabled = true;
    }

    pub fn disable_log(&mut self) {
        self.log_enabled = false;
    }

    pub fn is_log_enabled(&self) -> bool {
        self.log_enabled
    }

    pub fn using_power(&self) -> f32 {
        self.sink.allowed_power()
    }

    /// Returns `true` when power was taken this cycle, or, for an
    /// insufficient budget, when the rod is now off as requested.
    pub fn allow_power(&mut self, power: f32) -> bool {
        if self.switch.is_none() {
            if self.log_enabled {
                warn!("{}: no power switch attached, ignoring poll", self.name());
            }
            return false;
        }
        if self.sensor.is_none() {
            if self.log_enabled {
                warn!(
                    "{}: no temperature sensor attached, ignoring poll",
                    self.name()
                );
            }
            return false;
        }

        if self.check_max_on() {
            if self.log_enabled {
                info!(
                    "{}: on longer than {} ms, forcing off",
                    self.name(),
                    self.timing.max_on_ms
                );
            }
            self.turn_off();
            return false;
        }

        if power.is_nan() || power < self.sink.requesting_power().min {
            return self.turn_off();
        }

        let Some(sensor) = self.sensor.as_mut() else {
            return false;
        };
        let temperature = sensor.read_temperature();
        self.last_read_temperature = Some(temperature);

        if !temperature.is_finite() {
            if self.log_enabled {
                warn!("{}: unusable reading {temperature}, switching off", self.name());
            }
            self.turn_off();
            false
        } else if temperature >= self.hysteresis.temp_max {
            self.turn_off();
            false
        } else if temperature < self.hysteresis.temp_min {
            self.turn_on()
        } else if self.first_decision_pending {
            self.first_decision_pending = false;
            self.turn_on()
        } else {
            // inside the dead band: keep the current output, grant nothing new
            false
        }
    }

    // live while on, last completed interval while off
    pub fn on_time(&self) -> Option<u64> {
        let turned_on = self.time_turn_on?;
        if self.on {
            Some(self.clock.now_ms().saturating_sub(turned_on))
        } else {
            self.on_duration
        }
    }

    pub fn off_time(&self) -> Option<u64> {
        let turned_off = self.time_turn_off?;
        if self.on {
            self.off_duration
        } else {
            Some(self.clock.now_ms().saturating_sub(turned_off))
        }
    }

    pub fn snapshot(&self) -> HeatingRodSnapshot {
        HeatingRodSnapshot {
            sink: self.sink.snapshot(),
            device_type: HEATING_ROD_TYPE,
            on: self.on,
            on_time_ms: self.on_time(),
            off_time_ms: self.off_time(),
            min_on_ms: self.timing.min_on_ms,
            max_on_ms: self.timing.max_on_ms,
            min_off_ms: self.timing.min_off_ms,
            temperature: self.last_read_temperature,
            temp_min: self.hysteresis.temp_min,
            temp_max: self.hysteresis.temp_max,
            state: self.state,
        }
    }

    fn turn_on(&mut self) -> bool {
        let now = self.clock.now_ms();
        let eligible = self
            .time_turn_off
            .map(|turned_off| now >= turned_off.saturating_add(self.timing.min_off_ms))
            .unwrap_or(true);

        if !eligible {
            if self.log_enabled && self.state != DecisionState::CoolDown {
                debug!("{}: switch on blocked by min off time", self.name());
            }
            self.state = DecisionState::CoolDown;
            return false;
        }

        if !self.on {
            self.off_duration = self
                .time_turn_off
                .map(|turned_off| now.saturating_sub(turned_off));
            self.time_turn_on = Some(now);
            let power = self.sink.requesting_power().min;
            self.sink.set_allowed_power(power);
            if let Some(switch) = self.switch.as_mut() {
                switch.switch_power(true);
            }
            self.on = true;
            if self.log_enabled {
                info!("{}: switched on at {now} ms, drawing {power} W", self.name());
            }
        }

        self.state = DecisionState::Ready;
        true
    }

    fn turn_off(&mut self) -> bool {
        let now = self.clock.now_ms();
        let eligible = self
            .time_turn_on
            .map(|turned_on| now >= turned_on.saturating_add(self.timing.min_on_ms))
            .unwrap_or(true);

        if !eligible {
            if self.log_enabled && self.state != DecisionState::MinTimeOn {
                debug!("{}: switch off blocked by min on time", self.name());
            }
            self.state = DecisionState::MinTimeOn;
            return false;
        }

        if self.on {
            self.on_duration = self
                .time_turn_on
                .map(|turned_on| now.saturating_sub(turned_on));
            self.time_turn_off = Some(now);
            self.sink.set_allowed_power(0.0);
            if let Some(switch) = self.switch.as_mut() {
                switch.switch_power(false);
            }
            self.on = false;
            if self.log_enabled {
                info!("{}: switched off at {now} ms", self.name());
            }
        }

        self.state = DecisionState::Ready;
        true
    }

    fn check_max_on(&self) -> bool {
        if !self.on || !self.timing.max_on_enabled() {
            return false;
        }
        let Some(turned_on) = self.time_turn_on else {
            return false;
        };
        self.clock.now_ms().saturating_sub(turned_on) > self.timing.max_on_ms
    }
}

impl PowerConsumer for HeatingRod {
    fn name(&self) -> &str {
        HeatingRod::name(self)
    }

    fn using_power(&self) -> f32 {
        HeatingRod::using_power(self)
    }

    fn allow_power(&mut self, power: f32) -> bool {
        HeatingRod::allow_power(self, power)
    }

    fn serialize(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self.snapshot())
    }
}

impl fmt::Debug for HeatingRod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeatingRod")
            .field("sink", &self.sink)
            .field("timing", &self.timing)
            .field("hysteresis", &self.hysteresis)
            .field("state", &self.state)
            .field("on", &self.on)
            .field("time_turn_on", &self.time_turn_on)
            .field("time_turn_off", &self.time_turn_off)
            .field("ready", &self.is_ready())
            .finish_non_exhaustive()
    }
}
