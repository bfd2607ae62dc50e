// J/(kg·K)
const WATER_HEAT_CAPACITY: f32 = 4_186.0;
const LOSS_PER_SECOND: f32 = 0.000_5;

#[derive(Debug, Clone)]
pub struct SimulatedTank {
    temperature: f32,
    ambient: f32,
    heater_power_w: f32,
    litres: f32,
    heating: bool,
}

impl SimulatedTank {
    pub fn new(temperature: f32, ambient: f32, heater_power_w: f32, litres: f32) -> Self {
        Self {
            temperature,
            ambient,
            heater_power_w,
            litres,
            heating: false,
        }
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn is_heating(&self) -> bool {
        self.heating
    }

    pub fn set_heating(&mut self, heating: bool) {
        self.heating = heating;
    }

    pub fn advance(&mut self, elapsed_ms: u64) {
        let seconds = elapsed_ms as f32 / 1_000.0;
        if self.heating {
            // 1 litre of water weighs 1 kg
            let joules = self.heater_power_w * seconds;
            self.temperature += joules / (self.litres * WATER_HEAT_CAPACITY);
        }
        let loss = (self.temperature - self.ambient) * (LOSS_PER_SECOND * seconds).min(1.0);
        self.temperature -= loss;
    }
}
