use std::{
    io::ErrorKind,
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use anyhow::Context;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use heating_rod_common::{Clock, HeatingRod, PowerConsumer, RuntimeConfig, SystemClock};

use crate::tank::SimulatedTank;

#[derive(Debug, Serialize)]
struct Dump {
    #[serde(rename = "capturedAt")]
    captured_at: String,
    device: serde_json::Value,
}

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let store = Store::from_env();
    let runtime = store.load_runtime_config().await.unwrap_or_else(|err| {
        warn!("failed to load runtime config from store: {err:#}");
        RuntimeConfig::default()
    });
    runtime.validate().context("runtime config rejected")?;

    let tank = Arc::new(Mutex::new(SimulatedTank::new(
        runtime.initial_temp,
        runtime.ambient_temp,
        runtime.heating_rod.power_w,
        runtime.tank_litres,
    )));

    let clock = SystemClock::new();
    let switch_tank = Arc::clone(&tank);
    let sensor_tank = Arc::clone(&tank);
    let mut rod = HeatingRod::from_config(
        &runtime.heating_rod,
        clock,
        move |on: bool| {
            let mut tank = lock(&switch_tank);
            if tank.is_heating() != on {
                debug!("relay -> {}", if on { "on" } else { "off" });
            }
            tank.set_heating(on);
        },
        move || lock(&sensor_tank).temperature(),
    )
    .context("failed to build heating rod")?;

    info!(
        "{} ready: {} W, band {}..{}, poll every {} ms",
        rod.name(),
        runtime.heating_rod.power_w,
        runtime.heating_rod.hysteresis.temp_min,
        runtime.heating_rod.hysteresis.temp_max,
        runtime.poll_interval_ms
    );

    let mut poll = tokio::time::interval(Duration::from_millis(runtime.poll_interval_ms));
    let mut report = tokio::time::interval(Duration::from_millis(runtime.snapshot_interval_ms));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut last_poll_ms = clock.now_ms();
    loop {
        tokio::select! {
            _ = poll.tick() => {
                let now_ms = clock.now_ms();
                lock(&tank).advance(now_ms.saturating_sub(last_poll_ms));
                last_poll_ms = now_ms;

                let granted = rod.allow_power(runtime.available_power_w);
                debug!(
                    "poll: granted={granted} on={} state={} using={} W",
                    rod.is_on(),
                    rod.state().as_str(),
                    rod.using_power()
                );
            }
            _ = report.tick() => {
                match rod.serialize() {
                    Ok(snapshot) => info!("snapshot: {snapshot}"),
                    Err(err) => warn!("snapshot serialization failed: {err}"),
                }
            }
            result = &mut shutdown => {
                result.context("failed to listen for ctrl-c")?;
                info!("shutting down");
                break;
            }
        }
    }

    store.save_dump(&rod).await
}

fn lock(tank: &Mutex<SimulatedTank>) -> MutexGuard<'_, SimulatedTank> {
    tank.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone)]
struct Store {
    config_path: PathBuf,
    dump_path: PathBuf,
}

impl Store {
    fn from_env() -> Self {
        let config_path = std::env::var("HEATING_ROD_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./heating-rod.json"));
        let dump_path = std::env::var("HEATING_ROD_DUMP")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./heating-rod-dump.json"));

        Self {
            config_path,
            dump_path,
        }
    }

    async fn load_runtime_config(&self) -> anyhow::Result<RuntimeConfig> {
        match tokio::fs::read(&self.config_path).await {
            Ok(raw) => serde_json::from_slice::<RuntimeConfig>(&raw)
                .with_context(|| format!("malformed config {}", self.config_path.display())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(RuntimeConfig::default()),
            Err(err) => Err(err.into()),
        }
    }

    async fn save_dump(&self, device: &impl PowerConsumer) -> anyhow::Result<()> {
        let dump = Dump {
            captured_at: Utc::now().to_rfc3339(),
            device: device.serialize()?,
        };
        if let Some(parent) = self.dump_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let payload = serde_json::to_vec_pretty(&dump)?;
        tokio::fs::write(&self.dump_path, payload)
            .await
            .with_context(|| format!("failed to write dump {}", self.dump_path.display()))?;
        info!("wrote {}", self.dump_path.display());
        Ok(())
    }
}
