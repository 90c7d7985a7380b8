//! Handles settings for the application. Configuration is read from
//! `settings.toml` in the working directory, then from `RENTBOOK__*`
//! environment variables (`RENTBOOK__APP__LEVEL=debug`).
//!
//! See `settings.toml` for an example.
use std::time::Duration as StdDuration;

use chrono::Duration;
use config::{Config, ConfigError, Environment, File};
use engine::{EngineSettings, MoneyCents, Percent};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

/// Business knobs. Anything left out keeps the engine default.
#[derive(Debug, Default, Deserialize)]
pub struct Engine {
    pub work_hours_start: Option<u32>,
    pub work_hours_end: Option<u32>,
    pub timezone: Option<chrono_tz::Tz>,
    /// Percent, e.g. `"10"` or `"12.5"`.
    pub platform_commission: Option<String>,
    pub staff_commission: Option<String>,
    /// `0` disables the online payment deadline.
    pub payment_timeout_minutes: Option<i64>,
    /// Major units, e.g. `"500"`.
    pub min_withdrawal: Option<String>,
    pub withdrawal_cooldown_hours: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct Reconciler {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

fn default_interval_secs() -> u64 {
    60
}

impl Reconciler {
    pub fn interval(&self) -> StdDuration {
        StdDuration::from_secs(self.interval_secs.max(1))
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub database: Database,
    #[serde(default)]
    pub engine: Engine,
    #[serde(default)]
    pub reconciler: Reconciler,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("RENTBOOK").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}

impl Engine {
    pub fn to_engine_settings(&self) -> Result<EngineSettings, ConfigError> {
        let mut settings = EngineSettings::default();
        if let Some(hour) = self.work_hours_start {
            settings.work_hours_start = hour;
        }
        if let Some(hour) = self.work_hours_end {
            settings.work_hours_end = hour;
        }
        if let Some(tz) = self.timezone {
            settings.timezone = tz;
        }
        if let Some(value) = &self.platform_commission {
            settings.platform_commission = parse_percent("engine.platform_commission", value)?;
        }
        if let Some(value) = &self.staff_commission {
            settings.staff_commission = parse_percent("engine.staff_commission", value)?;
        }
        if let Some(minutes) = self.payment_timeout_minutes {
            settings.payment_timeout = (minutes > 0).then(|| Duration::minutes(minutes));
        }
        if let Some(value) = &self.min_withdrawal {
            settings.min_withdrawal = value.parse::<MoneyCents>().map_err(|err| {
                ConfigError::Message(format!("engine.min_withdrawal: {err}"))
            })?;
        }
        if let Some(hours) = self.withdrawal_cooldown_hours {
            settings.withdrawal_cooldown = Duration::hours(hours);
        }
        Ok(settings)
    }
}

fn parse_percent(key: &str, value: &str) -> Result<Percent, ConfigError> {
    value
        .parse::<Percent>()
        .map_err(|err| ConfigError::Message(format!("{key}: {err}")))
}
