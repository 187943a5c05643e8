//! Handles settings for the application. Configuration is read from
//! `settings.toml` (optional) and from `DISBURSAL__*` environment variables,
//! e.g. `DISBURSAL__ENGINE__AMOUNT_COLUMN=value`.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_SETTINGS_PATH: &str = "settings";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub max_decimal_places: u32,
    pub amount_column: String,
    pub direct_payment_label: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        let engine = engine::Engine::default();
        Self {
            max_decimal_places: engine.max_decimal_places(),
            amount_column: engine.amount_column().to_string(),
            direct_payment_label: engine.direct_payment_label().to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub engine: EngineSettings,
}

impl Settings {
    /// Loads the settings. An explicit `path` must exist, the default one may
    /// be missing.
    pub fn new(path: Option<&str>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::with_name(path),
            None => File::with_name(DEFAULT_SETTINGS_PATH).required(false),
        };
        let settings = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix("DISBURSAL").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    pub fn engine(&self) -> engine::Engine {
        engine::Engine::builder()
            .max_decimal_places(self.engine.max_decimal_places)
            .amount_column(&self.engine.amount_column)
            .direct_payment_label(&self.engine.direct_payment_label)
            .build()
    }
}
