use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::controller::ControlsSettings;
use crate::property::{
    Properties, PropertyError, PropertyValue, ResourceEntry, ResourceResolver, Schema, Sealed,
    TypeRegistry,
};

const CONFIG_DIR: &str = ".config/tracked-props";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Property error: {0}")]
    Property(#[from] PropertyError),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Controls given either as attribute text or as a table.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum ControlsInput {
    Attribute(String),
    Table(toml::Table),
}

impl Default for ControlsInput {
    fn default() -> Self {
        Self::Attribute(String::new())
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub tick_interval_ms: u64,
    pub joystick_deadzone: f32,
    pub controls: ControlsInput,
    pub resources: Vec<ResourceEntry>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 16,
            joystick_deadzone: 0.05,
            controls: ControlsInput::default(),
            resources: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the tick loop and the gamepad adapter cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "tick_interval_ms",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(0.0..1.0).contains(&self.joystick_deadzone) {
            return Err(ConfigError::InvalidValue {
                field: "joystick_deadzone",
                reason: format!("{} is outside [0, 1)", self.joystick_deadzone),
            });
        }
        Ok(())
    }

    pub fn path() -> PathBuf {
        let mut path = get_home_dir();
        path.push(CONFIG_DIR);
        path.push(CONFIG_FILE);
        path
    }

    /// Loads the config from the user's config directory, falling back to
    /// defaults when the file does not exist.
    pub async fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::path()).await
    }

    pub async fn load_from(path: PathBuf) -> Result<Self, ConfigError> {
        let exists = tokio::fs::try_exists(&path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
        if !exists {
            warn!("Config file {} does not exist, using default", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded config from {}", path.display());
        debug!("Config: {:?}", config);
        Ok(config)
    }

    /// Parses the configured controls through `schema`.
    pub fn controls_properties(
        &self,
        schema: &mut Schema<'_>,
        resolver: &dyn ResourceResolver,
    ) -> Properties {
        match &self.controls {
            ControlsInput::Attribute(text) => schema.parse_attribute(resolver, text),
            ControlsInput::Table(table) => schema.parse_values(
                resolver,
                table
                    .iter()
                    .map(|(name, value)| (name.as_str(), PropertyValue::from(value))),
            ),
        }
    }

    /// Builds the controls schema and reads the configured settings from it.
    pub fn controls_settings(
        &self,
        registry: &TypeRegistry<Sealed>,
        resolver: &dyn ResourceResolver,
    ) -> Result<ControlsSettings, ConfigError> {
        let mut schema = Schema::new(registry, ControlsSettings::schema())?;
        let properties = self.controls_properties(&mut schema, resolver);
        info!("Tracked controls: {}", schema.stringify(&properties));
        Ok(ControlsSettings::from_properties(&properties))
    }
}

fn get_home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| {
        warn!("Could not determine home directory, using current directory");
        PathBuf::from(".")
    })
}
