//! Configuration loading.
//!
//! Two kinds of inputs:
//!
//! - The simulator-facing spec files (`action_config.json`,
//!   `observation_config.json`) are JSON, in the schema the simulator side
//!   already consumes. They define the ordered action/observation contracts.
//! - The bridge's own settings ([`BridgeConfig`]) are TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{ActionKind, ActuatorSpec, ObservationSpec};

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_min_value() -> f32 {
    -1.0
}
const fn default_max_value() -> f32 {
    1.0
}
const fn default_action_kind() -> ActionKind {
    ActionKind::Setpoint
}
const fn default_poll_timeout_ms() -> u64 {
    100
}
fn default_command_addr() -> String {
    "127.0.0.1:5555".into()
}
fn default_telemetry_addr() -> String {
    "127.0.0.1:5556".into()
}

// ---------------------------------------------------------------------------
// Action config (JSON)
// ---------------------------------------------------------------------------

/// One entry of `action_config.json`. Unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSpecEntry {
    /// Actuator name as the simulator knows it.
    pub actuator_name: String,
    #[serde(default = "default_action_kind")]
    pub action_type: ActionKind,
    #[serde(default = "default_min_value")]
    pub min_value: f32,
    #[serde(default = "default_max_value")]
    pub max_value: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ActionConfigBody {
    #[serde(default)]
    specs: Vec<ActionSpecEntry>,
}

/// Parsed `action_config.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionConfigFile {
    #[serde(default)]
    action_config: ActionConfigBody,
}

impl ActionConfigFile {
    /// Load and validate from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for entry in &self.action_config.specs {
            if entry.min_value > entry.max_value {
                return Err(ConfigError::InvalidBounds {
                    name: entry.actuator_name.clone(),
                    min: entry.min_value,
                    max: entry.max_value,
                });
            }
        }
        Ok(())
    }

    /// The ordered actuator contract, in file order.
    #[must_use]
    pub fn actuator_specs(&self) -> Vec<ActuatorSpec> {
        self.action_config
            .specs
            .iter()
            .map(|entry| {
                ActuatorSpec::new(entry.actuator_name.clone(), entry.action_type)
                    .with_bounds(entry.min_value, entry.max_value)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Observation config (JSON)
// ---------------------------------------------------------------------------

/// One entry of `observation_config.json`. Unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationSpecEntry {
    /// Name of the observation slot.
    pub output_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ObservationConfigBody {
    #[serde(default)]
    specs: Vec<ObservationSpecEntry>,
}

/// Parsed `observation_config.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservationConfigFile {
    #[serde(default)]
    observation_config: ObservationConfigBody,
}

impl ObservationConfigFile {
    /// Load from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// The ordered observation contract, in file order.
    #[must_use]
    pub fn observation_specs(&self) -> Vec<ObservationSpec> {
        self.observation_config
            .specs
            .iter()
            .map(|entry| ObservationSpec::new(entry.output_name.clone()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// BridgeConfig (TOML)
// ---------------------------------------------------------------------------

/// Bridge transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Address of the simulator's synchronous command channel.
    #[serde(default = "default_command_addr")]
    pub command_addr: String,

    /// Address of the simulator's telemetry publisher.
    #[serde(default = "default_telemetry_addr")]
    pub telemetry_addr: String,

    /// Bounded wait for one telemetry poll, in milliseconds (default: 100).
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,

    /// Echo each decoded telemetry frame as a log line.
    #[serde(default)]
    pub echo_frames: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            command_addr: default_command_addr(),
            telemetry_addr: default_telemetry_addr(),
            poll_timeout_ms: default_poll_timeout_ms(),
            echo_frames: false,
        }
    }
}

impl BridgeConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.command_addr.is_empty() {
            return Err(ConfigError::EmptyAddress("command_addr"));
        }
        if self.telemetry_addr.is_empty() {
            return Err(ConfigError::EmptyAddress("telemetry_addr"));
        }
        if self.poll_timeout_ms == 0 {
            return Err(ConfigError::InvalidPollTimeout(self.poll_timeout_ms));
        }
        Ok(())
    }

    /// Load from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Poll timeout as a [`std::time::Duration`].
    #[must_use]
    pub const fn poll_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.poll_timeout_ms)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
