use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid poll_timeout_ms: {0} (must be > 0)")]
    InvalidPollTimeout(u64),

    #[error("Empty address for {0}")]
    EmptyAddress(&'static str),

    #[error("Invalid bounds for actuator '{name}': min {min} > max {max}")]
    InvalidBounds { name: String, min: f32, max: f32 },
}

/// Contract mismatch errors raised on the stepping path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("Action vector length mismatch: expected {expected}, got {got}")]
    ActionLenMismatch { expected: usize, got: usize },

    #[error("Observation vector length mismatch: expected {expected}, got {got}")]
    ObservationLenMismatch { expected: usize, got: usize },
}
