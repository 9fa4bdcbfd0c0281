//! Command string construction.
//!
//! The simulator's command grammar, reproduced byte-exact:
//!
//! - Action: `CMD:<name>:<kind>:<value>;...;OBS:` — the trailing `OBS:`
//!   marker tells the simulator to append its observation to the response.
//! - Reset: `RESET:<JSON array of poses>;`
//! - Exit: the literal `EXIT`.

use tracing::warn;

use hydrolink_core::error::SpecError;
use hydrolink_core::types::{ActuatorSpec, ResetPose};

/// The shutdown command.
pub const EXIT_COMMAND: &str = "EXIT";

/// The no-op sentinel issued when inputs are invalid. The simulator applies
/// no actuator commands but still answers with an observation.
pub const EMPTY_COMMAND: &str = "CMD:;OBS:";

/// Encode an action vector against the ordered actuator contract.
///
/// Output order follows spec order exactly; the simulator-side decoder
/// relies on it. A length mismatch degrades to [`EMPTY_COMMAND`] with a
/// diagnostic rather than an error, so a control loop mid-episode keeps
/// running.
#[must_use]
pub fn encode(specs: &[ActuatorSpec], values: &[f32]) -> String {
    if specs.len() != values.len() {
        let err = SpecError::ActionLenMismatch {
            expected: specs.len(),
            got: values.len(),
        };
        warn!(%err, "sending no-op command");
        return EMPTY_COMMAND.to_owned();
    }

    let parts: Vec<String> = specs
        .iter()
        .zip(values)
        .map(|(spec, value)| format!("{}:{}:{}", spec.name, spec.kind, value))
        .collect();
    format!("CMD:{};OBS:", parts.join(";"))
}

/// Build a RESET command placing the named entities at the given poses.
#[must_use]
pub fn reset_command(poses: &[ResetPose]) -> String {
    match serde_json::to_string(poses) {
        Ok(json) => format!("RESET:{json};"),
        Err(e) => {
            // Plain structs cannot fail to serialize; degrade anyway.
            warn!(error = %e, "failed to serialize reset poses");
            "RESET:[];".to_owned()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
