//! Protocol layer between an RL agent and a physics simulator.
//!
//! The simulator speaks two channels, both plain TCP with 4-byte LE
//! length-prefixed parts:
//!
//! - A synchronous command channel: one text request, one text response, in
//!   strict lock-step. Requests are delimited actuator-command strings
//!   (`CMD:...;OBS:`), responses are JSON observations.
//! - An asynchronous telemetry channel: fire-and-forget frames of three
//!   consecutive binary parts (id, title, payload) whose payload type is
//!   inferred from byte length and content, never declared.
//!
//! Modules:
//!
//! - [`framing`] — length-prefixed wire parts
//! - [`sniff`] — payload classification by length precedence
//! - [`frame`] — 3-part frame decoding into [`TelemetryFrame`]
//! - [`receiver`] — [`TelemetryReceiver`] with polling and streaming modes
//! - [`command`] — actuator command, RESET and EXIT string builders
//! - [`observation`] — JSON observation decoding (vector and structured)
//! - [`bridge`] — [`SimulatorBridge`] composing the above into one round trip
//!
//! The layer favors availability over strictness: corrupt or unexpected
//! messages degrade to well-defined fallback values with a diagnostic
//! instead of aborting the caller's control loop.

pub mod bridge;
pub mod command;
pub mod frame;
pub mod framing;
pub mod observation;
pub mod receiver;
pub mod sniff;

pub use hydrolink_core::types::{
    ActionKind, ActuatorSpec, FrameValue, ObservationSpec, ResetPose, StateValue, TelemetryFrame,
    TypeTag,
};

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use bridge::{BridgeError, SimulatorBridge};
pub use command::{encode, reset_command, EMPTY_COMMAND, EXIT_COMMAND};
pub use frame::FrameDecoder;
pub use observation::{decode_structured, decode_vector};
pub use receiver::{StopHandle, TelemetryReceiver};
pub use sniff::classify;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        classify, decode_structured, decode_vector, encode, reset_command, ActionKind,
        ActuatorSpec, BridgeError, FrameDecoder, FrameValue, ObservationSpec, ResetPose,
        SimulatorBridge, StateValue, StopHandle, TelemetryFrame, TelemetryReceiver, TypeTag,
        EMPTY_COMMAND, EXIT_COMMAND,
    };
}
