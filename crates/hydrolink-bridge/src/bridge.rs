//! Synchronous simulator session.
//!
//! [`SimulatorBridge`] owns the command connection and drives the strict
//! request/response lock-step: every command sent is answered by exactly one
//! observation before the next command may go out. An optional
//! [`TelemetryReceiver`] serves as the fallback observation source when a
//! response fails to decode, so a control loop keeps stepping through
//! transient simulator hiccups.
//!
//! Shutdown is explicit: [`close`](SimulatorBridge::close) sends `EXIT`,
//! logs the simulator's acknowledgement, and releases the connection. After
//! that, every round trip fails with [`BridgeError::Closed`].

use std::net::TcpStream;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use hydrolink_core::types::{ActuatorSpec, FrameValue, ObservationSpec, ResetPose, StateValue};

use crate::command::{encode, reset_command, EXIT_COMMAND};
use crate::framing::{read_text, write_text};
use crate::observation::{decode_structured, decode_vector};
use crate::receiver::TelemetryReceiver;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Session-fatal bridge failures.
///
/// Decode problems are deliberately absent: they degrade to fallback values
/// inside the stepping methods. Only the transport itself can fail a call.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),

    /// The session was closed with `EXIT`; no further commands may be sent.
    #[error("bridge is closed")]
    Closed,
}

// ---------------------------------------------------------------------------
// SimulatorBridge
// ---------------------------------------------------------------------------

/// One synchronous session against a running simulator.
#[derive(Debug)]
pub struct SimulatorBridge {
    stream: Option<TcpStream>,
    actuators: Vec<ActuatorSpec>,
    observations: Vec<ObservationSpec>,
    receiver: Option<TelemetryReceiver>,
    poll_timeout: Duration,
    last_observation: Vec<f32>,
    last_state: StateValue,
}

impl SimulatorBridge {
    /// Connect the command channel and bind the ordered action/observation
    /// contracts for this session.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn connect(
        addr: &str,
        actuators: Vec<ActuatorSpec>,
        observations: Vec<ObservationSpec>,
    ) -> Result<Self, BridgeError> {
        let stream = TcpStream::connect(addr)?;
        info!(
            addr,
            actuators = actuators.len(),
            observations = observations.len(),
            "bridge connected"
        );
        Ok(Self {
            stream: Some(stream),
            actuators,
            observations,
            receiver: None,
            poll_timeout: Duration::from_millis(100),
            last_observation: Vec::new(),
            last_state: StateValue::empty(),
        })
    }

    /// Attach a telemetry receiver as the fallback observation source.
    #[must_use]
    pub fn with_receiver(mut self, receiver: TelemetryReceiver) -> Self {
        self.receiver = Some(receiver);
        self
    }

    /// Bounded wait used when polling the fallback receiver.
    pub const fn set_poll_timeout(&mut self, timeout: Duration) {
        self.poll_timeout = timeout;
    }

    #[must_use]
    pub fn actuators(&self) -> &[ActuatorSpec] {
        &self.actuators
    }

    #[must_use]
    pub fn observations(&self) -> &[ObservationSpec] {
        &self.observations
    }

    /// Whether the session has been closed with `EXIT`.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.stream.is_none()
    }

    /// Send one command string and block for the paired text response.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Closed`] after [`close`](Self::close); otherwise any
    /// transport error.
    pub fn round_trip(&mut self, command: &str) -> Result<String, BridgeError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(BridgeError::Closed);
        };
        debug!(command, "sending");
        write_text(stream, command)?;
        let response = read_text(stream)?;
        debug!(len = response.len(), "response received");
        Ok(response)
    }

    /// Apply one action vector and return the resulting observation vector.
    ///
    /// The action length is checked against the actuator contract by the
    /// encoder; a mismatch sends the no-op command. A response that fails to
    /// decode falls back to the telemetry receiver, or to an empty vector.
    ///
    /// # Errors
    ///
    /// Transport errors only; see [`round_trip`](Self::round_trip).
    pub fn step(&mut self, values: &[f32]) -> Result<Vec<f32>, BridgeError> {
        let command = encode(&self.actuators, values);
        let response = self.round_trip(&command)?;
        Ok(self.adopt_vector(&response))
    }

    /// Move the named entities to the given poses and return the observation
    /// taken after the move.
    ///
    /// # Errors
    ///
    /// Transport errors only; see [`round_trip`](Self::round_trip).
    pub fn reset(&mut self, poses: &[ResetPose]) -> Result<Vec<f32>, BridgeError> {
        let command = reset_command(poses);
        let response = self.round_trip(&command)?;
        Ok(self.adopt_vector(&response))
    }

    /// Apply one action vector and return the structured entity/attribute
    /// state instead of a flat vector.
    ///
    /// A response that fails to decode leaves the previous state in place,
    /// which the caller sees again; a stale reading beats a torn one.
    ///
    /// # Errors
    ///
    /// Transport errors only; see [`round_trip`](Self::round_trip).
    pub fn step_structured(&mut self, values: &[f32]) -> Result<StateValue, BridgeError> {
        let command = encode(&self.actuators, values);
        let response = self.round_trip(&command)?;
        match decode_structured(&response) {
            Ok(state) => self.last_state = state,
            Err(e) => {
                warn!(error = %e, "structured decode failed, keeping previous state");
                if let Some(receiver) = self.receiver.as_mut() {
                    if let Some(frame) = receiver.poll_once(self.poll_timeout) {
                        info!("telemetry at failure: {frame}");
                    }
                }
            }
        }
        Ok(self.last_state.clone())
    }

    /// The most recent observation vector, including fallback values.
    #[must_use]
    pub fn last_observation(&self) -> &[f32] {
        &self.last_observation
    }

    /// The most recent structured state.
    #[must_use]
    pub const fn last_state(&self) -> &StateValue {
        &self.last_state
    }

    /// Close the session: send `EXIT`, log the acknowledgement, release the
    /// connection and stop the attached receiver. Idempotent; failures while
    /// saying goodbye are logged, not returned, since the session ends
    /// either way.
    ///
    /// The handshake blocks on the simulator's reply. Dropping the bridge
    /// without calling this skips the handshake and just disconnects.
    pub fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            match write_text(&mut stream, EXIT_COMMAND).and_then(|()| read_text(&mut stream)) {
                Ok(ack) => info!(ack, "simulator session closed"),
                Err(e) => warn!(error = %e, "exit handshake failed, closing anyway"),
            }
        }
        if let Some(receiver) = self.receiver.as_mut() {
            receiver.stop();
        }
    }

    /// Decode a vector response, falling back to telemetry, and record it.
    fn adopt_vector(&mut self, response: &str) -> Vec<f32> {
        match decode_vector(response, self.observations.len()) {
            Ok(observation) => self.last_observation = observation,
            Err(e) => {
                warn!(error = %e, "observation decode failed, using fallback");
                self.last_observation = self.fallback_observation();
            }
        }
        self.last_observation.clone()
    }

    /// Poll the attached receiver for a float-vector frame; empty otherwise.
    fn fallback_observation(&mut self) -> Vec<f32> {
        if let Some(receiver) = self.receiver.as_mut() {
            if let Some(frame) = receiver.poll_once(self.poll_timeout) {
                if let FrameValue::FloatVec(values) = frame.value {
                    debug!(title = frame.title, "telemetry frame used as observation");
                    return values;
                }
                warn!(
                    tag = %frame.value.tag(),
                    "polled frame is not a float vector, using empty observation"
                );
            }
        }
        Vec::new()
    }
}

impl Drop for SimulatorBridge {
    fn drop(&mut self) {
        // No exit handshake here: a stalled simulator must not be able to
        // block a drop. The goodbye is owed only to explicit `close()`;
        // the peer sees a plain disconnect otherwise.
        self.stream.take();
        if let Some(receiver) = self.receiver.as_mut() {
            receiver.stop();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
