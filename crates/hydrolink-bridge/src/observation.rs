//! Observation response decoding.
//!
//! Two response conventions exist simulator-side and both are supported:
//!
//! - **Vector mode**: a JSON numeric array decoded to a fixed-length `f32`
//!   vector. A length different from the observation contract is reported
//!   but not fatal; the received length is used as-is.
//! - **Structured mode**: a JSON object of `{entity: {attribute: value}}`
//!   decoded to a [`StateValue`] map, with `null` converted to NaN at any
//!   depth so numeric consumers never see a non-numeric "missing" marker.
//!
//! Both decoders are pure; the fallback policy on parse failure (consult
//! the telemetry receiver, else a typed empty value) lives in
//! [`crate::bridge`], which owns the receiver.

use tracing::warn;

use hydrolink_core::error::SpecError;
use hydrolink_core::types::StateValue;

/// Decode a vector-mode response.
///
/// `null` entries become NaN rather than parse failures. A size mismatch
/// against `expected_len` is logged and the decoded length is kept.
///
/// # Errors
///
/// Returns the JSON error when the response is not a numeric array.
pub fn decode_vector(response: &str, expected_len: usize) -> Result<Vec<f32>, serde_json::Error> {
    let values: Vec<Option<f32>> = serde_json::from_str(response)?;
    if values.len() != expected_len {
        let err = SpecError::ObservationLenMismatch {
            expected: expected_len,
            got: values.len(),
        };
        warn!(%err, "proceeding with received length");
    }
    Ok(values
        .into_iter()
        .map(|v| v.unwrap_or(f32::NAN))
        .collect())
}

/// Decode a structured-mode response.
///
/// # Errors
///
/// Returns the JSON error when the response is not valid JSON.
pub fn decode_structured(response: &str) -> Result<StateValue, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(response)?;
    Ok(StateValue::from_json(value))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
