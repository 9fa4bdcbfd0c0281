//! Payload classification by length precedence.
//!
//! Telemetry payloads carry no type tag; the type is inferred solely from
//! the byte length, with text and opaque binary as the final fallbacks.
//! The rule *order* is the compatibility contract with the publisher:
//!
//! 1. 1 byte       → bool (nonzero is true)
//! 2. 4 bytes      → f32
//! 3. 8 bytes      → f64 (scalar, never a 2-element f32 vector)
//! 4. n%4==0, n>4  → Vec<f32> of n/4 elements
//! 5. n%8==0, n>8  → Vec<f64> of n/8 elements
//! 6. otherwise    → UTF-8 text; a `|` separator makes it a string vector
//! 7. undecodable  → opaque bytes
//!
//! The format is lossy: a 4-byte i32 payload reads as a float bit pattern,
//! and callers must not rely on length alone to tell the two apart. Float
//! decoding cannot fail for a well-sized buffer, so rule 2 (and the
//! per-element analogue in rule 4) always resolves to float and the int
//! variants of [`FrameValue`] are never produced here. Rule 4 also shadows
//! rule 5 for every length divisible by 8; that shadowing is part of the
//! contract. Multi-byte values are little-endian.

use hydrolink_core::types::FrameValue;

/// Separator that turns a text payload into a string vector.
pub const STRING_VECTOR_SEPARATOR: char = '|';

/// Classify a raw payload. Pure and total: never errors, never panics;
/// anything unrecognizable comes back as [`FrameValue::Binary`].
#[must_use]
pub fn classify(payload: &[u8]) -> FrameValue {
    match payload.len() {
        1 => FrameValue::Bool(payload[0] != 0),
        4 => FrameValue::Float(f32::from_le_bytes([
            payload[0], payload[1], payload[2], payload[3],
        ])),
        8 => {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(payload);
            FrameValue::Double(f64::from_le_bytes(bytes))
        }
        n if n % 4 == 0 && n > 4 => FrameValue::FloatVec(
            payload
                .chunks_exact(4)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        ),
        n if n % 8 == 0 && n > 8 => FrameValue::DoubleVec(
            payload
                .chunks_exact(8)
                .map(|c| {
                    let mut bytes = [0u8; 8];
                    bytes.copy_from_slice(c);
                    f64::from_le_bytes(bytes)
                })
                .collect(),
        ),
        _ => classify_text(payload),
    }
}

fn classify_text(payload: &[u8]) -> FrameValue {
    match std::str::from_utf8(payload) {
        Ok(text) if text.contains(STRING_VECTOR_SEPARATOR) => FrameValue::TextVec(
            text.split(STRING_VECTOR_SEPARATOR)
                .map(str::to_owned)
                .collect(),
        ),
        Ok(text) => FrameValue::Text(text.to_owned()),
        Err(_) => FrameValue::Binary(payload.to_vec()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
