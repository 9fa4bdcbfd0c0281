//! Length-prefixed wire parts.
//!
//! Every part on either channel is a 4-byte **little-endian** `u32` length
//! prefix followed by that many raw bytes:
//!
//! ```text
//! +----------------+------------------+
//! | Length (4B LE) | Payload          |
//! +----------------+------------------+
//! ```
//!
//! The command channel carries one UTF-8 part per request and one per
//! response. The telemetry channel carries three consecutive parts per
//! frame (id, title, payload), written back-to-back by the publisher.

use std::io::{Read, Write};

/// Maximum accepted part size (16 MiB). A larger prefix means a corrupt or
/// hostile stream.
pub const MAX_PART_SIZE: usize = 16 * 1024 * 1024;

/// Write one length-prefixed part and flush.
///
/// # Errors
///
/// Returns an `io::Error` if the data exceeds [`MAX_PART_SIZE`] or writing
/// fails.
pub fn write_part<W: Write>(writer: &mut W, data: &[u8]) -> std::io::Result<()> {
    if data.len() > MAX_PART_SIZE {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("part of {} bytes exceeds maximum {MAX_PART_SIZE}", data.len()),
        ));
    }
    // MAX_PART_SIZE fits in u32, so the length always converts.
    let len = u32::try_from(data.len())
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "part too large"))?
        .to_le_bytes();
    writer.write_all(&len)?;
    writer.write_all(data)?;
    writer.flush()
}

/// Read one length-prefixed part.
///
/// # Errors
///
/// Returns an `io::Error` if the prefix or payload cannot be read, the
/// stream ends prematurely, or the prefix exceeds [`MAX_PART_SIZE`].
pub fn read_part<R: Read>(reader: &mut R) -> std::io::Result<Vec<u8>> {
    let mut len_bytes = [0u8; 4];
    reader.read_exact(&mut len_bytes)?;
    let len = u32::from_le_bytes(len_bytes) as usize;
    if len > MAX_PART_SIZE {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("part prefix of {len} bytes exceeds maximum {MAX_PART_SIZE}"),
        ));
    }
    let mut data = vec![0u8; len];
    reader.read_exact(&mut data)?;
    Ok(data)
}

/// Write one UTF-8 text part.
///
/// # Errors
///
/// Propagates [`write_part`] errors.
pub fn write_text<W: Write>(writer: &mut W, text: &str) -> std::io::Result<()> {
    write_part(writer, text.as_bytes())
}

/// Read one part and decode it as UTF-8 text, lossily.
///
/// # Errors
///
/// Propagates [`read_part`] errors.
pub fn read_text<R: Read>(reader: &mut R) -> std::io::Result<String> {
    let data = read_part(reader)?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
