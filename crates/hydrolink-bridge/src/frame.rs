//! 3-part telemetry frame decoding.

use tracing::{info, warn};

use hydrolink_core::types::TelemetryFrame;

use crate::sniff::classify;

/// Decodes raw frame parts into a [`TelemetryFrame`].
///
/// Decoding never fails: a malformed id degrades to 0, a malformed title to
/// lossy UTF-8, and the payload classifier is total. With echo enabled,
/// every decoded frame is logged as one formatted line.
#[derive(Debug, Clone, Default)]
pub struct FrameDecoder {
    echo: bool,
}

impl FrameDecoder {
    #[must_use]
    pub const fn new(echo: bool) -> Self {
        Self { echo }
    }

    /// Enable or disable per-frame echo lines.
    pub const fn set_echo(&mut self, echo: bool) {
        self.echo = echo;
    }

    #[must_use]
    pub const fn echo(&self) -> bool {
        self.echo
    }

    /// Decode the three raw parts of one frame.
    ///
    /// `id_bytes` is expected to be a 4-byte little-endian signed integer.
    #[must_use]
    pub fn decode(&self, id_bytes: &[u8], title_bytes: &[u8], payload: &[u8]) -> TelemetryFrame {
        let id = match <[u8; 4]>::try_from(id_bytes) {
            Ok(bytes) => i32::from_le_bytes(bytes),
            Err(_) => {
                warn!(len = id_bytes.len(), "frame id part is not 4 bytes, using 0");
                0
            }
        };
        let title = String::from_utf8_lossy(title_bytes).into_owned();
        let value = classify(payload);

        let frame = TelemetryFrame { id, title, value };
        if self.echo {
            info!("{frame}");
        }
        frame
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
