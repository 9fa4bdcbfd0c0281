//! Telemetry subscriber.
//!
//! [`TelemetryReceiver`] owns one subscribe connection and decodes frames in
//! arrival order, either one at a time with a bounded wait ([`poll_once`])
//! or in a blocking loop ([`stream_forever`]). The two modes share a
//! one-shot lifecycle: once stopped, a receiver stays stopped.
//!
//! Delivery is fire-and-forget: frames published before the subscriber
//! connects are lost, an accepted race of the connect-then-subscribe model.
//!
//! [`poll_once`]: TelemetryReceiver::poll_once
//! [`stream_forever`]: TelemetryReceiver::stream_forever

use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use hydrolink_core::types::TelemetryFrame;

use crate::frame::FrameDecoder;
use crate::framing::read_part;

// ---------------------------------------------------------------------------
// StopHandle
// ---------------------------------------------------------------------------

/// Clonable handle requesting cooperative cancellation of a streaming
/// receiver from another thread.
///
/// Only the running flag is touched; the connection itself is released by
/// the streaming loop when it observes the flag between frames. A frame
/// mid-receive cannot be interrupted, only the next iteration is skipped.
#[derive(Debug, Clone)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
}

impl StopHandle {
    /// Request the streaming loop to exit before its next receive.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// TelemetryReceiver
// ---------------------------------------------------------------------------

/// Owns the asynchronous subscribe connection.
#[derive(Debug)]
pub struct TelemetryReceiver {
    stream: Option<TcpStream>,
    running: Arc<AtomicBool>,
    decoder: FrameDecoder,
}

impl TelemetryReceiver {
    /// Connect to a telemetry publisher (e.g. `"127.0.0.1:5556"`).
    ///
    /// # Errors
    ///
    /// Returns an IO error if the connection cannot be established.
    pub fn connect(addr: &str) -> std::io::Result<Self> {
        let stream = TcpStream::connect(addr)?;
        debug!(addr, "telemetry receiver connected");
        Ok(Self {
            stream: Some(stream),
            running: Arc::new(AtomicBool::new(false)),
            decoder: FrameDecoder::default(),
        })
    }

    /// Enable or disable the per-frame echo line.
    pub const fn set_echo(&mut self, echo: bool) {
        self.decoder.set_echo(echo);
    }

    /// Handle for stopping a streaming loop from another thread.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            running: Arc::clone(&self.running),
        }
    }

    /// Whether the streaming loop is currently armed.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Receive and decode at most one frame, waiting up to `timeout` for a
    /// frame to start.
    ///
    /// Returns `None` on timeout — an expected, non-exceptional outcome.
    /// Any other transport failure is logged and also yields `None`; the
    /// caller's control loop is never aborted from here.
    ///
    /// The bound applies only to the first of the three parts. Once a
    /// frame's id part has arrived, the title and payload are read without a
    /// bound: abandoning them mid-frame would shift every later part by one
    /// slot and misparse the rest of the stream.
    pub fn poll_once(&mut self, timeout: Duration) -> Option<TelemetryFrame> {
        let stream = self.stream.as_mut()?;
        if let Err(e) = stream.set_read_timeout(Some(timeout)) {
            warn!(error = %e, "failed to arm poll timeout");
            return None;
        }

        let id = match read_part(stream) {
            Ok(id) => id,
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                return None;
            }
            Err(e) => {
                warn!(error = %e, "telemetry receive failed");
                return None;
            }
        };

        // A frame is in flight; finish it even past the bound.
        if let Err(e) = stream.set_read_timeout(None) {
            warn!(error = %e, "failed to clear poll timeout");
            return None;
        }
        match read_part(stream).and_then(|title| Ok((title, read_part(stream)?))) {
            Ok((title, payload)) => Some(self.decoder.decode(&id, &title, &payload)),
            Err(e) => {
                warn!(error = %e, "telemetry receive failed");
                None
            }
        }
    }

    /// Receive, decode and hand off frames until stopped.
    ///
    /// Clears the read timeout and blocks on each frame; the running flag is
    /// checked between receptions, so [`StopHandle::stop`] takes effect at
    /// the next iteration. The connection is released on every exit path
    /// (publisher disconnect, transport error, or stop).
    pub fn stream_forever<F: FnMut(&TelemetryFrame)>(&mut self, mut on_frame: F) {
        let Some(stream) = self.stream.as_mut() else {
            warn!("stream_forever called on a stopped receiver");
            return;
        };
        if let Err(e) = stream.set_read_timeout(None) {
            warn!(error = %e, "failed to clear read timeout");
            self.stop();
            return;
        }

        self.running.store(true, Ordering::SeqCst);
        info!("telemetry receiver streaming");

        while self.running.load(Ordering::SeqCst) {
            let Some(stream) = self.stream.as_mut() else {
                break;
            };
            match recv_raw_frame(stream) {
                Ok((id, title, payload)) => {
                    let frame = self.decoder.decode(&id, &title, &payload);
                    on_frame(&frame);
                }
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    info!("telemetry publisher disconnected");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "telemetry stream error");
                    break;
                }
            }
        }

        self.stop();
    }

    /// Stop and release the connection. Idempotent; a no-op when never
    /// started. At most one release is performed per receiver.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if self.stream.take().is_some() {
            debug!("telemetry connection released");
        }
    }
}

impl Drop for TelemetryReceiver {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Read the three consecutive parts of one frame.
fn recv_raw_frame(stream: &mut TcpStream) -> std::io::Result<(Vec<u8>, Vec<u8>, Vec<u8>)> {
    let id = read_part(stream)?;
    let title = read_part(stream)?;
    let payload = read_part(stream)?;
    Ok((id, title, payload))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
