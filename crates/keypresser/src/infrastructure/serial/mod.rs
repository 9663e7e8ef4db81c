//! Serial transport: timeout-bound byte I/O on one exclusive serial port.
//!
//! The transport knows nothing about command frames.  [`SerialTransport`]
//! talks to real hardware through the `serialport` crate; [`mock`] provides a
//! recording double for tests.
//!
//! # Timeouts
//!
//! Every read or write of `n` bytes may block for at most
//! `50 ms + 10 ms × n`, mirroring the classic Win32 `COMMTIMEOUTS` setup of a
//! 50 ms constant plus a 10 ms per-byte multiplier.

pub mod mock;

use std::io::{Read, Write};
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use thiserror::Error;
use tracing::{debug, warn};

/// Constant part of every I/O timeout.
pub const TIMEOUT_CONSTANT_MS: u64 = 50;

/// Per-byte part of every I/O timeout.
pub const TIMEOUT_PER_BYTE_MS: u64 = 10;

/// Largest single read, regardless of what the caller asks for.
pub const READ_BUFFER_CAP: usize = 1024;

/// Errors produced by a [`Transport`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// I/O was attempted while no port is open.
    #[error("serial port is not open")]
    NotOpen,

    /// The port could not be opened or configured.
    #[error("failed to open {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },

    /// Fewer bytes were accepted than were offered.
    #[error("short write: {written} of {expected} bytes accepted")]
    ShortWrite { written: usize, expected: usize },

    /// The underlying read or write failed.
    #[error("serial I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A test double was told to fail.
    #[error("simulated transport failure")]
    Simulated,
}

/// Byte-level access to one serial device.
///
/// Implementations must fail cleanly with [`TransportError::NotOpen`] when no
/// port is open, and release the handle exactly once on `close` or drop.
pub trait Transport: Send {
    /// Opens `port_name` exclusively at `baud_rate`, 8N1, no flow control.
    ///
    /// A previously open port is closed first.  On failure no handle is kept.
    fn open(&mut self, port_name: &str, baud_rate: u32) -> Result<(), TransportError>;

    /// Pure query.
    fn is_open(&self) -> bool;

    /// Writes every byte or fails; a short write is an error.
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Returns up to `min(max_bytes, READ_BUFFER_CAP)` bytes.  An empty vector
    /// means the timeout elapsed with nothing to read.
    fn read(&mut self, max_bytes: usize) -> Result<Vec<u8>, TransportError>;

    /// Releases the port.  Safe to call when never opened.
    fn close(&mut self);
}

/// Timeout for an I/O call moving `bytes` bytes.
pub fn io_timeout(bytes: usize) -> Duration {
    Duration::from_millis(TIMEOUT_CONSTANT_MS + TIMEOUT_PER_BYTE_MS * bytes as u64)
}

// ── SerialTransport ───────────────────────────────────────────────────────────

/// [`Transport`] backed by a real serial port.
///
/// On Unix the port is opened with `TIOCEXCL`; Windows COM ports are always
/// exclusive.
#[derive(Default)]
pub struct SerialTransport {
    port: Option<Box<dyn SerialPort>>,
    port_name: String,
}

impl SerialTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the open port, or an empty string.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl Transport for SerialTransport {
    fn open(&mut self, port_name: &str, baud_rate: u32) -> Result<(), TransportError> {
        self.close();

        let port = serialport::new(port_name, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(io_timeout(0))
            .open()
            .map_err(|source| TransportError::Open {
                port: port_name.to_string(),
                source,
            })?;

        debug!(port = port_name, baud_rate, "serial port opened");
        self.port = Some(port);
        self.port_name = port_name.to_string();
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let port = self.port.as_mut().ok_or(TransportError::NotOpen)?;
        if let Err(e) = port.set_timeout(io_timeout(bytes.len())) {
            warn!(error = %e, "could not adjust write timeout");
        }

        let written = port.write(bytes)?;
        if written != bytes.len() {
            return Err(TransportError::ShortWrite {
                written,
                expected: bytes.len(),
            });
        }
        Ok(())
    }

    fn read(&mut self, max_bytes: usize) -> Result<Vec<u8>, TransportError> {
        let port = self.port.as_mut().ok_or(TransportError::NotOpen)?;
        let cap = max_bytes.min(READ_BUFFER_CAP);
        if cap == 0 {
            return Ok(Vec::new());
        }
        if let Err(e) = port.set_timeout(io_timeout(cap)) {
            warn!(error = %e, "could not adjust read timeout");
        }

        let mut buf = vec![0u8; cap];
        match port.read(&mut buf) {
            Ok(n) => {
                buf.truncate(n);
                Ok(buf)
            }
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(Vec::new()),
            Err(e) => Err(TransportError::Io(e)),
        }
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            debug!(port = %self.port_name, "serial port closed");
        }
        self.port_name.clear();
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_timeout_scales_with_bytes() {
        assert_eq!(io_timeout(0), Duration::from_millis(50));
        assert_eq!(io_timeout(6), Duration::from_millis(110));
    }

    #[test]
    fn test_new_transport_is_closed() {
        let transport = SerialTransport::new();
        assert!(!transport.is_open());
        assert_eq!(transport.port_name(), "");
    }

    #[test]
    fn test_write_on_closed_transport_fails_cleanly() {
        let mut transport = SerialTransport::new();
        let result = transport.write(b"<0,58>");
        assert!(matches!(result, Err(TransportError::NotOpen)));
    }

    #[test]
    fn test_read_on_closed_transport_fails_cleanly() {
        let mut transport = SerialTransport::new();
        assert!(matches!(transport.read(16), Err(TransportError::NotOpen)));
    }

    #[test]
    fn test_close_is_safe_when_never_opened() {
        let mut transport = SerialTransport::new();
        transport.close();
        transport.close();
        assert!(!transport.is_open());
    }

    #[test]
    fn test_open_nonexistent_port_keeps_no_handle() {
        // Arrange
        let mut transport = SerialTransport::new();

        // Act
        let result = transport.open("/dev/keypresser-does-not-exist", 9600);

        // Assert
        assert!(matches!(result, Err(TransportError::Open { .. })));
        assert!(!transport.is_open());
    }
}
