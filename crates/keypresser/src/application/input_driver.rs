//! Input Driver: one connect/command API over locator, codec and transport.
//!
//! Every command method encodes one frame and writes it under the transport
//! lock, so frames from concurrent emitters never interleave on the wire.
//! Nothing is retried or buffered; the transport's result is returned as is.
//!
//! The methods are blocking.  Async callers run them on a blocking thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use keypresser_core::protocol::{encode_command_bytes, Command, MouseButtons, ProtocolError};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::infrastructure::device_locator::PortLocator;
use crate::infrastructure::serial::{Transport, TransportError};

/// Baud rate the firmware listens on unless told otherwise.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Hold time used by [`InputDriver::send_key`] callers that have no setting.
pub const DEFAULT_PRESS_DURATION: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum DriverError {
    /// Discovery exhausted both phases and no port was supplied.
    #[error("no Arduino Leonardo found")]
    DeviceNotFound,

    /// The one-time connection check already ran and did not connect.
    #[error("not connected to a device")]
    NotConnected,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Connection manager and typed command façade.
pub struct InputDriver {
    transport: Mutex<Box<dyn Transport>>,
    locator: Arc<dyn PortLocator>,
    port_name: Mutex<Option<String>>,
    first_check_done: AtomicBool,
}

impl InputDriver {
    pub fn new(transport: Box<dyn Transport>, locator: Arc<dyn PortLocator>) -> Self {
        Self {
            transport: Mutex::new(transport),
            locator,
            port_name: Mutex::new(None),
            first_check_done: AtomicBool::new(false),
        }
    }

    // ── Connection ────────────────────────────────────────────────────────────

    /// Opens `port`, or the discovered port when `port` is `None`.
    ///
    /// Returns the name of the port that was opened.
    ///
    /// # Errors
    ///
    /// [`DriverError::DeviceNotFound`] when discovery finds nothing, or the
    /// transport's open error.
    pub fn connect(&self, port: Option<&str>, baud_rate: u32) -> Result<String, DriverError> {
        let port = match port {
            Some(p) => p.to_string(),
            None => self.locator.find_port().ok_or(DriverError::DeviceNotFound)?,
        };

        self.transport.lock().open(&port, baud_rate)?;
        info!(port = %port, baud_rate, "connected to Leonardo");
        *self.port_name.lock() = Some(port.clone());
        Ok(port)
    }

    /// Connects once per driver: discovery first, then `manual_port` as the
    /// fallback when discovery finds nothing.
    ///
    /// Later calls never rediscover; they only report whether the first
    /// attempt left the driver connected.
    ///
    /// # Errors
    ///
    /// On the first call, the [`InputDriver::connect`] error.  Afterwards,
    /// [`DriverError::NotConnected`] if not connected.
    pub fn ensure_connected(
        &self,
        manual_port: Option<&str>,
        baud_rate: u32,
    ) -> Result<(), DriverError> {
        if self.first_check_done.swap(true, Ordering::SeqCst) {
            return if self.is_connected() {
                Ok(())
            } else {
                Err(DriverError::NotConnected)
            };
        }

        let port = match self.locator.find_port() {
            Some(found) => found,
            None => {
                warn!("automatic discovery found nothing");
                manual_port
                    .map(str::to_string)
                    .ok_or(DriverError::DeviceNotFound)?
            }
        };
        self.connect(Some(&port), baud_rate).map(|_| ())
    }

    pub fn is_connected(&self) -> bool {
        self.transport.lock().is_open()
    }

    /// Name of the connected port, if any.
    pub fn port_name(&self) -> Option<String> {
        self.port_name.lock().clone()
    }

    /// Closes the port.  Safe to call when not connected.
    pub fn disconnect(&self) {
        self.transport.lock().close();
        *self.port_name.lock() = None;
    }

    // ── Commands ──────────────────────────────────────────────────────────────

    /// Encodes and writes one command.
    ///
    /// # Errors
    ///
    /// [`DriverError::Protocol`] if the command cannot be encoded, otherwise
    /// the transport's write error.
    pub fn send(&self, command: &Command) -> Result<(), DriverError> {
        let bytes = encode_command_bytes(command)?;
        self.transport.lock().write(&bytes)?;
        debug!(frame = %String::from_utf8_lossy(&bytes), "frame sent");
        Ok(())
    }

    pub fn press_key(&self, key: &str) -> Result<(), DriverError> {
        self.send(&Command::PressKey(key.to_string()))
    }

    pub fn release_key(&self, key: &str) -> Result<(), DriverError> {
        self.send(&Command::ReleaseKey(key.to_string()))
    }

    /// Types `text` verbatim.  `<`, `>` and `,` break the firmware's framing.
    pub fn type_string(&self, text: &str) -> Result<(), DriverError> {
        self.send(&Command::TypeString(text.to_string()))
    }

    /// Sends the keys as one combination frame.  An empty list is rejected
    /// with [`ProtocolError::EmptyCombination`]; use a single press instead.
    pub fn press_combination(&self, keys: &[String]) -> Result<(), DriverError> {
        self.send(&Command::PressCombination(keys.to_vec()))
    }

    pub fn delay(&self, ms: u32) -> Result<(), DriverError> {
        self.send(&Command::Delay(ms))
    }

    pub fn mouse_move(&self, dx: i32, dy: i32) -> Result<(), DriverError> {
        self.send(&Command::MouseMove { dx, dy })
    }

    pub fn mouse_press(&self, buttons: MouseButtons) -> Result<(), DriverError> {
        self.send(&Command::MousePress(buttons))
    }

    pub fn mouse_release(&self, buttons: MouseButtons) -> Result<(), DriverError> {
        self.send(&Command::MouseRelease(buttons))
    }

    pub fn mouse_click(&self, buttons: MouseButtons, count: u32) -> Result<(), DriverError> {
        self.send(&Command::MouseClick { buttons, count })
    }

    pub fn mouse_wheel(&self, delta: i32) -> Result<(), DriverError> {
        self.send(&Command::MouseWheel(delta))
    }

    /// Presses `key`, sleeps for `hold`, then releases it.
    ///
    /// Blocks the calling thread for `hold`; the transport lock is not held
    /// while sleeping, so other emitters keep writing.  A failed press skips
    /// the release.
    pub fn send_key(&self, key: &str, hold: Duration) -> Result<(), DriverError> {
        self.press_key(key)?;
        if !hold.is_zero() {
            std::thread::sleep(hold);
        }
        self.release_key(key)
    }

    /// [`InputDriver::send_key`] for a numeric key code.
    pub fn send_key_code(&self, code: u16, hold: Duration) -> Result<(), DriverError> {
        self.send_key(&code.to_string(), hold)
    }

    /// [`InputDriver::press_combination`] for numeric key codes.
    pub fn press_combination_codes(&self, codes: &[u16]) -> Result<(), DriverError> {
        self.send(&Command::combination(codes))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
