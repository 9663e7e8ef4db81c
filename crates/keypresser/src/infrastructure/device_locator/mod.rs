//! Finds the serial port an Arduino Leonardo is attached to.
//!
//! Discovery runs in two phases and the first hit wins:
//!
//! 1. **Metadata enumeration.**  List the serial-class devices the OS knows
//!    about, preferring the communications-port class and falling back to the
//!    broader ports class when that listing is unavailable.  A device matches
//!    when its friendly name contains `Arduino` or `Leonardo`, or else when its
//!    hardware id contains `VID_2341&PID_8036`.
//! 2. **Brute-force scan.**  Open each candidate port name in turn and return
//!    the first one that opens.  This cannot verify identity, so the result is
//!    a best-effort guess.  Each probe handle is dropped before the next probe.
//!
//! Nothing is cached and nothing is retried; "not found" is `None`, not an
//! error.

pub mod mock;
pub mod system;

use std::fmt;

use thiserror::Error;
use tracing::{debug, info};

/// USB vendor id of Arduino SA.
pub const ARDUINO_VENDOR_ID: u16 = 0x2341;

/// USB product id of the Leonardo.
pub const LEONARDO_PRODUCT_ID: u16 = 0x8036;

/// Hardware-id fragment identifying a Leonardo.
pub const LEONARDO_HARDWARE_ID: &str = "VID_2341&PID_8036";

/// Friendly-name fragments identifying a Leonardo.  Matching is case-sensitive.
pub const FRIENDLY_NAME_MARKERS: [&str; 2] = ["Arduino", "Leonardo"];

/// Number of port names tried by the brute-force scan.
pub const SCAN_PORT_COUNT: usize = 20;

/// Registry class to enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    /// The precise communications-port interface class.
    CommPort,
    /// The broader "Ports (COM & LPT)" setup class.
    Ports,
}

/// One enumerated serial device.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PortDevice {
    pub port_name: String,
    pub friendly_name: Option<String>,
    pub hardware_id: Option<String>,
}

impl PortDevice {
    /// `true` if the friendly name or hardware id identifies a Leonardo.
    pub fn is_leonardo(&self) -> bool {
        let by_name = self
            .friendly_name
            .as_deref()
            .is_some_and(|name| FRIENDLY_NAME_MARKERS.iter().any(|m| name.contains(m)));
        if by_name {
            return true;
        }
        self.hardware_id
            .as_deref()
            .is_some_and(|id| id.contains(LEONARDO_HARDWARE_ID))
    }
}

#[derive(Debug, Error)]
pub enum LocatorError {
    /// The requested device class cannot be listed on this system.
    #[error("device class {0:?} is unavailable")]
    ClassUnavailable(DeviceClass),

    #[error("port enumeration failed: {0}")]
    Enumeration(String),
}

/// Why a probe open failed.  Only used for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    NotFound,
    AccessDenied,
    Other(String),
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeFailure::NotFound => f.write_str("not found"),
            ProbeFailure::AccessDenied => f.write_str("access denied"),
            ProbeFailure::Other(reason) => write!(f, "error: {reason}"),
        }
    }
}

/// Lists serial devices by class.
#[cfg_attr(test, mockall::automock)]
pub trait PortEnumerator: Send + Sync {
    fn enumerate(&self, class: DeviceClass) -> Result<Vec<PortDevice>, LocatorError>;
}

/// Opens ports exclusively for the brute-force scan.
///
/// The returned handle holds the port open; dropping it closes the port.
pub trait PortProber: Send + Sync {
    type Handle;

    fn try_open(&self, port_name: &str) -> Result<Self::Handle, ProbeFailure>;
}

/// Anything that can answer "which port is the Leonardo on?".
pub trait PortLocator: Send + Sync {
    fn find_port(&self) -> Option<String>;
}

/// Port names the brute-force scan tries, in order.
pub fn default_scan_ports() -> Vec<String> {
    (1..=SCAN_PORT_COUNT)
        .map(|i| {
            if cfg!(target_os = "windows") {
                format!("COM{i}")
            } else {
                format!("/dev/ttyACM{}", i - 1)
            }
        })
        .collect()
}

// ── DeviceLocator ─────────────────────────────────────────────────────────────

/// Two-phase Leonardo discovery.
pub struct DeviceLocator<E, P> {
    enumerator: E,
    prober: P,
    scan_ports: Vec<String>,
    verbose: bool,
}

/// Emits a diagnostic line at `info` when verbose, `debug` otherwise.
macro_rules! trace_attempt {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            info!($($arg)+);
        } else {
            debug!($($arg)+);
        }
    };
}

impl<E: PortEnumerator, P: PortProber> DeviceLocator<E, P> {
    pub fn new(enumerator: E, prober: P) -> Self {
        Self {
            enumerator,
            prober,
            scan_ports: default_scan_ports(),
            verbose: false,
        }
    }

    /// Logs every attempt at `info` instead of `debug`.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Replaces the brute-force scan candidates.
    pub fn with_scan_ports(mut self, ports: Vec<String>) -> Self {
        self.scan_ports = ports;
        self
    }

    /// Runs both phases and returns the first candidate port name.
    pub fn locate(&self) -> Option<String> {
        if let Some(port) = self.find_by_metadata() {
            trace_attempt!(self.verbose, port = %port, "Leonardo found by device metadata");
            return Some(port);
        }
        let found = self.find_by_scan();
        match &found {
            Some(port) => trace_attempt!(self.verbose, port = %port, "port scan found a candidate"),
            None => trace_attempt!(self.verbose, "no Leonardo candidate found"),
        }
        found
    }

    /// Phase A: match enumerated devices by friendly name or hardware id.
    pub fn find_by_metadata(&self) -> Option<String> {
        let devices = match self.enumerator.enumerate(DeviceClass::CommPort) {
            Ok(devices) => devices,
            Err(e) => {
                trace_attempt!(self.verbose, error = %e, "falling back to ports class");
                match self.enumerator.enumerate(DeviceClass::Ports) {
                    Ok(devices) => devices,
                    Err(e) => {
                        trace_attempt!(self.verbose, error = %e, "device enumeration failed");
                        return None;
                    }
                }
            }
        };

        for device in devices {
            trace_attempt!(
                self.verbose,
                port = %device.port_name,
                friendly_name = device.friendly_name.as_deref().unwrap_or(""),
                hardware_id = device.hardware_id.as_deref().unwrap_or(""),
                "inspecting serial device"
            );
            if device.is_leonardo() {
                return Some(device.port_name);
            }
        }
        None
    }

    /// Phase B: return the first scan candidate that opens.
    pub fn find_by_scan(&self) -> Option<String> {
        for port in &self.scan_ports {
            match self.prober.try_open(port) {
                Ok(handle) => {
                    drop(handle);
                    trace_attempt!(self.verbose, port = %port, "probe opened");
                    return Some(port.clone());
                }
                Err(reason) => {
                    trace_attempt!(self.verbose, port = %port, %reason, "probe failed");
                }
            }
        }
        None
    }
}

impl<E: PortEnumerator, P: PortProber> PortLocator for DeviceLocator<E, P> {
    fn find_port(&self) -> Option<String> {
        self.locate()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
