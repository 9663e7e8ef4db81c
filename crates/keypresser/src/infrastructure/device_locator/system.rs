//! Device enumeration and probing backed by the `serialport` crate.

use serialport::{SerialPort, SerialPortType};

use super::{DeviceClass, LocatorError, PortDevice, PortEnumerator, PortProber, ProbeFailure};
use crate::infrastructure::serial::io_timeout;

/// Enumerates ports through the OS registry (SetupAPI on Windows, sysfs on
/// Linux, IOKit on macOS).
///
/// The comm-port class yields USB serial devices only; the ports class yields
/// everything the OS reports.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPortEnumerator;

impl PortEnumerator for SystemPortEnumerator {
    fn enumerate(&self, class: DeviceClass) -> Result<Vec<PortDevice>, LocatorError> {
        let ports =
            serialport::available_ports().map_err(|e| LocatorError::Enumeration(e.to_string()))?;

        let devices: Vec<PortDevice> = ports
            .into_iter()
            .filter_map(|info| match info.port_type {
                SerialPortType::UsbPort(usb) => Some(PortDevice {
                    port_name: info.port_name,
                    friendly_name: usb.product.or(usb.manufacturer),
                    hardware_id: Some(format!("USB\\VID_{:04X}&PID_{:04X}", usb.vid, usb.pid)),
                }),
                _ if class == DeviceClass::Ports => Some(PortDevice {
                    port_name: info.port_name,
                    ..PortDevice::default()
                }),
                _ => None,
            })
            .collect();

        if class == DeviceClass::CommPort && devices.is_empty() {
            return Err(LocatorError::ClassUnavailable(class));
        }
        Ok(devices)
    }
}

/// Probes by opening the port exclusively at 9600 baud.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPortProber;

impl PortProber for SystemPortProber {
    type Handle = Box<dyn SerialPort>;

    fn try_open(&self, port_name: &str) -> Result<Self::Handle, ProbeFailure> {
        serialport::new(port_name, 9600)
            .timeout(io_timeout(0))
            .open()
            .map_err(classify)
    }
}

fn classify(err: serialport::Error) -> ProbeFailure {
    match err.kind() {
        serialport::ErrorKind::NoDevice => ProbeFailure::NotFound,
        serialport::ErrorKind::Io(std::io::ErrorKind::NotFound) => ProbeFailure::NotFound,
        serialport::ErrorKind::Io(std::io::ErrorKind::PermissionDenied) => {
            ProbeFailure::AccessDenied
        }
        _ => ProbeFailure::Other(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_maps_error_kinds() {
        let not_found = serialport::Error::new(serialport::ErrorKind::NoDevice, "gone");
        let denied = serialport::Error::new(
            serialport::ErrorKind::Io(std::io::ErrorKind::PermissionDenied),
            "busy",
        );
        let other = serialport::Error::new(serialport::ErrorKind::InvalidInput, "bad baud");

        assert_eq!(classify(not_found), ProbeFailure::NotFound);
        assert_eq!(classify(denied), ProbeFailure::AccessDenied);
        assert!(matches!(classify(other), ProbeFailure::Other(_)));
    }

    #[test]
    fn test_probe_of_missing_port_fails() {
        let result = SystemPortProber.try_open("/dev/keypresser-no-such-port");
        assert!(result.is_err());
    }
}
