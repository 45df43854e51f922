//! Device capability seam.
//!
//! The engines never open sessions themselves. A caller either supplies
//! output text directly or injects something implementing [`Device`],
//! whose only job is to execute one command string and return its
//! output. Execution failures are the device's own error type, boxed and
//! propagated unchanged.

/// Error type produced by a device capability.
pub type DeviceError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A device-like capability that can execute a command and return its
/// raw output.
///
/// Closures implement this automatically, which keeps tests and simple
/// embedders free of boilerplate:
///
/// ```
/// use showparse_engine::device::{Device, DeviceError};
///
/// let mut device = |command: &str| -> Result<String, DeviceError> {
///     Ok(format!("echo of {command}"))
/// };
/// assert_eq!(device.execute("show version").unwrap(), "echo of show version");
/// ```
pub trait Device {
    /// Executes one command and returns its output text.
    fn execute(&mut self, command: &str) -> Result<String, DeviceError>;
}

impl<F> Device for F
where
    F: FnMut(&str) -> Result<String, DeviceError>,
{
    fn execute(&mut self, command: &str) -> Result<String, DeviceError> {
        self(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_device_counts_calls() {
        let mut calls = 0;
        {
            let mut device = |_: &str| -> Result<String, DeviceError> {
                calls += 1;
                Ok(String::from("output"))
            };
            assert!(device.execute("show version").is_ok());
            assert!(device.execute("show version").is_ok());
        }
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_device_errors_carry_through() {
        let mut device = |_: &str| -> Result<String, DeviceError> {
            Err("connection reset".into())
        };
        let err = device.execute("show version").unwrap_err();
        assert_eq!(err.to_string(), "connection reset");
    }
}
