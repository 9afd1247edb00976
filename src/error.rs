use thiserror::Error;

/// Why a bus transaction failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFault {
    /// The transport finished the frame with a non-zero completion status.
    Status(u8),
    /// Fewer bytes arrived than were requested.
    ShortRead {
        /// Bytes requested from the device.
        expected: usize,
        /// Bytes the transport actually made available.
        actual: usize,
    },
}

impl std::fmt::Display for TransportFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportFault::Status(code) => write!(f, "completion status {}", code),
            TransportFault::ShortRead { expected, actual } => {
                write!(f, "short read ({} of {} bytes)", actual, expected)
            }
        }
    }
}

/// Errors that can occur when driving a peripheral.
///
/// Every variant maps onto exactly one [`ErrorCode`], which is what the
/// sticky `last_error()` accessors hand back.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Bus address is outside the range the device family can be strapped to.
    #[error("I2C address 0x{address:02X} outside the valid range 0x{min:02X}-0x{max:02X}")]
    Address {
        /// The rejected address.
        address: u8,
        /// Lowest address of the device family.
        min: u8,
        /// Highest address of the device family.
        max: u8,
    },
    /// The bus transaction itself failed (no acknowledge, short read, ...).
    #[error("Transport error at I2C address 0x{address:02X}: {fault}")]
    Transport {
        /// The device address being accessed.
        address: u8,
        /// What the transport reported.
        fault: TransportFault,
    },
    /// Nothing acknowledged the device address while initialising.
    #[error(
        "No device answered at I2C address 0x{address:02X}. Check wiring, power and address straps."
    )]
    Connect {
        /// The address that was probed.
        address: u8,
    },
    /// Pin index outside the device's pin count.
    #[error("Pin {pin} out of range (0-{max})")]
    Pin {
        /// The rejected pin index.
        pin: u8,
        /// Highest valid pin index.
        max: u8,
    },
    /// Port index outside the device's port count.
    #[error("Port {port} out of range (0-{max})")]
    Port {
        /// The rejected port index.
        port: u8,
        /// Highest valid port index.
        max: u8,
    },
    /// A parameter value is not one the hardware accepts.
    #[error("Value out of range: {0}")]
    Value(String),
}

impl Error {
    /// The error code this error is reported as through `last_error()`.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Address { .. } => ErrorCode::Address,
            Error::Transport { .. } => ErrorCode::Transport,
            Error::Connect { .. } => ErrorCode::Connect,
            Error::Pin { .. } => ErrorCode::Pin,
            Error::Port { .. } => ErrorCode::Port,
            Error::Value(_) => ErrorCode::Value,
        }
    }

    /// True when the failure came from the bus rather than from validation.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. } | Error::Connect { .. })
    }
}

/// Result type alias for driver operations.
///
/// This is a convenience alias for `std::result::Result<T, Error>` used
/// throughout the crate to reduce boilerplate.
pub type Result<T> = std::result::Result<T, Error>;

/// Closed set of outcomes a driver handle remembers between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorCode {
    #[default]
    Ok,
    Address,
    Transport,
    Connect,
    Pin,
    Port,
    Value,
}

impl ErrorCode {
    #[inline]
    pub fn is_ok(self) -> bool {
        self == ErrorCode::Ok
    }
}

impl From<&Error> for ErrorCode {
    fn from(err: &Error) -> Self {
        err.code()
    }
}

/// Last outcome of a driver handle, kept until read.
///
/// Drivers record the result of every public operation here; reading it
/// through [`StickyError::take`] resets it to [`ErrorCode::Ok`].
#[derive(Debug, Default)]
pub(crate) struct StickyError {
    code: ErrorCode,
}

impl StickyError {
    /// Stores the outcome of `result` and passes it through unchanged.
    pub(crate) fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        self.code = match &result {
            Ok(_) => ErrorCode::Ok,
            Err(e) => e.code(),
        };
        result
    }

    pub(crate) fn take(&mut self) -> ErrorCode {
        std::mem::take(&mut self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sticky_error_read_clears() {
        let mut sticky = StickyError::default();
        let result: Result<()> = Err(Error::Pin { pin: 16, max: 15 });
        assert!(sticky.record(result).is_err());
        assert_eq!(sticky.take(), ErrorCode::Pin);
        assert_eq!(sticky.take(), ErrorCode::Ok);
    }

    #[test]
    fn test_sticky_error_success_overwrites() {
        let mut sticky = StickyError::default();
        let failed: Result<u8> = Err(Error::Connect { address: 0x20 });
        assert!(sticky.record(failed).is_err());
        assert_eq!(sticky.record(Ok(7u8)), Ok(7));
        assert_eq!(sticky.take(), ErrorCode::Ok);
    }

    #[test]
    fn test_error_display() {
        let err = Error::Transport {
            address: 0x27,
            fault: TransportFault::ShortRead {
                expected: 2,
                actual: 0,
            },
        };
        assert_eq!(
            err.to_string(),
            "Transport error at I2C address 0x27: short read (0 of 2 bytes)"
        );
        assert!(err.is_transport());
        assert!(!Error::Value("mode 9".into()).is_transport());
    }
}
