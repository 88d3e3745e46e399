//! Driver error types.

use core::fmt;

/// Errors that can occur during driver operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    /// A required resource (IRQ line, memory region, firmware property) is
    /// missing. Fatal to probe.
    ResourceUnavailable,
    /// A bounded hardware poll ran out of attempts.
    Timeout,
    /// The parent interrupt domain of an MSI domain could not be found.
    DomainLookupFailure,
    /// The caller passed a device or value the driver cannot handle.
    InvalidArgument,
    /// The hardware device was not found or is not the expected kind.
    DeviceNotFound,
    /// A fixed-size allocator (vectors, windows) is exhausted.
    NoSpace,
    /// The operation is not implemented for this device.
    Unsupported,
    /// Driver initialization failed.
    InitFailed,
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResourceUnavailable => f.write_str("required resource unavailable"),
            Self::Timeout => f.write_str("hardware operation timed out"),
            Self::DomainLookupFailure => f.write_str("parent interrupt domain not found"),
            Self::InvalidArgument => f.write_str("invalid argument"),
            Self::DeviceNotFound => f.write_str("device not found"),
            Self::NoSpace => f.write_str("no space left"),
            Self::Unsupported => f.write_str("operation not supported"),
            Self::InitFailed => f.write_str("driver initialization failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_all_variants() {
        assert_eq!(
            format!("{}", DriverError::ResourceUnavailable),
            "required resource unavailable"
        );
        assert_eq!(
            format!("{}", DriverError::Timeout),
            "hardware operation timed out"
        );
        assert_eq!(
            format!("{}", DriverError::DomainLookupFailure),
            "parent interrupt domain not found"
        );
        assert_eq!(
            format!("{}", DriverError::InvalidArgument),
            "invalid argument"
        );
        assert_eq!(format!("{}", DriverError::DeviceNotFound), "device not found");
        assert_eq!(format!("{}", DriverError::NoSpace), "no space left");
        assert_eq!(
            format!("{}", DriverError::Unsupported),
            "operation not supported"
        );
        assert_eq!(
            format!("{}", DriverError::InitFailed),
            "driver initialization failed"
        );
    }

    #[test]
    fn error_equality() {
        assert_eq!(DriverError::Timeout, DriverError::Timeout);
        assert_ne!(DriverError::Timeout, DriverError::DomainLookupFailure);
    }
}
