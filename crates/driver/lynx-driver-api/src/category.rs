//! Driver category traits defining lifecycle and probe patterns.

use crate::driver::Driver;
use crate::error::DriverError;
use crate::fwnode::DeviceMatch;

/// A driver bound to a firmware node (device tree or ACPI).
///
/// The host matches nodes against [`MATCH`](Self::MATCH), gathers the
/// resources the driver asks for, and calls [`probe`](Self::probe) once per
/// matching node. Resources are moved in to make ownership explicit.
pub trait PlatformDriver: Driver + Sized {
    /// Compatibility table used by the host to select this driver.
    const MATCH: DeviceMatch;

    /// The resource bundle this driver needs to probe.
    type Resources;

    /// Probes the hardware using the given resources and returns an
    /// initialized driver.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] if a required resource is missing or the
    /// hardware is not what the node claims.
    fn probe(resources: Self::Resources) -> Result<Self, DriverError>;

    /// Quiesces the hardware before the host tears the device down.
    ///
    /// Best-effort; the default does nothing.
    fn shutdown(&mut self) {}
}
