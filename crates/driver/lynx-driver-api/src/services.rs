//! Kernel service contracts for drivers.

use crate::error::DriverError;
use crate::fwnode::FwHandle;
use crate::irq::{ChildDomain, IrqFlags};
use crate::resource::IrqLine;

/// Services the host kernel provides to drivers.
///
/// Passed to drivers at probe time. Drivers use it for time, sleeping and
/// interrupt registration without depending on kernel internals.
pub trait KernelServices: Sync {
    /// Monotonic time in microseconds.
    fn now_us(&self) -> u64;

    /// Sleeps for somewhere between `min_us` and `max_us` microseconds.
    ///
    /// Process context only.
    fn usleep_range(&self, min_us: u64, max_us: u64);

    /// Sleeps for at least `ms` milliseconds. Process context only.
    fn msleep(&self, ms: u64) {
        self.usleep_range(ms * 1000, ms * 1000);
    }

    /// Busy-wait hint for tight polling loops. Safe in any context.
    fn cpu_relax(&self) {
        core::hint::spin_loop();
    }

    /// Requests `irq` for the calling driver.
    ///
    /// Once this returns `Ok`, the host delivers assertions of the line to the
    /// driver's [`IrqHandler`](crate::irq::IrqHandler).
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::ResourceUnavailable`] if the line cannot be
    /// claimed with the given flags.
    fn request_irq(&self, irq: IrqLine, flags: IrqFlags, name: &str) -> Result<(), DriverError>;

    /// Runs the handler mapped to `hwirq` in the child domain `domain` that
    /// the node `owner` registered.
    ///
    /// Called from a chained handler. Returns `false` if nothing is mapped.
    fn handle_child_irq(&self, owner: FwHandle, domain: ChildDomain, hwirq: u32) -> bool;
}
