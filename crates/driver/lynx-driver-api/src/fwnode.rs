//! Firmware node access and driver match tables.
//!
//! A [`FwNode`] is the host's view of one device-tree node or ACPI device.
//! Drivers read their configuration through it (window counts, erratum
//! flags, endianness) instead of parsing firmware tables themselves.

/// Opaque identity of a firmware node, as known to the host.
///
/// Used to look up objects the host registered against a node, such as the
/// ITS interrupt domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FwHandle(pub u64);

/// Read access to a firmware node.
///
/// Drivers keep a reference to their node for the lifetime of the device
/// and read it from interrupt context.
pub trait FwNode: Sync {
    /// Node name, used as the log prefix (e.g. `pcie@3400000`).
    fn name(&self) -> &str;

    /// Returns the host handle for this node.
    fn handle(&self) -> FwHandle;

    /// Returns `true` if the node lists `compatible` in its compatible list
    /// (or, for ACPI, has it as `_HID`).
    fn is_compatible(&self, compatible: &str) -> bool;

    /// Returns `true` for ACPI devices, `false` for device-tree nodes.
    fn is_acpi(&self) -> bool {
        false
    }

    /// Returns `true` unless firmware marked the node disabled.
    fn is_available(&self) -> bool {
        true
    }

    /// Returns `true` if the property exists (boolean properties).
    fn property_present(&self, name: &str) -> bool;

    /// Reads a single-cell integer property.
    fn property_u32(&self, name: &str) -> Option<u32>;

    /// Reads a string property.
    fn property_str(&self, name: &str) -> Option<&str>;

    /// Resolves entry `index` of a phandle-list property to its target.
    fn phandle(&self, name: &str, index: usize) -> Option<FwHandle>;

    /// Returns the interrupt named `name` in `interrupt-names`.
    fn irq_by_name(&self, name: &str) -> Option<crate::IrqLine>;

    /// Returns interrupt `index` of the node.
    fn irq(&self, index: usize) -> Option<crate::IrqLine>;

    /// Number of child nodes.
    fn child_count(&self) -> usize {
        0
    }

    /// Returns child `index`.
    fn child(&self, index: usize) -> Option<&dyn FwNode> {
        let _ = index;
        None
    }
}

/// A generic translator (ITS) entry from the ACPI MADT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MadtTranslator {
    /// Physical base of the ITS register frame.
    pub base_address: u64,
    /// Translation id, resolved to a domain token through the IORT.
    pub translation_id: u32,
}

/// Compatibility table for matching a driver to firmware nodes.
#[derive(Debug, Clone, Copy)]
pub struct DeviceMatch {
    /// Device-tree `compatible` strings.
    pub of_compatible: &'static [&'static str],
    /// ACPI `_HID` values.
    pub acpi_hid: &'static [&'static str],
}

impl DeviceMatch {
    /// Returns `true` if `node` matches any entry.
    pub fn matches(&self, node: &dyn FwNode) -> bool {
        self.of_compatible
            .iter()
            .chain(self.acpi_hid)
            .any(|c| node.is_compatible(c))
    }
}
