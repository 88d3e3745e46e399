//! Host-side fakes of the kernel for driver tests.
//!
//! [`MockServices`] keeps a virtual clock that only advances when a driver
//! sleeps, so tests can assert exactly how long a polling loop waited.
//! [`MockNode`] is a builder for firmware nodes.

use std::collections::BTreeMap;
use std::string::{String, ToString};
use std::vec::Vec;

use lynx_core::sync::SpinLock;

use crate::error::DriverError;
use crate::fwnode::{FwHandle, FwNode};
use crate::irq::{ChildDomain, IrqFlags};
use crate::resource::IrqLine;
use crate::services::KernelServices;

/// One recorded `request_irq` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrqRequest {
    /// Line requested.
    pub irq: u32,
    /// Flags passed.
    pub flags: IrqFlags,
    /// Name passed.
    pub name: String,
}

#[derive(Default)]
struct ServicesState {
    now_us: u64,
    sleeps: Vec<(u64, u64)>,
    relaxes: usize,
    irqs: Vec<IrqRequest>,
    refuse_irqs: bool,
    mapped: Vec<(FwHandle, ChildDomain, u32)>,
    dispatched: Vec<(ChildDomain, u32)>,
}

/// Fake [`KernelServices`] with a virtual clock.
#[derive(Default)]
pub struct MockServices {
    state: SpinLock<ServicesState>,
}

impl MockServices {
    /// Creates services with the clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `usleep_range` call so far, in order.
    pub fn sleeps(&self) -> Vec<(u64, u64)> {
        self.state.lock().sleeps.clone()
    }

    /// Number of `cpu_relax` calls so far.
    pub fn relaxes(&self) -> usize {
        self.state.lock().relaxes
    }

    /// Every successful `request_irq` call so far.
    pub fn irq_requests(&self) -> Vec<IrqRequest> {
        self.state.lock().irqs.clone()
    }

    /// Makes subsequent `request_irq` calls fail.
    pub fn refuse_irqs(&self) {
        self.state.lock().refuse_irqs = true;
    }

    /// Maps `hwirq` in `owner`'s child domain so dispatches to it succeed.
    pub fn map_child_irq(&self, owner: FwHandle, domain: ChildDomain, hwirq: u32) {
        self.state.lock().mapped.push((owner, domain, hwirq));
    }

    /// Every child interrupt dispatched so far, mapped or not.
    pub fn dispatched(&self) -> Vec<(ChildDomain, u32)> {
        self.state.lock().dispatched.clone()
    }

    /// Advances the virtual clock without recording a sleep.
    pub fn advance_us(&self, us: u64) {
        self.state.lock().now_us += us;
    }

    /// Forgets recorded sleeps and relaxes.
    pub fn clear_log(&self) {
        let mut state = self.state.lock();
        state.sleeps.clear();
        state.relaxes = 0;
    }
}

impl KernelServices for MockServices {
    fn now_us(&self) -> u64 {
        self.state.lock().now_us
    }

    fn usleep_range(&self, min_us: u64, max_us: u64) {
        let mut state = self.state.lock();
        state.now_us += min_us;
        state.sleeps.push((min_us, max_us));
    }

    fn cpu_relax(&self) {
        self.state.lock().relaxes += 1;
    }

    fn request_irq(&self, irq: IrqLine, flags: IrqFlags, name: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        if state.refuse_irqs {
            return Err(DriverError::ResourceUnavailable);
        }
        state.irqs.push(IrqRequest {
            irq: irq.number(),
            flags,
            name: name.to_string(),
        });
        Ok(())
    }

    fn handle_child_irq(&self, owner: FwHandle, domain: ChildDomain, hwirq: u32) -> bool {
        let mut state = self.state.lock();
        state.dispatched.push((domain, hwirq));
        state.mapped.contains(&(owner, domain, hwirq))
    }
}

#[derive(Debug, Clone)]
enum Prop {
    Flag,
    U32(u32),
    Str(String),
    Phandles(Vec<FwHandle>),
}

/// A firmware node assembled in a test.
#[derive(Debug, Clone)]
pub struct MockNode {
    name: String,
    handle: FwHandle,
    compatible: Vec<String>,
    available: bool,
    acpi: bool,
    props: BTreeMap<String, Prop>,
    irqs: Vec<(String, u32)>,
    children: Vec<MockNode>,
}

impl MockNode {
    /// Creates an available node with no properties.
    pub fn new(name: &str, handle: u64) -> Self {
        Self {
            name: name.to_string(),
            handle: FwHandle(handle),
            compatible: Vec::new(),
            available: true,
            acpi: false,
            props: BTreeMap::new(),
            irqs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Adds a compatible string (or ACPI `_HID`).
    #[must_use]
    pub fn compatible(mut self, compatible: &str) -> Self {
        self.compatible.push(compatible.to_string());
        self
    }

    /// Makes this an ACPI device instead of a device-tree node.
    #[must_use]
    pub fn acpi(mut self) -> Self {
        self.acpi = true;
        self
    }

    /// Marks the node `status = "disabled"`.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.available = false;
        self
    }

    /// Adds a boolean property.
    #[must_use]
    pub fn flag(mut self, name: &str) -> Self {
        self.props.insert(name.to_string(), Prop::Flag);
        self
    }

    /// Adds an integer property.
    #[must_use]
    pub fn u32_prop(mut self, name: &str, value: u32) -> Self {
        self.props.insert(name.to_string(), Prop::U32(value));
        self
    }

    /// Adds a string property.
    #[must_use]
    pub fn str_prop(mut self, name: &str, value: &str) -> Self {
        self.props
            .insert(name.to_string(), Prop::Str(value.to_string()));
        self
    }

    /// Adds a phandle-list property.
    #[must_use]
    pub fn phandles(mut self, name: &str, targets: &[u64]) -> Self {
        self.props.insert(
            name.to_string(),
            Prop::Phandles(targets.iter().map(|&t| FwHandle(t)).collect()),
        );
        self
    }

    /// Appends an interrupt, named `name` in `interrupt-names`.
    #[must_use]
    pub fn irq(mut self, name: &str, irq: u32) -> Self {
        self.irqs.push((name.to_string(), irq));
        self
    }

    /// Adds a child node.
    #[must_use]
    pub fn child(mut self, child: MockNode) -> Self {
        self.children.push(child);
        self
    }
}

impl FwNode for MockNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&self) -> FwHandle {
        self.handle
    }

    fn is_compatible(&self, compatible: &str) -> bool {
        self.compatible.iter().any(|c| c == compatible)
    }

    fn is_acpi(&self) -> bool {
        self.acpi
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn property_present(&self, name: &str) -> bool {
        self.props.contains_key(name)
    }

    fn property_u32(&self, name: &str) -> Option<u32> {
        match self.props.get(name)? {
            Prop::U32(v) => Some(*v),
            _ => None,
        }
    }

    fn property_str(&self, name: &str) -> Option<&str> {
        if name == "compatible" {
            return self.compatible.first().map(String::as_str);
        }
        match self.props.get(name)? {
            Prop::Str(s) => Some(s),
            _ => None,
        }
    }

    fn phandle(&self, name: &str, index: usize) -> Option<FwHandle> {
        match self.props.get(name)? {
            Prop::Phandles(list) => list.get(index).copied(),
            _ => None,
        }
    }

    fn irq_by_name(&self, name: &str) -> Option<IrqLine> {
        let &(_, irq) = self.irqs.iter().find(|(n, _)| n == name)?;
        // SAFETY: test-only line numbers, nothing is claimed.
        Some(unsafe { IrqLine::new(irq) })
    }

    fn irq(&self, index: usize) -> Option<IrqLine> {
        let &(_, irq) = self.irqs.get(index)?;
        // SAFETY: as above.
        Some(unsafe { IrqLine::new(irq) })
    }

    fn child_count(&self) -> usize {
        self.children.len()
    }

    fn child(&self, index: usize) -> Option<&dyn FwNode> {
        self.children.get(index).map(|c| c as &dyn FwNode)
    }
}
