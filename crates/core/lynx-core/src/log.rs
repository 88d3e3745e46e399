//! Logging interface for the Lynx drivers.
//!
//! Drivers emit leveled messages through [`klog!`] and the convenience
//! macros (`kerr!`, `kwarn!`, `kinfo!`, `kdebug!`, `ktrace!`). The host
//! kernel installs a sink with [`set_log_fn`]; until then output is silently
//! discarded. [`dev_err!`] and friends prefix the message with a device name
//! the way the host's device logging does.

use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};

// ---------------------------------------------------------------------------
// Log levels (lower is more severe)
// ---------------------------------------------------------------------------

/// Driver log severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    /// Error: something failed but the system may continue.
    Error = 1,
    /// Warning: unexpected condition, not necessarily an error.
    Warn = 2,
    /// Informational: high-level progress messages.
    Info = 3,
    /// Debug: detailed diagnostic information.
    Debug = 4,
    /// Trace: very verbose, low-level tracing.
    Trace = 5,
}

impl LogLevel {
    /// Returns the human-readable name (fixed-width for aligned output).
    pub const fn name(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN ",
            Self::Info => "INFO ",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }
}

// ---------------------------------------------------------------------------
// Leveled log function (klog! and convenience macros)
// ---------------------------------------------------------------------------

/// The signature of the global leveled log function.
pub type LogFn = fn(LogLevel, fmt::Arguments<'_>);

/// Address of the installed [`LogFn`], or 0 when no sink is installed.
static LOG_FN: AtomicUsize = AtomicUsize::new(0);

/// Registers the global leveled log function.
///
/// May be called more than once; the last sink wins. Uses `Release`
/// ordering so subsequent loads see the new function.
pub fn set_log_fn(f: LogFn) {
    LOG_FN.store(f as usize, Ordering::Release);
}

/// Removes the installed sink, discarding all further output.
pub fn clear_log_fn() {
    LOG_FN.store(0, Ordering::Release);
}

/// Loads the current log function, if one is installed.
#[inline]
fn load_log_fn() -> Option<LogFn> {
    let raw = LOG_FN.load(Ordering::Acquire);
    if raw == 0 {
        return None;
    }
    // SAFETY: Only `set_log_fn` stores non-zero values, and it only stores
    // addresses of valid `LogFn` function pointers.
    Some(unsafe { core::mem::transmute::<usize, LogFn>(raw) })
}

/// Implementation detail for [`klog!`]. Not public API.
#[doc(hidden)]
pub fn _log(level: LogLevel, args: fmt::Arguments<'_>) {
    if let Some(f) = load_log_fn() {
        f(level, args);
    }
}

/// Logs a message at the given level.
#[macro_export]
macro_rules! klog {
    ($level:expr, $($arg:tt)*) => {
        $crate::log::_log($level, format_args!($($arg)*))
    };
}

/// Logs an error-level message (level 1).
#[macro_export]
macro_rules! kerr {
    ($($arg:tt)*) => { $crate::klog!($crate::log::LogLevel::Error, $($arg)*) };
}

/// Logs a warning-level message (level 2).
#[macro_export]
macro_rules! kwarn {
    ($($arg:tt)*) => { $crate::klog!($crate::log::LogLevel::Warn, $($arg)*) };
}

/// Logs an info-level message (level 3).
#[macro_export]
macro_rules! kinfo {
    ($($arg:tt)*) => { $crate::klog!($crate::log::LogLevel::Info, $($arg)*) };
}

/// Logs a debug-level message (level 4).
#[macro_export]
macro_rules! kdebug {
    ($($arg:tt)*) => { $crate::klog!($crate::log::LogLevel::Debug, $($arg)*) };
}

/// Logs a trace-level message (level 5).
#[macro_export]
macro_rules! ktrace {
    ($($arg:tt)*) => { $crate::klog!($crate::log::LogLevel::Trace, $($arg)*) };
}

// ---------------------------------------------------------------------------
// Device-prefixed variants
// ---------------------------------------------------------------------------

/// Logs an error prefixed with a device name: `dev_err!(name, "...")`.
#[macro_export]
macro_rules! dev_err {
    ($dev:expr, $($arg:tt)*) => {
        $crate::kerr!("{}: {}", $dev, format_args!($($arg)*))
    };
}

/// Logs a warning prefixed with a device name.
#[macro_export]
macro_rules! dev_warn {
    ($dev:expr, $($arg:tt)*) => {
        $crate::kwarn!("{}: {}", $dev, format_args!($($arg)*))
    };
}

/// Logs an info message prefixed with a device name.
#[macro_export]
macro_rules! dev_info {
    ($dev:expr, $($arg:tt)*) => {
        $crate::kinfo!("{}: {}", $dev, format_args!($($arg)*))
    };
}

/// Logs a debug message prefixed with a device name.
#[macro_export]
macro_rules! dev_dbg {
    ($dev:expr, $($arg:tt)*) => {
        $crate::kdebug!("{}: {}", $dev, format_args!($($arg)*))
    };
}

// ---------------------------------------------------------------------------
// Test capture sink
// ---------------------------------------------------------------------------

/// Per-thread log capture for host tests.
///
/// Each test thread records into its own buffer, so tests running in
/// parallel never see each other's messages.
#[cfg(any(test, feature = "capture"))]
pub mod capture {
    use std::cell::RefCell;
    use std::string::String;
    use std::vec::Vec;

    use super::LogLevel;

    std::thread_local! {
        static LINES: RefCell<Vec<(LogLevel, String)>> = const { RefCell::new(Vec::new()) };
    }

    fn sink(level: LogLevel, args: core::fmt::Arguments<'_>) {
        LINES.with(|l| l.borrow_mut().push((level, std::format!("{args}"))));
    }

    /// Installs the capture sink and clears this thread's buffer.
    pub fn install() {
        super::set_log_fn(sink);
        LINES.with(|l| l.borrow_mut().clear());
    }

    /// Drains the messages recorded on this thread.
    pub fn take() -> Vec<(LogLevel, String)> {
        LINES.with(|l| core::mem::take(&mut *l.borrow_mut()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Info < LogLevel::Trace);
    }

    #[test]
    fn level_names_fixed_width() {
        for level in [
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ] {
            assert_eq!(level.name().len(), 5);
        }
    }

    #[test]
    fn device_prefix() {
        capture::install();
        dev_err!("pcie@3400000", "link down after {} tries", 3);
        let lines = capture::take();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, LogLevel::Error);
        assert_eq!(lines[0].1, "pcie@3400000: link down after 3 tries");
    }
}
