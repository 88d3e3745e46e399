//! Compile-time assertions for register layouts and encodings.

/// Asserts a condition at compile time.
///
/// # Examples
///
/// ```ignore
/// use lynx_core::static_assert;
/// static_assert!(0x2d & 0x3f == 0x2d);
/// static_assert!(1 << 30 != 0, "clause 45 flag must fit in u32");
/// ```
#[macro_export]
macro_rules! static_assert {
    ($cond:expr $(,)?) => {
        const _: () = assert!($cond);
    };
    ($cond:expr, $msg:expr $(,)?) => {
        const _: () = assert!($cond, $msg);
    };
}
