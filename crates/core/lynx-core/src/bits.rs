//! Bit-manipulation helpers for register encodings.

/// Returns a `u32` mask with bits `low..=high` set.
///
/// # Panics
///
/// Panics (at compile time in const context) if `high < low` or `high > 31`.
pub const fn genmask(high: u32, low: u32) -> u32 {
    assert!(high >= low && high < 32);
    (u32::MAX >> (31 - high)) & (u32::MAX << low)
}

/// Returns a single-bit `u32` mask.
pub const fn bit(n: u32) -> u32 {
    1 << n
}

/// Extracts the field selected by `mask` from `value`, shifted down.
pub const fn field_get(mask: u32, value: u32) -> u32 {
    (value & mask) >> mask.trailing_zeros()
}

/// Shifts `value` into the field selected by `mask`, truncating overflow.
pub const fn field_prep(mask: u32, value: u32) -> u32 {
    (value << mask.trailing_zeros()) & mask
}

/// Rounds `n` up to the next power of two; 0 rounds to 1.
///
/// `None` if the result does not fit in a `u32`.
pub const fn roundup_pow_of_two(n: u32) -> Option<u32> {
    n.checked_next_power_of_two()
}
