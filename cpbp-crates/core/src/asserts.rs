//! Assertions which are only checked when their cost is acceptable.
//!
//! - [`CPBP_ASSERT_SIMPLE`] guards the contract of the public API: beliefs lie in `[zero, one]`,
//!   beliefs are only set for values in the domain and domains are never created empty. These are
//!   always checked.
//! - [`CPBP_ASSERT_MODERATE`] verifies the bookkeeping of the engine, such as the message slots
//!   and the propagator queue. Checked in tests.
//! - [`CPBP_ASSERT_ADVANCED`] rechecks every belief of a domain after it was normalised. Checked
//!   only with the `debug-checks` feature.

pub const CPBP_ASSERT_SIMPLE: u8 = 1;
pub const CPBP_ASSERT_MODERATE: u8 = 2;
pub const CPBP_ASSERT_ADVANCED: u8 = 3;

#[cfg(all(not(test), not(feature = "debug-checks")))]
pub const CPBP_ASSERT_LEVEL_DEFINITION: u8 = CPBP_ASSERT_SIMPLE;

#[cfg(all(test, not(feature = "debug-checks")))]
pub const CPBP_ASSERT_LEVEL_DEFINITION: u8 = CPBP_ASSERT_MODERATE;

#[cfg(feature = "debug-checks")]
pub const CPBP_ASSERT_LEVEL_DEFINITION: u8 = CPBP_ASSERT_ADVANCED;

/// Runs `$check` when the configured level is at least `$level`.
#[macro_export]
#[doc(hidden)]
macro_rules! cpbp_check_at_level {
    ($level:ident, $check:ident!($($arg:tt)*)) => {
        if $crate::asserts::CPBP_ASSERT_LEVEL_DEFINITION >= $crate::asserts::$level {
            $check!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! cpbp_assert_simple {
    ($($arg:tt)*) => {
        $crate::cpbp_check_at_level!(CPBP_ASSERT_SIMPLE, assert!($($arg)*))
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! cpbp_assert_eq_simple {
    ($($arg:tt)*) => {
        $crate::cpbp_check_at_level!(CPBP_ASSERT_SIMPLE, assert_eq!($($arg)*))
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! cpbp_assert_moderate {
    ($($arg:tt)*) => {
        $crate::cpbp_check_at_level!(CPBP_ASSERT_MODERATE, assert!($($arg)*))
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! cpbp_assert_advanced {
    ($($arg:tt)*) => {
        $crate::cpbp_check_at_level!(CPBP_ASSERT_ADVANCED, assert!($($arg)*))
    };
}
