// SPDX-FileCopyrightText: © 2024 Foundation Devices, Inc. <hello@foundation.xyz>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Logging and assertion macros.
//!
//! Forwards to [`log`] or [`defmt`] depending on the enabled features, and
//! compiles to nothing when neither is enabled.

#![macro_use]
#![allow(unused_macros)]

#[cfg(all(feature = "defmt-03", feature = "log"))]
compile_error!("You may not enable both `defmt` and `log` features.");

macro_rules! debug_assert {
    ($($x:tt)*) => {
        {
            #[cfg(not(feature = "defmt-03"))]
            ::core::debug_assert!($($x)*);
            #[cfg(feature = "defmt-03")]
            ::defmt::debug_assert!($($x)*);
        }
    };
}

macro_rules! panic {
    ($($x:tt)*) => {
        {
            #[cfg(not(feature = "defmt-03"))]
            ::core::panic!($($x)*);
            #[cfg(feature = "defmt-03")]
            ::defmt::panic!($($x)*);
        }
    };
}

/// Emit an event at `$level` through whichever backend is enabled.
macro_rules! log_at {
    ($level:ident, $s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "log")]
            ::log::$level!($s $(, $x)*);
            #[cfg(feature = "defmt-03")]
            ::defmt::$level!($s $(, $x)*);
            #[cfg(not(any(feature = "log", feature = "defmt-03")))]
            let _ = ($( & $x ),*);
        }
    };
}

macro_rules! trace {
    ($($x:tt)*) => {
        log_at!(trace, $($x)*)
    };
}

macro_rules! debug {
    ($($x:tt)*) => {
        log_at!(debug, $($x)*)
    };
}

macro_rules! warn {
    ($($x:tt)*) => {
        log_at!(warn, $($x)*)
    };
}
