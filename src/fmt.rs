//! Crate-internal logging macros.
//!
//! Each macro forwards to `log` (feature `log`) and/or `defmt`
//! (feature `defmt-0-3`). With neither feature enabled the arguments are
//! only borrowed, so logging compiles out entirely.
//!
//! Format strings must stay within the subset both backends accept: plain
//! `{}` placeholders with primitive arguments.

macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(feature = "log")]
        ::log::trace!($s $(, $x)*);
        #[cfg(feature = "defmt-0-3")]
        ::defmt::trace!($s $(, $x)*);
        #[cfg(not(any(feature = "log", feature = "defmt-0-3")))]
        let _ = ($( &$x, )*);
    }};
}

macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(feature = "log")]
        ::log::debug!($s $(, $x)*);
        #[cfg(feature = "defmt-0-3")]
        ::defmt::debug!($s $(, $x)*);
        #[cfg(not(any(feature = "log", feature = "defmt-0-3")))]
        let _ = ($( &$x, )*);
    }};
}

macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(feature = "log")]
        ::log::warn!($s $(, $x)*);
        #[cfg(feature = "defmt-0-3")]
        ::defmt::warn!($s $(, $x)*);
        #[cfg(not(any(feature = "log", feature = "defmt-0-3")))]
        let _ = ($( &$x, )*);
    }};
}
