//! # megacode
//!
//! A portable, no_std firmware core for fixed-code "megacode" RF remote
//! transmitters: one button, one status LED, one RF transmit line.
//!
//! Holding the button sends a 24-bit code from the code store over the RF
//! line with a fixed-timing pulse-position encoding, frame after frame. On
//! release the current 25-bit frame is completed before the transmitter stops.
//!
//! This crate provides:
//! - a pure transmission [`engine`] mapping button/timer events to output effects
//! - `embedded-hal` bindings for the LED, RF and button pins ([`driver`], [`input`])
//! - one-shot timer abstractions and interrupt glue using `critical-section` ([`timer`])
//! - idle power handling ([`power`])
//!
//! ## Crate features
//! | Feature               | Description |
//! |-----------------------|-------------|
//! | `std`                 | Disables `#![no_std]` |
//! | `delay-loop`          | Polled loop driven by `embedded_hal::delay::DelayNs` |
//! | `timer-isr` (default) | Global remote behind `critical_section::Mutex`, ISR helpers, `OverflowTimer` |
//! | `defmt-0-3`           | Uses `defmt` logging |
//! | `log`                 | Uses `log` logging |
//!
//! ## Protocol
//!
//! - Each bit is four phases: 2-unit pause, 1-unit window A, 2-unit pause, 1-unit window B
//! - A `0` pulses RF in window A, a `1` in window B; the LED is lit otherwise
//! - A 2-unit blank closes the 146-unit frame, followed by a 1-unit boundary slot
//! - One unit is ~1 ms
//!
//! See [`encoding`] for the details.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use megacode::driver::Remote;
//! use megacode::store::SliceStore;
//!
//! static EEPROM: [u8; 4] = megacode::consts::DEFAULT_CODE_STORE;
//!
//! megacode::init_remote!(LedPin, RfPin, SliceStore<'static>, OverflowTimer<Timer1>);
//!
//! fn main() -> ! {
//!     if megacode::setup_remote!(led, rf, SliceStore::new(&EEPROM), timer).is_ok() {
//!         unsafe { enable_interrupts() };
//!     }
//!     megacode::timer::run_idle_loop(&REMOTE, &mut power)
//! }
//!
//! #[interrupt]
//! fn TIM1_OVF() {
//!     megacode::timer_expired!();
//! }
//!
//! #[interrupt]
//! fn PCINT0() {
//!     megacode::button_edge!(button.is_low().unwrap_or(false));
//! }
//! ```
//!
//! ## Integration Notes
//!
//! - Call the power-on check before enabling interrupts; if no valid code is
//!   programmed the LED stays lit and the device stays inert
//! - The button has no software debounce; contact bounce is absorbed by the
//!   state machine
//! - Timer expiries are handled before button edges when both are pending
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "timer-isr")]
pub use critical_section;

pub use heapless;

#[macro_use]
mod fmt;

pub mod consts;
pub mod driver;
pub mod encoding;
pub mod engine;
pub mod error;
pub mod events;
pub mod input;
pub mod power;
pub mod store;
pub mod timer;
