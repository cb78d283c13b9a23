//! Timer abstractions and tick scheduling for the transmitter.
//!
//! The engine needs a single one-shot countdown channel: every expiry is
//! followed by the engine arming the next interval, either
//! [`Interval::Short`] (~1 ms) or [`Interval::Long`] (~2 ms). The timer is
//! never free-running.
//!
//! Two timer implementations are provided:
//! - [`OverflowTimer`] (`timer-isr` feature): a 16-bit up-counting hardware
//!   timer whose reload value is written as two 8-bit halves inside a
//!   critical section
//! - [`SoftTimer`]: a software countdown advanced by elapsed time, used by
//!   the polled loop (`delay-loop` feature) and hosted ports
//!
//! and two ways of driving the remote:
//! - `global_*` helpers and the `button_edge!`/`timer_expired!` macros for
//!   interrupt handlers (feature `timer-isr`)
//! - `run_remote_loop`, a blocking loop using `embedded_hal::delay::DelayNs`
//!   (feature `delay-loop`)
//!
//! Reload values for a 16-bit overflow timer counting at `f_cpu / prescaler`:
//!
//! | F_CPU (instr.) | PRESCALER | Interval | Reload   |
//! |----------------|-----------|----------|----------|
//! |          1 MHz |         8 |     1 ms | `0xFF83` |
//! |          1 MHz |         8 |     2 ms | `0xFF06` |
//!
//! The reference hardware uses the hand-tuned [`ReloadPair::REFERENCE`]
//! instead, trimmed by hand against a receiver.

use libm::round;

use crate::consts::{LONG_UNIT_US, SHORT_UNIT_US};

#[cfg(feature = "delay-loop")]
mod delay;
#[cfg_attr(feature = "delay-loop", allow(unused_imports))]
#[cfg(feature = "delay-loop")]
pub use delay::*;

#[cfg(feature = "timer-isr")]
mod overflow;
#[cfg(feature = "timer-isr")]
pub use overflow::*;

#[cfg(feature = "timer-isr")]
mod isr;
#[cfg_attr(feature = "timer-isr", allow(unused_imports))]
#[cfg(feature = "timer-isr")]
pub use isr::*;

#[cfg(feature = "timer-isr")]
mod macros;
#[cfg_attr(feature = "timer-isr", allow(unused_imports))]
#[cfg(feature = "timer-isr")]
pub use macros::*;

/// The two phase durations of the megacode protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Interval {
    /// One unit: pulse windows and the frame boundary slot.
    Short,
    /// Two units: pauses and the blank sync bit.
    Long,
}

impl Interval {
    /// Length in protocol units.
    pub const fn units(self) -> u16 {
        match self {
            Interval::Short => 1,
            Interval::Long => 2,
        }
    }
}

/// Microseconds per interval. Ports calibrate these against their clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct TimerTuning {
    /// Duration of [`Interval::Short`] in µs.
    pub short_us: u32,
    /// Duration of [`Interval::Long`] in µs.
    pub long_us: u32,
}

impl TimerTuning {
    /// The nominal 1 ms / 2 ms timing.
    pub const REFERENCE: Self = Self {
        short_us: SHORT_UNIT_US,
        long_us: LONG_UNIT_US,
    };

    /// Duration of `interval` in µs.
    pub const fn micros(&self, interval: Interval) -> u32 {
        match interval {
            Interval::Short => self.short_us,
            Interval::Long => self.long_us,
        }
    }
}

impl Default for TimerTuning {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// A one-shot countdown channel.
///
/// After [`arm`](CountdownTimer::arm) the timer fires exactly once and then
/// stays stopped until armed again.
pub trait CountdownTimer {
    /// Starts (or restarts) the countdown for `interval`.
    fn arm(&mut self, interval: Interval);

    /// Stops the countdown; no expiry will be raised until the next `arm`.
    fn disarm(&mut self);
}

/// Reload values for a 16-bit overflow timer, one per interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct ReloadPair {
    /// Reload value producing [`Interval::Short`].
    pub short: u16,
    /// Reload value producing [`Interval::Long`].
    pub long: u16,
}

impl ReloadPair {
    /// Hand-tuned values of the reference transmitter (1 MHz instruction
    /// clock, prescaler 8).
    pub const REFERENCE: Self = Self {
        short: 0xff6e,
        long: 0xff22,
    };

    /// Computes both reload values at compile time from a tuning.
    pub const fn from_tuning(f_cpu: u32, prescaler: u32, tuning: TimerTuning) -> Self {
        Self {
            short: const_reload_value(f_cpu, prescaler, tuning.short_us),
            long: const_reload_value(f_cpu, prescaler, tuning.long_us),
        }
    }

    /// Reload value for `interval`.
    pub const fn get(&self, interval: Interval) -> u16 {
        match interval {
            Interval::Short => self.short,
            Interval::Long => self.long,
        }
    }
}

impl Default for ReloadPair {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// Computes the reload value of a 16-bit up-counting overflow timer.
///
/// # Arguments
/// - `f_cpu`: timer input clock in Hz (before the prescaler)
/// - `prescaler`: timer prescaler (e.g., 1, 2, 4, 8)
/// - `interval_us`: desired time to overflow in microseconds
///
/// # Returns
/// - The value to load so the counter overflows after `interval_us`
///   (rounded to the nearest count). Intervals too long for 16 bits return 0.
pub fn compute_reload_value(f_cpu: u32, prescaler: u32, interval_us: f32) -> u16 {
    let counts_per_second = f_cpu as f64 / prescaler as f64;
    let counts = round(counts_per_second * (interval_us as f64) / 1_000_000.0);
    if counts >= 65_536.0 {
        return 0;
    }
    (65_536.0 - counts) as u16
}

/// Compile-time reload value calculator.
///
/// Same as [`compute_reload_value`] with an integer interval; the count is
/// truncated.
pub const fn const_reload_value(f_cpu: u32, prescaler: u32, interval_us: u32) -> u16 {
    let counts = (f_cpu / prescaler) as u64 * interval_us as u64 / 1_000_000;
    if counts >= 65_536 {
        return 0;
    }
    (65_536 - counts) as u16
}

/// A software countdown timer.
///
/// `advance` is called with the time elapsed since the previous call; it
/// reports the expiry once and then stays disarmed. Time elapsed past the
/// expiry is deducted from the next `arm`, so a polling period that does not
/// divide the intervals evenly jitters each phase without drifting the frame.
#[derive(Debug, Clone)]
pub struct SoftTimer {
    tuning: TimerTuning,
    armed: Option<Interval>,
    remaining_us: u32,
    overshoot_us: u32,
}

impl SoftTimer {
    /// Creates a disarmed timer.
    pub const fn new(tuning: TimerTuning) -> Self {
        Self {
            tuning,
            armed: None,
            remaining_us: 0,
            overshoot_us: 0,
        }
    }

    /// The interval currently counting down, if any.
    pub fn armed(&self) -> Option<Interval> {
        self.armed
    }

    /// Microseconds left before the pending expiry.
    pub fn remaining_us(&self) -> u32 {
        self.remaining_us
    }

    /// Moves the countdown forward by `elapsed_us`.
    ///
    /// Returns `true` when the countdown expired during this step.
    pub fn advance(&mut self, elapsed_us: u32) -> bool {
        if self.armed.is_none() {
            return false;
        }
        if elapsed_us >= self.remaining_us {
            self.overshoot_us = elapsed_us - self.remaining_us;
            self.remaining_us = 0;
            self.armed = None;
            return true;
        }
        self.remaining_us -= elapsed_us;
        false
    }

    /// Time that ran past the last expiry, still owed by the next interval.
    pub fn overshoot_us(&self) -> u32 {
        self.overshoot_us
    }
}

impl Default for SoftTimer {
    fn default() -> Self {
        Self::new(TimerTuning::REFERENCE)
    }
}

impl CountdownTimer for SoftTimer {
    fn arm(&mut self, interval: Interval) {
        self.armed = Some(interval);
        self.remaining_us = self
            .tuning
            .micros(interval)
            .saturating_sub(core::mem::take(&mut self.overshoot_us));
    }

    fn disarm(&mut self) {
        self.armed = None;
        self.remaining_us = 0;
        self.overshoot_us = 0;
    }
}
