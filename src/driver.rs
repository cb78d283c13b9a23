//! Hardware binding of the megacode transmitter.
//!
//! This module provides [`Remote`], which owns the status LED and RF
//! transmit pins, the one-shot timer and the transmission [`Engine`]. Events
//! coming from the button and the timer are fed to the engine and the
//! resulting effects are applied to the hardware, in order.
//!
//! ## Example
//!
//! ```rust
//! # use embedded_hal_mock::eh1::digital::{Mock as Pin, State as PinState, Transaction as PinTransaction};
//! use megacode::consts::DEFAULT_CODE_STORE;
//! use megacode::driver::Remote;
//! use megacode::events::Event;
//! use megacode::store::SliceStore;
//! use megacode::timer::SoftTimer;
//!
//! # let led = Pin::new(&[
//! #     PinTransaction::set(PinState::Low),
//! #     PinTransaction::set(PinState::High),
//! # ]);
//! # let rf = Pin::new(&[PinTransaction::set(PinState::Low), PinTransaction::set(PinState::Low)]);
//! let mut remote = Remote::new(led, rf, SliceStore::new(&DEFAULT_CODE_STORE), SoftTimer::default());
//! remote.power_on().unwrap();
//!
//! // From the button interrupt:
//! remote.handle(Event::Press).unwrap();
//! assert!(remote.is_transmitting());
//! # let (mut led, mut rf, _, _) = remote.free();
//! # led.done();
//! # rf.done();
//! ```
//!
//! ## Output invariant
//!
//! The LED and the RF line are never asserted together. The engine orders its
//! effects so that one line is always released before the other is driven;
//! [`Outputs`] tracks both levels and checks the invariant in debug builds.

use core::convert::Infallible;

use embedded_hal::digital::OutputPin;

use crate::engine::{Effect, Engine, TxState};
use crate::error::{Error, Result};
use crate::events::{Event, EventQueue};
use crate::store::CodeStore;
use crate::timer::CountdownTimer;

/// The two digital outputs of the transmitter.
#[derive(Debug)]
pub struct Outputs<LED, RF>
where
    LED: OutputPin,
    RF: OutputPin,
{
    /// Status LED pin (high = lit)
    pub led: LED,
    /// RF transmit pin (high = carrier on)
    pub rf: RF,
    led_on: bool,
    rf_on: bool,
}

impl<LED, RF> Outputs<LED, RF>
where
    LED: OutputPin,
    RF: OutputPin,
{
    /// Wraps the pins. Nothing is written until the first command.
    pub fn new(led: LED, rf: RF) -> Self {
        Self {
            led,
            rf,
            led_on: false,
            rf_on: false,
        }
    }

    /// Drives the status LED.
    pub fn set_led(&mut self, on: bool) -> Result<()> {
        if on {
            self.led.set_high().map_err(|_| Error::Led)?;
        } else {
            self.led.set_low().map_err(|_| Error::Led)?;
        }
        self.led_on = on;
        debug_assert!(!(self.led_on && self.rf_on));
        Ok(())
    }

    /// Drives the RF transmit line.
    pub fn set_rf(&mut self, on: bool) -> Result<()> {
        if on {
            self.rf.set_high().map_err(|_| Error::Rf)?;
        } else {
            self.rf.set_low().map_err(|_| Error::Rf)?;
        }
        self.rf_on = on;
        debug_assert!(!(self.led_on && self.rf_on));
        Ok(())
    }

    /// Releases both lines, RF first.
    pub fn all_off(&mut self) -> Result<()> {
        self.set_rf(false)?;
        self.set_led(false)
    }

    /// Last level written to the LED.
    pub fn led_is_on(&self) -> bool {
        self.led_on
    }

    /// Last level written to the RF line.
    pub fn rf_is_on(&self) -> bool {
        self.rf_on
    }
}

/// A megacode remote: engine, outputs and timer bound together.
///
/// ## Type Parameters
///
/// - `LED`: output pin of the status LED
/// - `RF`: output pin keying the RF transmitter
/// - `S`: the [`CodeStore`] holding the megacode
/// - `T`: the one-shot [`CountdownTimer`]
///
/// ## Notes
///
/// - Call [`power_on`](Remote::power_on) once before enabling interrupts. If
///   it fails the LED stays lit and interrupts must stay disabled.
/// - Every event must be delivered through [`handle`](Remote::handle) (or
///   [`dispatch`](Remote::dispatch)), one at a time.
#[derive(Debug)]
pub struct Remote<LED, RF, S, T>
where
    LED: OutputPin,
    RF: OutputPin,
    S: CodeStore,
    T: CountdownTimer,
{
    engine: Engine<S>,
    outputs: Outputs<LED, RF>,
    timer: T,
}

impl<LED, RF, S, T> Remote<LED, RF, S, T>
where
    LED: OutputPin,
    RF: OutputPin,
    S: CodeStore,
    T: CountdownTimer,
{
    /// Creates a remote. The code store is checked here, once.
    pub fn new(led: LED, rf: RF, store: S, timer: T) -> Self {
        Self {
            engine: Engine::new(store),
            outputs: Outputs::new(led, rf),
            timer,
        }
    }

    /// Puts the outputs in their idle state and reports whether a code is
    /// programmed.
    ///
    /// # Errors
    /// - [`Error::NotProgrammed`]: the LED has been lit as the fault
    ///   indicator. The caller must not enable interrupts; the device stays
    ///   inert until reprogrammed and power-cycled.
    /// - [`Error::Led`]/[`Error::Rf`]: a pin could not be driven.
    pub fn power_on(&mut self) -> Result<()> {
        self.timer.disarm();
        self.outputs.all_off()?;
        if !self.engine.is_programmed() {
            warn!("megacode: no valid code programmed");
            self.outputs.set_led(true)?;
            return Err(Error::NotProgrammed);
        }
        Ok(())
    }

    /// Feeds one event to the engine and applies its effects.
    ///
    /// A failed pin write skips the remaining pin writes of this event, so
    /// the other line is never driven against a stale level, but the timer
    /// effects are still applied and the engine keeps its schedule. The next
    /// pause phase rewrites both lines.
    ///
    /// # Errors
    /// The first [`Error::Led`]/[`Error::Rf`] raised while applying the effects.
    pub fn handle(&mut self, event: Event) -> Result<()> {
        let mut result = Ok(());
        for effect in self.engine.handle(event) {
            match effect {
                Effect::Led(on) if result.is_ok() => result = self.outputs.set_led(on),
                Effect::Rf(on) if result.is_ok() => result = self.outputs.set_rf(on),
                Effect::Led(_) | Effect::Rf(_) => {}
                Effect::Arm(interval) => self.timer.arm(interval),
                Effect::Disarm => self.timer.disarm(),
            }
        }
        result
    }

    /// Button went down.
    pub fn press(&mut self) -> Result<()> {
        self.handle(Event::Press)
    }

    /// Button came up.
    pub fn release(&mut self) -> Result<()> {
        self.handle(Event::Release)
    }

    /// The timer expired.
    pub fn timer_expired(&mut self) -> Result<()> {
        self.handle(Event::TimerExpired)
    }

    /// Handles every queued event, timer expiries first.
    ///
    /// Returns the number of events handled. On error the failing event is
    /// consumed and the rest stay queued.
    pub fn dispatch<const N: usize>(&mut self, queue: &mut EventQueue<N>) -> Result<usize> {
        let mut handled = 0;
        while let Some(event) = queue.next() {
            self.handle(event)?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Current transmission state.
    pub fn state(&self) -> TxState {
        self.engine.state()
    }

    /// `true` while a frame is in flight or about to be repeated.
    pub fn is_transmitting(&self) -> bool {
        self.engine.is_transmitting()
    }

    /// Returns `WouldBlock` until the remote has stopped transmitting.
    ///
    /// Use with `nb::block!` in hosted code; firmware should sleep instead.
    pub fn wait_idle(&self) -> nb::Result<(), Infallible> {
        if self.engine.is_transmitting() {
            Err(nb::Error::WouldBlock)
        } else {
            Ok(())
        }
    }

    /// The transmission engine.
    pub fn engine(&self) -> &Engine<S> {
        &self.engine
    }

    /// The output pins.
    pub fn outputs(&self) -> &Outputs<LED, RF> {
        &self.outputs
    }

    /// The timer, e.g. to advance a [`SoftTimer`](crate::timer::SoftTimer).
    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// Gives back the parts.
    pub fn free(self) -> (LED, RF, S, T) {
        let Outputs { led, rf, .. } = self.outputs;
        (led, rf, self.engine.free(), self.timer)
    }
}
