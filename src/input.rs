//! Button edge detection.
//!
//! The button is active low (pulled up, shorted to ground when pressed).
//! [`ButtonMonitor`] turns level samples into exactly one event per level
//! change. There is no software debounce: a bouncing contact produces a burst
//! of press/release events, which the engine absorbs because repeated presses
//! and releases are idempotent.

use embedded_hal::digital::InputPin;

use crate::error::{Error, Result};
use crate::events::Event;

/// Edge detector over the button input.
#[derive(Debug)]
pub struct ButtonMonitor<P: InputPin> {
    /// Button pin
    pub pin: P,
    pressed: bool,
}

impl<P: InputPin> ButtonMonitor<P> {
    /// Wraps `pin`. The button is assumed released at power-on.
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            pressed: false,
        }
    }

    /// Last sampled state.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Samples the pin and reports the edge, if the level changed since the
    /// previous sample.
    ///
    /// Call this from the pin-change interrupt (which fires on both edges)
    /// or periodically from a polled loop.
    pub fn sample(&mut self) -> Result<Option<Event>> {
        let pressed = self.pin.is_low().map_err(|_| Error::Input)?;
        if pressed == self.pressed {
            return Ok(None);
        }
        self.pressed = pressed;
        Ok(Some(if pressed { Event::Press } else { Event::Release }))
    }
}
