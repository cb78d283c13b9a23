//! Error type shared by the remote, the input monitor and the event queue.

use thiserror::Error;

/// Failures reported by the transmitter.
///
/// Only [`Error::NotProgrammed`] is a protocol level fault. The remaining
/// variants wrap `embedded-hal` pin failures, which the HAL reports with its
/// own error types; the remote collapses them into the line that failed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Error {
    /// The first byte of the code store does not carry the valid marker.
    ///
    /// The status LED is lit permanently and no transmission will ever start.
    #[error("no valid megacode is programmed")]
    NotProgrammed,
    /// Driving the status LED failed.
    #[error("status LED output failed")]
    Led,
    /// Driving the RF transmit line failed.
    #[error("RF transmit output failed")]
    Rf,
    /// Sampling the button failed.
    #[error("button input could not be read")]
    Input,
    /// The bounded event queue had no room for another event.
    #[error("event queue is full")]
    QueueFull,
}

/// Result type used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
