//! Megacode pulse-position encoding rules.
//!
//! A megacode frame is 25 bits, each split into four phases:
//!
//! | Phase    | Kind     | Length | Outputs                                  |
//! |----------|----------|--------|------------------------------------------|
//! | `4b`     | pause    | 2 u    | RF off, LED on                           |
//! | `4b + 1` | window A | 1 u    | RF pulse if the bit is `0`, else nothing |
//! | `4b + 2` | pause    | 2 u    | RF off, LED on                           |
//! | `4b + 3` | window B | 1 u    | RF pulse if the bit is `1`, else nothing |
//!
//! The 25th bit is not data: a single blank phase (index 96, 2 units, LED on,
//! RF off) acts as the inter-frame sync gap. It is followed by a 1-unit
//! boundary slot in which the engine decides whether another frame follows.
//!
//! During an RF pulse the LED is switched off, so at most one of the two
//! outputs is ever asserted.
//!
//! ## Bit order
//!
//! Bit `b` of the frame is read from stored byte `b / 8` at position
//! `(23 - b) % 8`; the code goes out most significant bit first.
//!
//! ## Receiver side
//!
//! [`decode_pulse_offsets`] reverses the encoding from the start offsets of
//! the 24 RF pulses of one frame.

use crate::consts::{BLANK_PHASE, BOUNDARY_PHASE, CODE_BITS, PHASES_PER_BIT};
use crate::store::Megacode;
use crate::timer::Interval;

/// The role of a phase inside a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum PhaseKind {
    /// Two-unit pause preceding a pulse window. `bit` is the frame bit index.
    Pause {
        /// Frame bit index.
        bit: u8,
    },
    /// First pulse window, carries a pulse when the bit is `0`.
    WindowA {
        /// Frame bit index.
        bit: u8,
    },
    /// Second pulse window, carries a pulse when the bit is `1`.
    WindowB {
        /// Frame bit index.
        bit: u8,
    },
    /// The fixed blank sync bit closing the frame.
    Blank,
    /// The slot after the blank where the next frame is decided.
    Boundary,
}

impl PhaseKind {
    /// Classifies `phase`.
    ///
    /// Phases past [`BOUNDARY_PHASE`] never occur; they are reported as the
    /// boundary so the engine always returns to a frame start.
    pub const fn of(phase: u8) -> Self {
        if phase >= BOUNDARY_PHASE {
            return PhaseKind::Boundary;
        }
        if phase == BLANK_PHASE {
            return PhaseKind::Blank;
        }
        let bit = phase / PHASES_PER_BIT;
        match phase % PHASES_PER_BIT {
            1 => PhaseKind::WindowA { bit },
            3 => PhaseKind::WindowB { bit },
            _ => PhaseKind::Pause { bit },
        }
    }

    /// How long the phase lasts, i.e. the timer interval armed when the
    /// phase is entered.
    pub const fn interval(self) -> Interval {
        match self {
            PhaseKind::Pause { .. } | PhaseKind::Blank => Interval::Long,
            PhaseKind::WindowA { .. } | PhaseKind::WindowB { .. } | PhaseKind::Boundary => {
                Interval::Short
            }
        }
    }

    /// Whether the RF line is pulsed during this phase for a bit of value
    /// `bit_value`.
    pub const fn pulses(self, bit_value: bool) -> bool {
        match self {
            PhaseKind::WindowA { .. } => !bit_value,
            PhaseKind::WindowB { .. } => bit_value,
            _ => false,
        }
    }
}

/// Extracts bit `bit` of the frame from the stored byte that holds it.
pub const fn bit_value(byte: u8, bit: u8) -> bool {
    (byte >> ((CODE_BITS - 1 - bit) % 8)) & 0x01 != 0
}

/// Offset of the RF pulse for frame bit `bit`, in units from the frame start.
pub const fn pulse_offset(bit: u8, bit_value: bool) -> u16 {
    let start = bit as u16 * 6;
    if bit_value { start + 5 } else { start + 2 }
}

/// Recovers a megacode from the start offsets of the 24 RF pulses of a
/// frame, measured in units from the start of phase 0.
///
/// Returns `None` if any pulse sits outside both windows of its bit, or if
/// the result lacks the valid marker.
pub fn decode_pulse_offsets(offsets: &[u16; CODE_BITS as usize]) -> Option<Megacode> {
    let mut value: u32 = 0;
    for (bit, &offset) in offsets.iter().enumerate() {
        let bit = bit as u8;
        let one = if offset == pulse_offset(bit, true) {
            true
        } else if offset == pulse_offset(bit, false) {
            false
        } else {
            return None;
        };
        value = (value << 1) | u32::from(one);
    }
    Megacode::new(value)
}
