//! Constants used across the megacode protocol implementation.
//!
//! This module defines the frame geometry, the code store layout and the
//! reference timing of the megacode pulse-position encoding.
//!
//! ## Key Concepts
//!
//! - **Phases**: every bit is sent as four phases (pause, window A, pause, window B).
//! - **Frame**: 24 code bits followed by one blank sync bit.
//! - **Units**: odd phases last one unit, even phases two. One unit is ~1 ms.
//! - **Code store**: 3-byte big-endian megacodes, terminated by `0x00`.
//!
//! These values should be used wherever framing or timing logic is implemented
//! to keep transmitters and receivers in agreement.

/// Number of phases used to encode one bit.
pub const PHASES_PER_BIT: u8 = 4;

/// Number of data bits in a megacode.
pub const CODE_BITS: u8 = 24;

/// Number of bits in a frame (24 code bits plus the blank sync bit).
pub const FRAME_BITS: u8 = CODE_BITS + 1;

/// Phase index of the blank sync bit that closes every frame.
pub const BLANK_PHASE: u8 = CODE_BITS * PHASES_PER_BIT;

/// Phase index of the frame boundary slot following the blank.
///
/// During this slot the engine decides whether the next frame starts or the
/// transmission stops.
pub const BOUNDARY_PHASE: u8 = BLANK_PHASE + 1;

/// Total duration of one frame (phase 0 through the end of the blank) in units.
///
/// Each code bit takes `2 + 1 + 2 + 1` units, the blank takes 2.
pub const FRAME_UNITS: u16 = CODE_BITS as u16 * 6 + 2;

/// Length of the frame boundary slot in units.
pub const BOUNDARY_UNITS: u16 = 1;

/// Number of bytes in one stored megacode.
pub const CODE_LEN: u8 = 3;

/// Marks the end of the code store.
pub const STORE_TERMINATOR: u8 = 0x00;

/// High bit of the first byte of every valid megacode.
pub const VALID_MARKER: u8 = 0x80;

/// Largest value a 24-bit megacode can hold.
pub const CODE_MASK: u32 = 0x00ff_ffff;

/// The factory default code store: one code, `0xC917C2`.
pub const DEFAULT_CODE_STORE: [u8; 4] = [0xc9, 0x17, 0xc2, STORE_TERMINATOR];

/// Duration of a short interval (pulse windows, boundary slot) in microseconds.
pub const SHORT_UNIT_US: u32 = 1_000;

/// Duration of a long interval (pauses, blank) in microseconds.
pub const LONG_UNIT_US: u32 = 2_000;
