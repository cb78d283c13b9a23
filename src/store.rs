//! Persistent megacode storage.
//!
//! The code store is a small read-only byte table (EEPROM or flash on real
//! hardware) holding one or more 3-byte megacodes, most significant byte
//! first, terminated by a single `0x00` byte:
//!
//! ```text
//! [0xC9, 0x17, 0xC2, 0x00]   one code, value 0xC917C2
//! ```
//!
//! Every valid megacode has bit 23 set, so a store whose first byte lacks the
//! high bit is treated as "not programmed".
//!
//! Only the first code is ever transmitted. [`CodeStore::codes`] walks the
//! whole layout for provisioning checks.

use crate::consts::{CODE_LEN, CODE_MASK, STORE_TERMINATOR, VALID_MARKER};

/// Read-only access to the persisted code table.
///
/// Implement this for the EEPROM or flash region of the target. No bounds
/// checking is expected beyond the protocol's own addressing: the engine only
/// reads offsets `0..=2`.
pub trait CodeStore {
    /// Reads the byte at `offset`.
    fn read(&mut self, offset: u8) -> u8;

    /// Returns `true` when the first stored code carries the valid marker.
    fn is_programmed(&mut self) -> bool {
        self.read(0) & VALID_MARKER != 0
    }

    /// Returns the code that is transmitted, if one is programmed.
    fn first_code(&mut self) -> Option<Megacode> {
        Megacode::from_bytes([self.read(0), self.read(1), self.read(2)])
    }

    /// Iterates over the megacodes stored in the table.
    fn codes(&mut self) -> Codes<'_, Self>
    where
        Self: Sized,
    {
        Codes {
            store: self,
            offset: 0,
        }
    }
}

/// A code store backed by a byte slice, e.g. a `static` table placed in
/// flash by the linker.
///
/// Reads past the end of the slice return the terminator byte.
#[derive(Debug, Clone, Copy)]
pub struct SliceStore<'a> {
    bytes: &'a [u8],
}

impl<'a> SliceStore<'a> {
    /// Wraps `bytes` as a code store.
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// The raw table.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

impl CodeStore for SliceStore<'_> {
    fn read(&mut self, offset: u8) -> u8 {
        self.bytes
            .get(usize::from(offset))
            .copied()
            .unwrap_or(STORE_TERMINATOR)
    }
}

/// A 24-bit megacode.
///
/// The high bit of the value (bit 23) is always set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Megacode(u32);

impl Megacode {
    /// Creates a megacode from its numeric value.
    ///
    /// Returns `None` if the value does not fit in 24 bits or lacks bit 23.
    pub const fn new(value: u32) -> Option<Self> {
        if value & !CODE_MASK != 0 || value & ((VALID_MARKER as u32) << 16) == 0 {
            return None;
        }
        Some(Self(value))
    }

    /// Creates a megacode from its stored big-endian bytes.
    pub const fn from_bytes(bytes: [u8; 3]) -> Option<Self> {
        Self::new(((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | bytes[2] as u32)
    }

    /// The numeric value.
    pub const fn value(self) -> u32 {
        self.0
    }

    /// The stored big-endian representation.
    pub const fn to_bytes(self) -> [u8; 3] {
        [(self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8]
    }

    /// Value of the bit transmitted at position `bit` (0 is sent first).
    ///
    /// Bit 0 of the frame is bit 23 of the value.
    pub fn bit(self, bit: u8) -> bool {
        let byte = self.to_bytes()[usize::from(bit / 8)];
        crate::encoding::bit_value(byte, bit)
    }
}

/// Iterator over the megacodes of a [`CodeStore`].
///
/// Stops at the terminator, at an entry without the valid marker and at an
/// entry truncated by the end of the 8-bit address space.
#[derive(Debug)]
pub struct Codes<'s, S> {
    store: &'s mut S,
    offset: u16,
}

impl<S: CodeStore> Iterator for Codes<'_, S> {
    type Item = Megacode;

    fn next(&mut self) -> Option<Megacode> {
        let last = self.offset + u16::from(CODE_LEN) - 1;
        if last > u16::from(u8::MAX) {
            return None;
        }
        let base = self.offset as u8;
        let first = self.store.read(base);
        if first == STORE_TERMINATOR {
            return None;
        }
        let code =
            Megacode::from_bytes([first, self.store.read(base + 1), self.store.read(base + 2)])?;
        self.offset += u16::from(CODE_LEN);
        Some(code)
    }
}
