//! String table entries.
//!
//! Each string gets a 4-byte compact entry. Strings whose offset or length do
//! not fit are spilled into an overflow side table of full-width entries and
//! the compact entry stores the side-table index instead.

use super::record::{Record, read_u32_le};

const OFFSET_BITS: u32 = 23;
const LENGTH_BITS: u32 = 8;
const MAX_SMALL_OFFSET: u32 = (1 << OFFSET_BITS) - 1;

/// Length value marking a compact entry as overflowed.
const OVERFLOW_LENGTH: u32 = (1 << LENGTH_BITS) - 1;

/// A string descriptor: a range into string storage.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct StringTableEntry {
    pub offset: u32,
    pub length: u32,
    pub is_utf16: bool,
}

impl StringTableEntry {
    pub fn new(offset: u32, length: u32, is_utf16: bool) -> Self {
        Self {
            offset,
            length,
            is_utf16,
        }
    }

    /// Storage byte range (UTF-16 strings use two bytes per unit).
    pub fn byte_range(&self) -> std::ops::Range<usize> {
        let start = self.offset as usize;
        let units = self.length as usize;
        let len = if self.is_utf16 { units * 2 } else { units };
        start..start + len
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let length = read_u32_le(bytes, 4);
        Self {
            offset: read_u32_le(bytes, 0),
            length: length & 0x7FFF_FFFF,
            is_utf16: length & 0x8000_0000 != 0,
        }
    }
}

/// Full-width encoding, used by the debug info filename table.
///
/// Bit 31 of the length word is the UTF-16 flag.
impl Record for StringTableEntry {
    const SIZE: usize = 8;

    fn encode(&self, out: &mut Vec<u8>) {
        let length = self.length | if self.is_utf16 { 0x8000_0000 } else { 0 };
        out.extend_from_slice(&self.offset.to_le_bytes());
        out.extend_from_slice(&length.to_le_bytes());
    }
}

/// Compact string table entry (4 bytes): `is_utf16:1 | offset:23 | length:8`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SmallStringTableEntry {
    pub is_utf16: bool,
    /// Storage offset, or the overflow side-table index when overflowed.
    pub offset: u32,
    pub length: u32,
}

impl SmallStringTableEntry {
    /// Largest overflow side-table index a compact entry can refer to.
    pub const MAX_OVERFLOW_INDEX: usize = MAX_SMALL_OFFSET as usize;

    /// Whether `entry` is representable without the overflow side table.
    pub fn fits(entry: &StringTableEntry) -> bool {
        entry.offset <= MAX_SMALL_OFFSET && entry.length < OVERFLOW_LENGTH
    }

    /// Build the compact entry for `entry`.
    ///
    /// `overflow_index` is the index the entry would take in the overflow
    /// side table if it does not fit.
    ///
    /// # Panics
    /// If the entry overflows and `overflow_index` exceeds
    /// [`Self::MAX_OVERFLOW_INDEX`].
    pub fn new(entry: &StringTableEntry, overflow_index: usize) -> Self {
        if Self::fits(entry) {
            return Self {
                is_utf16: entry.is_utf16,
                offset: entry.offset,
                length: entry.length,
            };
        }

        assert!(
            overflow_index <= Self::MAX_OVERFLOW_INDEX,
            "overflow string index {overflow_index} exceeds compact offset field"
        );
        Self {
            is_utf16: entry.is_utf16,
            offset: overflow_index as u32,
            length: OVERFLOW_LENGTH,
        }
    }

    pub fn is_overflowed(&self) -> bool {
        self.length == OVERFLOW_LENGTH
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let word = read_u32_le(bytes, 0);
        Self {
            is_utf16: word & 1 != 0,
            offset: (word >> 1) & MAX_SMALL_OFFSET,
            length: word >> (1 + OFFSET_BITS),
        }
    }

    pub fn to_bytes(&self) -> [u8; 4] {
        let word = (self.is_utf16 as u32)
            | ((self.offset & MAX_SMALL_OFFSET) << 1)
            | (self.length << (1 + OFFSET_BITS));
        word.to_le_bytes()
    }
}

impl Record for SmallStringTableEntry {
    const SIZE: usize = 4;

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_bytes());
    }
}

/// Overflow side-table entry (8 bytes): full-width offset and length.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct OverflowStringTableEntry {
    pub offset: u32,
    pub length: u32,
}

impl OverflowStringTableEntry {
    pub fn new(offset: u32, length: u32) -> Self {
        Self { offset, length }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            offset: read_u32_le(bytes, 0),
            length: read_u32_le(bytes, 4),
        }
    }
}

impl Record for OverflowStringTableEntry {
    const SIZE: usize = 8;

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.offset.to_le_bytes());
        out.extend_from_slice(&self.length.to_le_bytes());
    }
}
