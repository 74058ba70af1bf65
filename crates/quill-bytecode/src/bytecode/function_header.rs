//! Function headers: the compact 16-byte table entry and the full 32-byte form.
//!
//! Every function gets a compact entry in the function table. When one of its
//! content fields does not fit the compact bit widths, the compact entry is
//! marked overflowed and the full header is written at the start of the
//! function's info block instead.

use super::record::{Record, read_u32_le};

const OFFSET_BITS: u32 = 25;
const PARAM_COUNT_BITS: u32 = 7;
const BYTECODE_SIZE_BITS: u32 = 15;
const FUNCTION_NAME_BITS: u32 = 17;
const FRAME_SIZE_BITS: u32 = 7;

#[inline]
const fn mask(bits: u32) -> u32 {
    (1 << bits) - 1
}

#[inline]
const fn fits(value: u32, bits: u32) -> bool {
    value <= mask(bits)
}

/// Per-function flag byte.
///
/// - bits 0-1: prohibit invoke (call / construct restrictions)
/// - bit 2: strict mode
/// - bit 3: has exception handlers
/// - bit 4: has debug info
/// - bit 5: compact header overflowed
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[repr(transparent)]
pub struct FunctionFlags(pub u8);

impl FunctionFlags {
    pub const PROHIBIT_INVOKE_MASK: u8 = 0b0000_0011;
    pub const STRICT_MODE: u8 = 0b0000_0100;
    pub const HAS_EXCEPTION_HANDLER: u8 = 0b0000_1000;
    pub const HAS_DEBUG_INFO: u8 = 0b0001_0000;
    pub const OVERFLOWED: u8 = 0b0010_0000;

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn prohibit_invoke(self) -> u8 {
        self.0 & Self::PROHIBIT_INVOKE_MASK
    }

    pub fn set_prohibit_invoke(&mut self, value: u8) {
        debug_assert!(value <= Self::PROHIBIT_INVOKE_MASK);
        self.0 = (self.0 & !Self::PROHIBIT_INVOKE_MASK) | (value & Self::PROHIBIT_INVOKE_MASK);
    }

    pub fn strict_mode(self) -> bool {
        self.0 & Self::STRICT_MODE != 0
    }

    pub fn set_strict_mode(&mut self, value: bool) {
        self.set(Self::STRICT_MODE, value);
    }

    pub fn has_exception_handler(self) -> bool {
        self.0 & Self::HAS_EXCEPTION_HANDLER != 0
    }

    pub fn set_has_exception_handler(&mut self, value: bool) {
        self.set(Self::HAS_EXCEPTION_HANDLER, value);
    }

    pub fn has_debug_info(self) -> bool {
        self.0 & Self::HAS_DEBUG_INFO != 0
    }

    pub fn set_has_debug_info(&mut self, value: bool) {
        self.set(Self::HAS_DEBUG_INFO, value);
    }

    pub fn overflowed(self) -> bool {
        self.0 & Self::OVERFLOWED != 0
    }

    pub fn set_overflowed(&mut self, value: bool) {
        self.set(Self::OVERFLOWED, value);
    }

    fn set(&mut self, bit: u8, value: bool) {
        if value {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }
}

/// Full-width function header (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct FunctionHeader {
    /// Absolute offset of the function's bytecode.
    pub offset: u32,
    pub param_count: u32,
    pub bytecode_size: u32,
    /// String table index of the function name.
    pub function_name: u32,
    /// Absolute offset of the function's info block.
    pub info_offset: u32,
    /// Register count.
    pub frame_size: u32,
    /// Number of symbols in the function's lexical environment.
    pub environment_size: u32,
    pub highest_read_cache_index: u8,
    pub highest_write_cache_index: u8,
    pub flags: FunctionFlags,
}

impl FunctionHeader {
    /// Decode from 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= Self::SIZE, "function header too short");
        Self {
            offset: read_u32_le(bytes, 0),
            param_count: read_u32_le(bytes, 4),
            bytecode_size: read_u32_le(bytes, 8),
            function_name: read_u32_le(bytes, 12),
            info_offset: read_u32_le(bytes, 16),
            frame_size: read_u32_le(bytes, 20),
            environment_size: read_u32_le(bytes, 24),
            highest_read_cache_index: bytes[28],
            highest_write_cache_index: bytes[29],
            flags: FunctionFlags(bytes[30]),
        }
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        bytes[0..4].copy_from_slice(&self.offset.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.param_count.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.bytecode_size.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.function_name.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.info_offset.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.frame_size.to_le_bytes());
        bytes[24..28].copy_from_slice(&self.environment_size.to_le_bytes());
        bytes[28] = self.highest_read_cache_index;
        bytes[29] = self.highest_write_cache_index;
        bytes[30] = self.flags.bits();
        // byte 31 reserved
        bytes
    }

    /// Whether every content field fits the compact encoding.
    pub fn content_fits_small(&self) -> bool {
        fits(self.param_count, PARAM_COUNT_BITS)
            && fits(self.bytecode_size, BYTECODE_SIZE_BITS)
            && fits(self.function_name, FUNCTION_NAME_BITS)
            && fits(self.frame_size, FRAME_SIZE_BITS)
            && self.environment_size <= u8::MAX as u32
    }

    /// Whether both offsets fit the compact encoding.
    pub fn offsets_fit_small(&self) -> bool {
        fits(self.offset, OFFSET_BITS) && fits(self.info_offset, OFFSET_BITS)
    }

    /// Whether the header needs no full-width copy in the info block.
    ///
    /// Depends on the recorded offsets, so callers decide only once both are
    /// known; both passes then see the same values.
    pub fn fits_small(&self) -> bool {
        self.content_fits_small() && self.offsets_fit_small()
    }
}

impl Record for FunctionHeader {
    const SIZE: usize = 32;

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_bytes());
    }
}

/// Compact function table entry (16 bytes).
///
/// Packed as `offset:25 | param_count:7`, `bytecode_size:15 | function_name:17`,
/// `info_offset:25 | frame_size:7`, then `environment_size`, the two cache
/// indices and the flag byte.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct SmallFuncHeader {
    pub offset: u32,
    pub param_count: u32,
    pub bytecode_size: u32,
    pub function_name: u32,
    pub info_offset: u32,
    pub frame_size: u32,
    pub environment_size: u8,
    pub highest_read_cache_index: u8,
    pub highest_write_cache_index: u8,
    pub flags: FunctionFlags,
}

impl SmallFuncHeader {
    /// Build the compact entry for `header`, overflowed when any field
    /// (content or offset) exceeds its compact width.
    pub fn new(header: &FunctionHeader) -> Self {
        if !header.fits_small() {
            return Self::overflowed(header);
        }

        let mut flags = header.flags;
        flags.set_overflowed(false);
        Self {
            offset: header.offset,
            param_count: header.param_count,
            bytecode_size: header.bytecode_size,
            function_name: header.function_name,
            info_offset: header.info_offset,
            frame_size: header.frame_size,
            environment_size: header.environment_size as u8,
            highest_read_cache_index: header.highest_read_cache_index,
            highest_write_cache_index: header.highest_write_cache_index,
            flags,
        }
    }

    /// The full header lives at the function's info offset, which is split
    /// across the two offset fields.
    fn overflowed(header: &FunctionHeader) -> Self {
        let mut flags = header.flags;
        flags.set_overflowed(true);
        Self {
            offset: header.info_offset & mask(OFFSET_BITS),
            info_offset: header.info_offset >> OFFSET_BITS,
            flags,
            ..Self::default()
        }
    }

    pub fn is_overflowed(&self) -> bool {
        self.flags.overflowed()
    }

    /// Absolute offset of the full header (only meaningful when overflowed).
    pub fn large_header_offset(&self) -> u32 {
        (self.info_offset << OFFSET_BITS) | self.offset
    }

    /// Decode from 16 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= Self::SIZE, "small function header too short");
        let w0 = read_u32_le(bytes, 0);
        let w1 = read_u32_le(bytes, 4);
        let w2 = read_u32_le(bytes, 8);
        Self {
            offset: w0 & mask(OFFSET_BITS),
            param_count: w0 >> OFFSET_BITS,
            bytecode_size: w1 & mask(BYTECODE_SIZE_BITS),
            function_name: w1 >> BYTECODE_SIZE_BITS,
            info_offset: w2 & mask(OFFSET_BITS),
            frame_size: w2 >> OFFSET_BITS,
            environment_size: bytes[12],
            highest_read_cache_index: bytes[13],
            highest_write_cache_index: bytes[14],
            flags: FunctionFlags(bytes[15]),
        }
    }

    pub fn to_bytes(&self) -> [u8; 16] {
        let w0 = (self.offset & mask(OFFSET_BITS)) | (self.param_count << OFFSET_BITS);
        let w1 = (self.bytecode_size & mask(BYTECODE_SIZE_BITS))
            | (self.function_name << BYTECODE_SIZE_BITS);
        let w2 = (self.info_offset & mask(OFFSET_BITS)) | (self.frame_size << OFFSET_BITS);

        let mut bytes = [0u8; 16];
        bytes[0..4].copy_from_slice(&w0.to_le_bytes());
        bytes[4..8].copy_from_slice(&w1.to_le_bytes());
        bytes[8..12].copy_from_slice(&w2.to_le_bytes());
        bytes[12] = self.environment_size;
        bytes[13] = self.highest_read_cache_index;
        bytes[14] = self.highest_write_cache_index;
        bytes[15] = self.flags.bits();
        bytes
    }

    /// Expand a non-overflowed compact entry back to the full form.
    pub fn to_full(&self) -> FunctionHeader {
        debug_assert!(!self.is_overflowed(), "overflowed entries hold no content");
        FunctionHeader {
            offset: self.offset,
            param_count: self.param_count,
            bytecode_size: self.bytecode_size,
            function_name: self.function_name,
            info_offset: self.info_offset,
            frame_size: self.frame_size,
            environment_size: self.environment_size as u32,
            highest_read_cache_index: self.highest_read_cache_index,
            highest_write_cache_index: self.highest_write_cache_index,
            flags: self.flags,
        }
    }
}

impl Record for SmallFuncHeader {
    const SIZE: usize = 16;

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_bytes());
    }
}
