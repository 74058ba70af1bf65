//! Small fixed-layout records of the auxiliary sections.

use super::record::{Record, read_u32_le};

/// Regular expression table entry: a range into regexp storage.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct RegExpTableEntry {
    pub offset: u32,
    pub length: u32,
}

impl RegExpTableEntry {
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

impl Record for RegExpTableEntry {
    const SIZE: usize = 8;

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.offset.to_le_bytes());
        out.extend_from_slice(&self.length.to_le_bytes());
    }
}

/// Count header preceding a function's exception handler records.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ExceptionHandlerTableHeader {
    pub count: u32,
}

impl Record for ExceptionHandlerTableHeader {
    const SIZE: usize = 4;

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.count.to_le_bytes());
    }
}

/// One try range: bytecode offsets relative to the function start.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ExceptionHandlerInfo {
    pub start: u32,
    pub end: u32,
    pub target: u32,
}

impl ExceptionHandlerInfo {
    pub fn new(start: u32, end: u32, target: u32) -> Self {
        Self { start, end, target }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            start: read_u32_le(bytes, 0),
            end: read_u32_le(bytes, 4),
            target: read_u32_le(bytes, 8),
        }
    }
}

impl Record for ExceptionHandlerInfo {
    const SIZE: usize = 12;

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.start.to_le_bytes());
        out.extend_from_slice(&self.end.to_le_bytes());
        out.extend_from_slice(&self.target.to_le_bytes());
    }
}
