//! Fixed-layout record encoding.

/// A record with a fixed-width little-endian wire encoding.
///
/// `encode` must append exactly `SIZE` bytes.
pub trait Record {
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Append the encoded record to `out`.
    fn encode(&self, out: &mut Vec<u8>);
}

impl Record for u8 {
    const SIZE: usize = 1;

    fn encode(&self, out: &mut Vec<u8>) {
        out.push(*self);
    }
}

impl Record for u32 {
    const SIZE: usize = 4;

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

impl Record for i32 {
    const SIZE: usize = 4;

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

/// Read a little-endian u32 from bytes at the given offset.
#[inline]
pub(crate) fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
