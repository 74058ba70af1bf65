//! Append-only binary stream shared by all section encoders.

use quill_bytecode::Record;

/// Append-only byte sink tracking the next write offset.
///
/// A layout stream only advances its position; an emit stream also keeps
/// the bytes.
#[derive(Debug, Default)]
pub struct BinaryStream {
    bytes: Vec<u8>,
    loc: usize,
    retain: bool,
}

impl BinaryStream {
    /// A stream that measures without keeping bytes.
    pub fn layout() -> Self {
        Self::default()
    }

    /// A stream that keeps bytes, with room for `capacity` of them.
    pub fn emit(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            loc: 0,
            retain: true,
        }
    }

    /// Next write offset.
    #[inline]
    pub fn loc(&self) -> usize {
        self.loc
    }

    /// Append one record.
    pub fn write<R: Record>(&mut self, record: &R) {
        if self.retain {
            record.encode(&mut self.bytes);
            debug_assert_eq!(self.bytes.len(), self.loc + R::SIZE, "record size mismatch");
        }
        self.loc += R::SIZE;
    }

    /// Append records contiguously.
    pub fn write_array<R: Record>(&mut self, records: &[R]) {
        if self.retain {
            for record in records {
                record.encode(&mut self.bytes);
            }
        }
        self.loc += records.len() * R::SIZE;
        debug_assert!(!self.retain || self.bytes.len() == self.loc);
    }

    /// Append raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        if self.retain {
            self.bytes.extend_from_slice(bytes);
        }
        self.loc += bytes.len();
    }

    /// Append `count` zero bytes.
    pub fn write_zeros(&mut self, count: usize) {
        if self.retain {
            self.bytes.resize(self.bytes.len() + count, 0);
        }
        self.loc += count;
    }

    /// Append zero bytes until the position is a multiple of `align`.
    pub fn pad(&mut self, align: usize) {
        let rem = self.loc % align;
        if rem != 0 {
            self.write_zeros(align - rem);
        }
    }

    /// Take the written bytes (empty for a layout stream).
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
