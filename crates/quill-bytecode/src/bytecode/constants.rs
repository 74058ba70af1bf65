//! Bytecode format constants.

/// Magic bytes identifying a Quill bytecode file.
pub const MAGIC: [u8; 8] = *b"QUILLHBC";

/// Current bytecode format version.
///
/// Readers reject any other version; there is no negotiation.
pub const VERSION: u32 = 1;

/// Size of the file header in bytes.
pub const FILE_HEADER_SIZE: usize = 128;

/// Alignment of jump tables and padded function bodies.
pub const WORD_ALIGN: usize = 4;

/// Alignment of randomly accessed sections (regexp table, CJS table, debug info).
pub const SECTION_ALIGN: usize = 4;

/// Alignment of every per-function info sub-block.
pub const INFO_ALIGN: usize = 4;

/// Round `value` up to the next multiple of `align` (a power of two).
#[inline]
pub fn align_up(value: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two(), "alignment must be a power of two");
    (value + align - 1) & !(align - 1)
}
