//! Error types for bytecode emission.

/// Error during bytecode emission.
///
/// Only capacity limits of the format are reported here. Broken driver
/// invariants (missing or reassigned offsets, length drift between passes)
/// panic instead.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EmitError {
    /// A string needs an overflow side-table index beyond what a compact
    /// string entry can refer to.
    #[error(
        "string {string}: overflow string table full ({max} entries)",
        max = quill_bytecode::SmallStringTableEntry::MAX_OVERFLOW_INDEX + 1
    )]
    OverflowStringTableFull { string: usize },
    /// File length exceeds the u32 offsets used throughout the format.
    #[error("bytecode file too large: {0} bytes (max {max})", max = u32::MAX)]
    FileTooLarge(usize),
}
