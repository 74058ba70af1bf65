//! Bytecode file format for Quill.
//!
//! This crate contains:
//! - Format constants and fixed-layout records (file header, function headers,
//!   string table entries, debug records)
//! - The [`Record`] encoding trait shared with the serializer
//! - A read-only [`BytecodeFile`] view over a finished file

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod bytecode;

// Re-export commonly used items at crate root
pub use bytecode::{
    BytecodeFile, BytecodeOptions, CjsTable, DebugFileRegion, DebugInfoHeader, DebugOffsets,
    ExceptionHandlerInfo, ExceptionHandlerTableHeader, FILE_HEADER_SIZE, FileError, FileHeader,
    FunctionFlags, FunctionHeader, INFO_ALIGN, MAGIC, OverflowStringTableEntry, Record,
    RegExpTableEntry, SECTION_ALIGN, SectionOffsets, SmallFuncHeader, SmallStringTableEntry,
    SourceHash, StringTableEntry, VERSION, WORD_ALIGN, align_up,
};
