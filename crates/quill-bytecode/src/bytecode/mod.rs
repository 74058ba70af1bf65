//! Bytecode file format.
//!
//! Section order: Header → FunctionTable → StringTable → ArrayBuffer →
//! ObjectKeyBuffer → ObjectValueBuffer → RegExpTable → CJSModuleTable →
//! FunctionBodies → FunctionInfo → DebugInfo

mod constants;
mod debug;
mod file;
mod function_header;
mod hash;
mod header;
mod record;
mod sections;
mod string_table;


pub use constants::{
    FILE_HEADER_SIZE, INFO_ALIGN, MAGIC, SECTION_ALIGN, VERSION, WORD_ALIGN, align_up,
};
pub use debug::{DebugFileRegion, DebugInfoHeader, DebugOffsets};
pub use file::{BytecodeFile, CjsTable, FileError};
pub use function_header::{FunctionFlags, FunctionHeader, SmallFuncHeader};
pub use hash::SourceHash;
pub use header::{BytecodeOptions, FileHeader, SectionOffsets};
pub use record::Record;
pub use sections::{ExceptionHandlerInfo, ExceptionHandlerTableHeader, RegExpTableEntry};
pub use string_table::{OverflowStringTableEntry, SmallStringTableEntry, StringTableEntry};
