//! Compiled function entries.

use quill_bytecode::{DebugOffsets, ExceptionHandlerInfo, FunctionFlags, FunctionHeader};

/// Header fields of a function as produced by the code generator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FunctionDecl {
    /// String table index of the function name.
    pub function_name: u32,
    pub param_count: u32,
    /// Register count.
    pub frame_size: u32,
    /// Number of symbols in the function's environment.
    pub environment_size: u32,
    pub highest_read_cache_index: u8,
    pub highest_write_cache_index: u8,
    pub strict_mode: bool,
    /// Call/construct restriction (two bits).
    pub prohibit_invoke: u8,
}

/// One compiled function.
///
/// The bytecode and info offsets are unset until the layout pass records
/// them, and never change afterwards.
#[derive(Clone, Debug)]
pub struct FunctionEntry {
    decl: FunctionDecl,
    flags: FunctionFlags,
    opcodes: Vec<u8>,
    jump_tables: Vec<u32>,
    exception_handlers: Vec<ExceptionHandlerInfo>,
    debug_offsets: Option<DebugOffsets>,
    bytecode_offset: Option<u32>,
    info_offset: Option<u32>,
}

impl FunctionEntry {
    pub fn new(decl: FunctionDecl, opcodes: Vec<u8>, jump_tables: Vec<u32>) -> Self {
        let mut flags = FunctionFlags::default();
        flags.set_strict_mode(decl.strict_mode);
        flags.set_prohibit_invoke(decl.prohibit_invoke);
        Self {
            decl,
            flags,
            opcodes,
            jump_tables,
            exception_handlers: Vec::new(),
            debug_offsets: None,
            bytecode_offset: None,
            info_offset: None,
        }
    }

    /// Attach exception handlers; sets the "has exception handler" flag when non-empty.
    pub fn with_exception_handlers(mut self, handlers: Vec<ExceptionHandlerInfo>) -> Self {
        self.flags.set_has_exception_handler(!handlers.is_empty());
        self.exception_handlers = handlers;
        self
    }

    /// Attach debug offsets; sets the "has debug info" flag.
    pub fn with_debug_offsets(mut self, offsets: DebugOffsets) -> Self {
        self.flags.set_has_debug_info(true);
        self.debug_offsets = Some(offsets);
        self
    }

    pub fn decl(&self) -> &FunctionDecl {
        &self.decl
    }

    pub fn flags(&self) -> FunctionFlags {
        self.flags
    }

    pub fn has_debug_info(&self) -> bool {
        self.flags.has_debug_info()
    }

    pub fn opcodes(&self) -> &[u8] {
        &self.opcodes
    }

    pub fn jump_tables(&self) -> &[u32] {
        &self.jump_tables
    }

    pub fn exception_handlers(&self) -> &[ExceptionHandlerInfo] {
        &self.exception_handlers
    }

    pub fn debug_offsets(&self) -> Option<&DebugOffsets> {
        self.debug_offsets.as_ref()
    }

    /// Offset of the function's bytecode, once laid out.
    pub fn bytecode_offset(&self) -> Option<u32> {
        self.bytecode_offset
    }

    /// Offset of the function's info block, once laid out.
    pub fn info_offset(&self) -> Option<u32> {
        self.info_offset
    }

    /// Full header with the recorded offsets (zero while unset).
    pub fn header(&self) -> FunctionHeader {
        FunctionHeader {
            offset: self.bytecode_offset.unwrap_or(0),
            param_count: self.decl.param_count,
            bytecode_size: self.opcodes.len() as u32,
            function_name: self.decl.function_name,
            info_offset: self.info_offset.unwrap_or(0),
            frame_size: self.decl.frame_size,
            environment_size: self.decl.environment_size,
            highest_read_cache_index: self.decl.highest_read_cache_index,
            highest_write_cache_index: self.decl.highest_write_cache_index,
            flags: self.flags,
        }
    }

    pub(crate) fn record_bytecode_offset(&mut self, offset: u32) {
        record_once(&mut self.bytecode_offset, offset, "bytecode");
    }

    pub(crate) fn record_info_offset(&mut self, offset: u32) {
        record_once(&mut self.info_offset, offset, "info");
    }

    pub(crate) fn clear_debug_info_flag(&mut self) {
        self.flags.set_has_debug_info(false);
    }
}

/// Offsets are single-assignment: a repeated layout may only confirm them.
fn record_once(slot: &mut Option<u32>, offset: u32, what: &str) {
    match *slot {
        None => *slot = Some(offset),
        Some(existing) => assert_eq!(
            existing, offset,
            "{what} offset reassigned from {existing} to {offset}"
        ),
    }
}
