//! In-memory bytecode module.
//!
//! A [`BytecodeModule`] is built by the code generator and is read-only to the
//! serializer, with two exceptions confined to [`FunctionEntry`]: the layout
//! pass records each function's bytecode and info offsets (once), and debug
//! stripping clears the per-function "has debug info" flag.

mod builder;
mod debug_info;
mod function;


pub use builder::BytecodeModuleBuilder;
pub use debug_info::DebugInfo;
pub use function::{FunctionDecl, FunctionEntry};

use quill_bytecode::{BytecodeOptions, RegExpTableEntry, StringTableEntry};

/// CommonJS module table, in exactly one of its two forms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CjsModuleTable {
    /// `(source string id, function index)` pairs, in insertion order.
    Dynamic(Vec<(u32, u32)>),
    /// Precomputed function index per module id (relative to the module's
    /// CJS module offset).
    Static(Vec<u32>),
}

impl Default for CjsModuleTable {
    fn default() -> Self {
        Self::Dynamic(Vec::new())
    }
}

impl CjsModuleTable {
    pub fn len(&self) -> usize {
        match self {
            Self::Dynamic(entries) => entries.len(),
            Self::Static(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the static form is in use (non-empty static table).
    pub fn is_static(&self) -> bool {
        matches!(self, Self::Static(entries) if !entries.is_empty())
    }

    /// Module count as stored in the file header: negated for the static form.
    pub fn encoded_count(&self) -> i32 {
        let count = i32::try_from(self.len()).expect("CJS module count exceeds i32");
        if self.is_static() { -count } else { count }
    }
}

/// A compiled bytecode module.
#[derive(Clone, Debug, Default)]
pub struct BytecodeModule {
    functions: Vec<FunctionEntry>,
    global_function_index: u32,
    string_table: Vec<StringTableEntry>,
    identifier_hashes: Vec<u32>,
    string_storage: Vec<u8>,
    regexp_table: Vec<RegExpTableEntry>,
    regexp_storage: Vec<u8>,
    array_buffer: Vec<u8>,
    obj_key_buffer: Vec<u8>,
    obj_value_buffer: Vec<u8>,
    cjs_modules: CjsModuleTable,
    cjs_module_offset: u32,
    debug_info: DebugInfo,
    options: BytecodeOptions,
}

impl BytecodeModule {
    pub fn builder() -> BytecodeModuleBuilder {
        BytecodeModuleBuilder::new()
    }

    /// Functions in function table order.
    pub fn functions(&self) -> &[FunctionEntry] {
        &self.functions
    }

    pub fn function(&self, index: usize) -> &FunctionEntry {
        &self.functions[index]
    }

    pub(crate) fn functions_mut(&mut self) -> &mut [FunctionEntry] {
        &mut self.functions
    }

    pub fn global_function_index(&self) -> u32 {
        self.global_function_index
    }

    pub fn string_table(&self) -> &[StringTableEntry] {
        &self.string_table
    }

    /// Hash codes of identifier strings, parallel to the identifiers.
    pub fn identifier_hashes(&self) -> &[u32] {
        &self.identifier_hashes
    }

    pub fn string_storage(&self) -> &[u8] {
        &self.string_storage
    }

    pub fn regexp_table(&self) -> &[RegExpTableEntry] {
        &self.regexp_table
    }

    pub fn regexp_storage(&self) -> &[u8] {
        &self.regexp_storage
    }

    pub fn array_buffer(&self) -> &[u8] {
        &self.array_buffer
    }

    /// Object literal key and value buffers.
    pub fn object_buffers(&self) -> (&[u8], &[u8]) {
        (&self.obj_key_buffer, &self.obj_value_buffer)
    }

    pub fn cjs_modules(&self) -> &CjsModuleTable {
        &self.cjs_modules
    }

    pub fn cjs_module_offset(&self) -> u32 {
        self.cjs_module_offset
    }

    pub fn debug_info(&self) -> &DebugInfo {
        &self.debug_info
    }

    pub fn options(&self) -> BytecodeOptions {
        self.options
    }
}
