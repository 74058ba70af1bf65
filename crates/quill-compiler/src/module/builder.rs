//! Builder for [`BytecodeModule`].

use quill_bytecode::{BytecodeOptions, RegExpTableEntry, StringTableEntry};

use super::{BytecodeModule, CjsModuleTable, DebugInfo, FunctionEntry};

/// Assembles a [`BytecodeModule`] from code generator output.
#[derive(Debug, Default)]
pub struct BytecodeModuleBuilder {
    module: BytecodeModule,
}

impl BytecodeModuleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a function; returns its function table index.
    pub fn add_function(&mut self, function: FunctionEntry) -> u32 {
        let index = self.module.functions.len() as u32;
        self.module.functions.push(function);
        index
    }

    pub fn global_function(&mut self, index: u32) -> &mut Self {
        self.module.global_function_index = index;
        self
    }

    /// Append an ASCII/UTF-8 string to storage; returns its string id.
    pub fn add_string(&mut self, text: &str) -> u32 {
        let offset = self.module.string_storage.len() as u32;
        self.module.string_storage.extend_from_slice(text.as_bytes());
        self.add_string_entry(StringTableEntry::new(offset, text.len() as u32, false))
    }

    /// Append a UTF-16 string to storage; returns its string id.
    pub fn add_utf16_string(&mut self, units: &[u16]) -> u32 {
        let offset = self.module.string_storage.len() as u32;
        for unit in units {
            self.module
                .string_storage
                .extend_from_slice(&unit.to_le_bytes());
        }
        self.add_string_entry(StringTableEntry::new(offset, units.len() as u32, true))
    }

    /// Append a descriptor into storage supplied separately.
    pub fn add_string_entry(&mut self, entry: StringTableEntry) -> u32 {
        let id = self.module.string_table.len() as u32;
        self.module.string_table.push(entry);
        id
    }

    /// Raw string storage for descriptors added with [`Self::add_string_entry`].
    pub fn extend_string_storage(&mut self, bytes: &[u8]) -> &mut Self {
        self.module.string_storage.extend_from_slice(bytes);
        self
    }

    /// Append the hash code of the next identifier string.
    pub fn add_identifier_hash(&mut self, hash: u32) -> &mut Self {
        self.module.identifier_hashes.push(hash);
        self
    }

    /// Append a compiled regexp; returns its regexp id.
    pub fn add_regexp(&mut self, bytecode: &[u8]) -> u32 {
        let id = self.module.regexp_table.len() as u32;
        let offset = self.module.regexp_storage.len() as u32;
        self.module
            .regexp_table
            .push(RegExpTableEntry::new(offset, bytecode.len() as u32));
        self.module.regexp_storage.extend_from_slice(bytecode);
        id
    }

    pub fn array_buffer(&mut self, bytes: Vec<u8>) -> &mut Self {
        self.module.array_buffer = bytes;
        self
    }

    pub fn object_buffers(&mut self, keys: Vec<u8>, values: Vec<u8>) -> &mut Self {
        self.module.obj_key_buffer = keys;
        self.module.obj_value_buffer = values;
        self
    }

    /// Register a CJS module resolved at run time.
    ///
    /// # Panics
    /// If static CJS modules were already added.
    pub fn add_cjs_module(&mut self, source_id: u32, function_index: u32) -> &mut Self {
        if self.module.cjs_modules.is_empty() {
            self.module.cjs_modules = CjsModuleTable::Dynamic(Vec::new());
        }
        match &mut self.module.cjs_modules {
            CjsModuleTable::Dynamic(entries) => entries.push((source_id, function_index)),
            CjsModuleTable::Static(_) => panic!("cannot mix dynamic and static CJS modules"),
        }
        self
    }

    /// Register the next statically resolved CJS module.
    ///
    /// # Panics
    /// If dynamic CJS modules were already added.
    pub fn add_static_cjs_module(&mut self, function_index: u32) -> &mut Self {
        if self.module.cjs_modules.is_empty() {
            self.module.cjs_modules = CjsModuleTable::Static(Vec::new());
        }
        match &mut self.module.cjs_modules {
            CjsModuleTable::Static(entries) => entries.push(function_index),
            CjsModuleTable::Dynamic(_) => panic!("cannot mix dynamic and static CJS modules"),
        }
        self
    }

    /// First CJS module id owned by this module.
    pub fn cjs_module_offset(&mut self, offset: u32) -> &mut Self {
        self.module.cjs_module_offset = offset;
        self
    }

    pub fn options(&mut self, options: BytecodeOptions) -> &mut Self {
        self.module.options = options;
        self
    }

    pub fn debug_info(&mut self, debug_info: DebugInfo) -> &mut Self {
        self.module.debug_info = debug_info;
        self
    }

    pub fn build(self) -> BytecodeModule {
        self.module
    }
}
