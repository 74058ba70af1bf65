//! String, buffer, regexp and CommonJS module tables.

use quill_bytecode::{
    OverflowStringTableEntry, Record, SECTION_ALIGN, SmallStringTableEntry, StringTableEntry,
};

use crate::module::{BytecodeModule, CjsModuleTable};

use super::EmitError;
use super::serializer::BytecodeSerializer;

impl BytecodeSerializer {
    /// Compact entries, overflow side table, identifier hashes, storage.
    pub(super) fn write_string_table(&mut self, module: &BytecodeModule) -> Result<(), EmitError> {
        let start = self.loc()?;

        let mut overflow = Vec::new();
        for (string, entry) in module.string_table().iter().enumerate() {
            let small = compact_string_entry(string, entry, overflow.len())?;
            if small.is_overflowed() {
                overflow.push(OverflowStringTableEntry::new(entry.offset, entry.length));
            }
            self.stream.write(&small);
        }
        self.stream.write_array(&overflow);

        self.string_table_bytes = self.loc()? - start;
        debug_assert_eq!(
            self.string_table_bytes as usize,
            module.string_table().len() * SmallStringTableEntry::SIZE
                + overflow.len() * OverflowStringTableEntry::SIZE
        );

        self.stream.write_array(module.identifier_hashes());
        self.stream.write_bytes(module.string_storage());
        Ok(())
    }

    pub(super) fn write_array_buffer(&mut self, module: &BytecodeModule) {
        self.stream.write_bytes(module.array_buffer());
    }

    /// Key buffer then value buffer.
    pub(super) fn write_object_buffer(&mut self, module: &BytecodeModule) {
        let (keys, values) = module.object_buffers();
        self.stream.write_bytes(keys);
        self.stream.write_bytes(values);
    }

    pub(super) fn write_regexps(&mut self, module: &BytecodeModule) {
        self.stream.pad(SECTION_ALIGN);
        self.stream.write_array(module.regexp_table());
        self.stream.write_bytes(module.regexp_storage());
    }

    /// Dynamic modules as `(source id, function index)` pairs, static modules
    /// as bare function indices.
    pub(super) fn write_cjs_module_table(&mut self, module: &BytecodeModule) {
        self.stream.pad(SECTION_ALIGN);
        match module.cjs_modules() {
            CjsModuleTable::Dynamic(entries) => {
                for &(source_id, function_index) in entries {
                    self.stream.write(&source_id);
                    self.stream.write(&function_index);
                }
            }
            CjsModuleTable::Static(entries) => self.stream.write_array(entries),
        }
    }
}

/// Compact entry for string `string`, spilling to overflow slot `overflow_index`
/// when it does not fit.
pub(super) fn compact_string_entry(
    string: usize,
    entry: &StringTableEntry,
    overflow_index: usize,
) -> Result<SmallStringTableEntry, EmitError> {
    if !SmallStringTableEntry::fits(entry)
        && overflow_index > SmallStringTableEntry::MAX_OVERFLOW_INDEX
    {
        return Err(EmitError::OverflowStringTableFull { string });
    }
    Ok(SmallStringTableEntry::new(entry, overflow_index))
}
