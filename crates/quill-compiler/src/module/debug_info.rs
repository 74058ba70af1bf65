//! Module-level debug info.

use quill_bytecode::{DebugFileRegion, StringTableEntry};

/// Debug info shared by all functions of a module.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DebugInfo {
    filenames: Vec<StringTableEntry>,
    filename_storage: Vec<u8>,
    files: Vec<DebugFileRegion>,
    data: Vec<u8>,
    lexical_data_offset: u32,
}

impl DebugInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filename; returns its filename id.
    pub fn add_filename(&mut self, name: &str) -> u32 {
        let id = self.filenames.len() as u32;
        self.filenames.push(StringTableEntry::new(
            self.filename_storage.len() as u32,
            name.len() as u32,
            false,
        ));
        self.filename_storage.extend_from_slice(name.as_bytes());
        id
    }

    pub fn add_file_region(&mut self, region: DebugFileRegion) {
        self.files.push(region);
    }

    /// Set the combined debug blob; lexical scope data starts at `lexical_data_offset`.
    pub fn set_data(&mut self, data: Vec<u8>, lexical_data_offset: u32) {
        debug_assert!(lexical_data_offset as usize <= data.len());
        self.data = data;
        self.lexical_data_offset = lexical_data_offset;
    }

    pub fn filename_table(&self) -> &[StringTableEntry] {
        &self.filenames
    }

    pub fn filename_storage(&self) -> &[u8] {
        &self.filename_storage
    }

    pub fn files(&self) -> &[DebugFileRegion] {
        &self.files
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn lexical_data_offset(&self) -> u32 {
        self.lexical_data_offset
    }
}
