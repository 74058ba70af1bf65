//! Debug info section.

use quill_bytecode::{DebugInfoHeader, SECTION_ALIGN};

use crate::module::BytecodeModule;

use super::EmitError;
use super::serializer::BytecodeSerializer;

impl BytecodeSerializer {
    /// Header, filename table, filename storage, file regions, debug data.
    ///
    /// When stripping, only a zeroed header is written.
    pub(super) fn write_debug_info(&mut self, module: &BytecodeModule) -> Result<(), EmitError> {
        self.stream.pad(SECTION_ALIGN);
        self.debug_info_offset = self.loc()?;

        if self.options.strips_debug_info() {
            self.stream.write(&DebugInfoHeader::default());
            return Ok(());
        }

        let info = module.debug_info();
        self.stream.write(&DebugInfoHeader {
            filename_count: info.filename_table().len() as u32,
            filename_storage_size: info.filename_storage().len() as u32,
            file_region_count: info.files().len() as u32,
            lexical_data_offset: info.lexical_data_offset(),
            debug_data_size: info.data().len() as u32,
        });
        self.stream.write_array(info.filename_table());
        self.stream.write_bytes(info.filename_storage());
        self.stream.write_array(info.files());
        self.stream.write_bytes(info.data());
        Ok(())
    }
}
