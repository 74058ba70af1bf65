//! Two-pass serializer driver and file header assembly.

use quill_bytecode::{FileHeader, SourceHash};
use tracing::debug;

use crate::module::BytecodeModule;

use super::{BinaryStream, EmitError, SerializerOptions};

/// Serialize `module` into a bytecode file.
///
/// Runs the layout pass (recording per-function offsets on the module) and
/// then the emit pass. On error nothing is returned; the module's recorded
/// offsets may be partially set and it should not be serialized again.
pub fn emit(
    module: &mut BytecodeModule,
    source_hash: SourceHash,
    options: &SerializerOptions,
) -> Result<Vec<u8>, EmitError> {
    BytecodeSerializer::new(source_hash, options.clone()).serialize(module)
}

/// Serializer pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Pass {
    /// Measuring: bytes are discarded, offsets are recorded on the module.
    Layout,
    /// Writing: offsets recorded during layout are used verbatim.
    Emit,
    /// One emit pass has completed.
    Done,
}

/// Two-pass bytecode file serializer.
///
/// [`layout`](Self::layout) may run any number of times; it always starts
/// from position zero and is idempotent on an unmodified module.
/// [`finish`](Self::finish) then runs the single emit pass.
#[derive(Debug)]
pub struct BytecodeSerializer {
    pub(super) options: SerializerOptions,
    pub(super) pass: Pass,
    pub(super) stream: BinaryStream,
    source_hash: SourceHash,
    /// Total file length, known after the first layout.
    file_length: Option<u32>,
    /// Compact + overflow string entry bytes, measured while writing them.
    pub(super) string_table_bytes: u32,
    /// Offset of the debug info section, measured while writing it.
    pub(super) debug_info_offset: u32,
    /// Functions whose body was reused during the last layout.
    pub(super) deduplicated: usize,
}

impl BytecodeSerializer {
    pub fn new(source_hash: SourceHash, options: SerializerOptions) -> Self {
        Self {
            options,
            pass: Pass::Layout,
            stream: BinaryStream::layout(),
            source_hash,
            file_length: None,
            string_table_bytes: 0,
            debug_info_offset: 0,
            deduplicated: 0,
        }
    }

    /// Run both passes.
    pub fn serialize(mut self, module: &mut BytecodeModule) -> Result<Vec<u8>, EmitError> {
        self.layout(module)?;
        self.finish(module)
    }

    /// Run the layout pass; returns the total file length.
    ///
    /// # Panics
    /// If the emit pass already started.
    pub fn layout(&mut self, module: &mut BytecodeModule) -> Result<u32, EmitError> {
        assert_eq!(self.pass, Pass::Layout, "layout after emission started");

        self.stream = BinaryStream::layout();
        self.deduplicated = 0;
        self.write_file(module)?;

        let file_length = self.loc()?;
        assert!(file_length > 0, "empty file after layout");
        self.file_length = Some(file_length);

        debug!(
            file_length,
            functions = module.functions().len(),
            deduplicated = self.deduplicated,
            "bytecode layout complete"
        );
        Ok(file_length)
    }

    /// Run the emit pass and return the file bytes.
    ///
    /// # Panics
    /// If no layout ran, if called twice, or if the emitted length differs
    /// from the laid-out length.
    pub fn finish(&mut self, module: &mut BytecodeModule) -> Result<Vec<u8>, EmitError> {
        assert_eq!(self.pass, Pass::Layout, "bytecode already emitted");
        let file_length = self.file_length.expect("emit requires a completed layout");

        self.pass = Pass::Emit;
        self.stream = BinaryStream::emit(file_length as usize);
        self.write_file(module)?;

        assert_eq!(
            self.stream.loc(),
            file_length as usize,
            "emitted length differs from layout"
        );
        self.pass = Pass::Done;

        let bytes = std::mem::take(&mut self.stream).into_bytes();
        debug!(file_length, "bytecode emitted");
        Ok(bytes)
    }

    /// File length recorded by the last layout.
    pub fn file_length(&self) -> Option<u32> {
        self.file_length
    }

    pub(super) fn is_layout(&self) -> bool {
        self.pass == Pass::Layout
    }

    /// Current stream position as a file offset.
    pub(super) fn loc(&self) -> Result<u32, EmitError> {
        let loc = self.stream.loc();
        u32::try_from(loc).map_err(|_| EmitError::FileTooLarge(loc))
    }

    /// The full section sequence, identical in both passes.
    fn write_file(&mut self, module: &mut BytecodeModule) -> Result<(), EmitError> {
        let header = self.file_header(module);
        self.stream.write(&header);

        self.write_function_table(module);
        self.write_string_table(module)?;
        self.write_array_buffer(module);
        self.write_object_buffer(module);
        self.write_regexps(module);
        self.write_cjs_module_table(module);
        self.write_function_bodies(module)?;
        for index in 0..module.functions().len() {
            self.write_function_info(module, index)?;
        }
        self.write_debug_info(module)?;
        Ok(())
    }

    /// Assemble the file header.
    ///
    /// Measured fields (file length, string table bytes, debug info offset)
    /// hold their final values only after a layout pass.
    pub(super) fn file_header(&self, module: &BytecodeModule) -> FileHeader {
        let (obj_keys, obj_values) = module.object_buffers();
        FileHeader {
            source_hash: self.source_hash,
            file_length: self.file_length.unwrap_or(0),
            global_code_index: module.global_function_index(),
            function_count: module.functions().len() as u32,
            string_count: module.string_table().len() as u32,
            identifier_count: module.identifier_hashes().len() as u32,
            string_table_bytes: self.string_table_bytes,
            string_storage_size: module.string_storage().len() as u32,
            regexp_count: module.regexp_table().len() as u32,
            regexp_storage_size: module.regexp_storage().len() as u32,
            array_buffer_size: module.array_buffer().len() as u32,
            obj_key_buffer_size: obj_keys.len() as u32,
            obj_value_buffer_size: obj_values.len() as u32,
            cjs_module_offset: module.cjs_module_offset(),
            cjs_module_count: module.cjs_modules().encoded_count(),
            debug_info_offset: self.debug_info_offset,
            options: module.options(),
            ..Default::default()
        }
    }
}
