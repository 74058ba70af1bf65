//! Test utilities: module fixtures and a file round trip helper.

use quill_bytecode::{
    BytecodeFile, DebugFileRegion, DebugOffsets, ExceptionHandlerInfo, SourceHash,
};

use crate::{BytecodeModule, DebugInfo, FunctionDecl, FunctionEntry, SerializerOptions, emit};

/// A small function declaration named by string id `name`.
pub fn decl(name: u32) -> FunctionDecl {
    FunctionDecl {
        function_name: name,
        param_count: 1,
        frame_size: 4,
        environment_size: 0,
        ..Default::default()
    }
}

/// A function with the given opcodes and no jump tables.
pub fn function(opcodes: &[u8]) -> FunctionEntry {
    FunctionEntry::new(decl(0), opcodes.to_vec(), Vec::new())
}

/// Module holding exactly `functions`, in order.
pub fn module_of(functions: impl IntoIterator<Item = FunctionEntry>) -> BytecodeModule {
    let mut builder = BytecodeModule::builder();
    for function in functions {
        builder.add_function(function);
    }
    builder.build()
}

/// A module exercising every section.
pub fn sample_module() -> BytecodeModule {
    let mut builder = BytecodeModule::builder();
    let main = builder.add_string("main");
    let helper = builder.add_string("helper");
    builder.add_utf16_string(&[0x00e9, 0x4e2d]);
    builder.add_identifier_hash(0xdead_beef);
    builder.add_identifier_hash(0x1234_5678);

    let mut debug_info = DebugInfo::new();
    let file = debug_info.add_filename("main.js");
    debug_info.add_file_region(DebugFileRegion::new(0, file, 0));
    debug_info.set_data(vec![1, 2, 3, 4, 5, 6], 4);

    builder.add_function(
        FunctionEntry::new(decl(main), vec![0x10, 0x11, 0x12], vec![7, 9])
            .with_debug_offsets(DebugOffsets::new(0, 4)),
    );
    builder.add_function(
        FunctionEntry::new(decl(helper), vec![0x20; 5], Vec::new())
            .with_exception_handlers(vec![ExceptionHandlerInfo::new(0, 3, 4)])
            .with_debug_offsets(DebugOffsets::new(2, 4)),
    );

    builder.add_regexp(&[0xaa, 0xbb, 0xcc]);
    builder
        .array_buffer(vec![1, 2, 3])
        .object_buffers(vec![4, 5], vec![6])
        .add_cjs_module(main, 1)
        .global_function(0)
        .debug_info(debug_info);
    builder.build()
}

/// Serialize with `options` and parse the result back.
pub fn roundtrip(module: &mut BytecodeModule, options: &SerializerOptions) -> BytecodeFile {
    let bytes = emit(module, SourceHash::of("test"), options).expect("emit failed");
    BytecodeFile::from_bytes(bytes).expect("emitted file failed to load")
}
