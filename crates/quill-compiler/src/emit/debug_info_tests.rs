//! Tests for the debug info section encoder.

use quill_bytecode::{DebugFileRegion, DebugInfoHeader, DebugOffsets, SourceHash};

use super::serializer::Pass;
use super::{BinaryStream, BytecodeSerializer, SerializerOptions};
use crate::test_utils::{decl, roundtrip, sample_module};
use crate::{BytecodeModule, DebugInfo, FunctionEntry};

fn module_with_debug_info() -> BytecodeModule {
    let mut info = DebugInfo::new();
    let a = info.add_filename("a.js");
    let b = info.add_filename("b.js");
    info.add_file_region(DebugFileRegion::new(0, a, 0));
    info.add_file_region(DebugFileRegion::new(40, b, 0));
    info.set_data(vec![9; 10], 6);

    let mut builder = BytecodeModule::builder();
    builder.add_function(
        FunctionEntry::new(decl(0), vec![1, 2, 3], Vec::new())
            .with_debug_offsets(DebugOffsets::new(0, 6)),
    );
    builder.debug_info(info);
    builder.build()
}

#[test]
fn debug_info_offset_is_section_aligned() {
    let module = BytecodeModule::default();
    let mut serializer = BytecodeSerializer::new(SourceHash::default(), SerializerOptions::new());
    serializer.stream.write_bytes(&[1]);
    serializer.write_debug_info(&module).unwrap();

    assert_eq!(serializer.debug_info_offset, 4);
    assert_eq!(serializer.stream.loc(), 4 + 20);
}

#[test]
fn stripped_debug_info_is_zeroed_header() {
    let module = module_with_debug_info();
    let options = SerializerOptions::new().strip_debug_info_section(true);
    let mut serializer = BytecodeSerializer::new(SourceHash::default(), options);
    serializer.pass = Pass::Emit;
    serializer.stream = BinaryStream::emit(0);
    serializer.write_debug_info(&module).unwrap();

    assert_eq!(serializer.stream.into_bytes(), [0; 20]);
}

#[test]
fn debug_info_roundtrip() {
    let mut module = module_with_debug_info();
    let file = roundtrip(&mut module, &SerializerOptions::new());

    assert_eq!(
        file.debug_info_header(),
        DebugInfoHeader {
            filename_count: 2,
            filename_storage_size: 8,
            file_region_count: 2,
            lexical_data_offset: 6,
            debug_data_size: 10,
        }
    );
    assert_eq!(file.debug_filenames(), module.debug_info().filename_table());
    assert_eq!(file.debug_file_regions(), module.debug_info().files());
    assert_eq!(file.debug_data(), &[9; 10]);
    assert_eq!(file.debug_offsets(0), Some(DebugOffsets::new(0, 6)));
}

#[test]
fn stripping_drops_function_debug_offsets() {
    let mut module = module_with_debug_info();
    let options = SerializerOptions::new().strip_debug_info_section(true);
    let file = roundtrip(&mut module, &options);

    assert!(file.debug_info_header().is_empty());
    assert!(!file.function_header(0).flags.has_debug_info());
    assert_eq!(file.debug_offsets(0), None);
    assert!(!module.function(0).has_debug_info());
}

#[test]
fn stripping_shrinks_file() {
    let mut full = sample_module();
    let mut stripped = sample_module();

    let full_len = roundtrip(&mut full, &SerializerOptions::new()).bytes().len();
    let stripped_len = roundtrip(
        &mut stripped,
        &SerializerOptions::new().strip_debug_info_section(true),
    )
    .bytes()
    .len();

    assert_eq!(full_len, 325);
    assert_eq!(stripped_len, 276);
}
