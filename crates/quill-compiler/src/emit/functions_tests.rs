//! Tests for the function table, body and info block encoders.

use quill_bytecode::{
    DebugOffsets, ExceptionHandlerInfo, FunctionHeader, Record, SmallFuncHeader, SourceHash,
    WORD_ALIGN,
};

use super::serializer::Pass;
use super::{BinaryStream, BytecodeSerializer, SerializerOptions};
use crate::test_utils::{decl, function, module_of, roundtrip};
use crate::{BytecodeModule, FunctionDecl, FunctionEntry};

fn layout_bodies(module: &mut BytecodeModule, options: SerializerOptions) -> BytecodeSerializer {
    let mut serializer = BytecodeSerializer::new(SourceHash::default(), options);
    serializer.write_function_bodies(module).unwrap();
    serializer
}

fn dedup() -> SerializerOptions {
    SerializerOptions::new().optimization_enabled(true)
}

#[test]
fn identical_bodies_share_offset() {
    let mut module = module_of([function(&[1, 2, 3]), function(&[1, 2, 3])]);
    let serializer = layout_bodies(&mut module, dedup());

    assert_eq!(module.function(0).bytecode_offset(), Some(0));
    assert_eq!(module.function(1).bytecode_offset(), Some(0));
    assert_eq!(serializer.deduplicated, 1);
    assert_eq!(serializer.stream.loc(), 4);
}

#[test]
fn bodies_without_dedup_are_distinct() {
    let mut module = module_of([function(&[1, 2, 3]), function(&[1, 2, 3])]);
    let serializer = layout_bodies(&mut module, SerializerOptions::new());

    assert_eq!(module.function(1).bytecode_offset(), Some(4));
    assert_eq!(serializer.deduplicated, 0);
    assert_eq!(serializer.stream.loc(), 8);
}

#[test]
fn jump_tables_are_part_of_dedup_key() {
    let mut module = module_of([
        FunctionEntry::new(decl(0), vec![1, 2], vec![10]),
        FunctionEntry::new(decl(0), vec![1, 2], vec![11]),
        FunctionEntry::new(decl(0), vec![1, 2], vec![10]),
    ]);
    layout_bodies(&mut module, dedup());

    let offsets: Vec<_> = module
        .functions()
        .iter()
        .map(|f| f.bytecode_offset().unwrap())
        .collect();
    assert_eq!(offsets, [0, 8, 0]);
}

#[test]
fn dedup_ignores_header_fields() {
    let mut module = module_of([
        FunctionEntry::new(decl(1), vec![5; 4], Vec::new()),
        FunctionEntry::new(
            FunctionDecl {
                param_count: 3,
                ..decl(2)
            },
            vec![5; 4],
            Vec::new(),
        ),
    ]);
    layout_bodies(&mut module, dedup());

    assert_eq!(module.function(1).bytecode_offset(), Some(0));
}

#[test]
fn jump_tables_are_word_aligned() {
    let mut module = module_of([FunctionEntry::new(decl(0), vec![0xaa], vec![0x0403_0201])]);
    let mut serializer = layout_bodies(&mut module, SerializerOptions::new());
    assert_eq!(serializer.stream.loc(), 8);

    serializer.pass = Pass::Emit;
    serializer.stream = BinaryStream::emit(8);
    serializer.write_function_bodies(&mut module).unwrap();

    assert_eq!(serializer.stream.into_bytes(), [0xaa, 0, 0, 0, 1, 2, 3, 4]);
}

#[test]
fn body_padding_percent_appends_zeros() {
    let mut module = module_of([function(&[1; 10]), function(&[2; 10])]);
    let options = SerializerOptions::new().pad_function_bodies_percent(50);
    let serializer = layout_bodies(&mut module, options);

    // 10 opcodes, aligned to 12, plus 5 zeros, aligned to 20.
    assert_eq!(module.function(1).bytecode_offset(), Some(20));
    assert_eq!(serializer.stream.loc(), 40);
    assert_eq!(serializer.stream.loc() % WORD_ALIGN, 0);
}

#[test]
fn repeated_layout_is_idempotent() {
    let mut module = module_of([function(&[1, 2, 3]), function(&[4]), function(&[1, 2, 3])]);
    layout_bodies(&mut module, dedup());
    let first: Vec<_> = module.functions().iter().map(|f| f.bytecode_offset()).collect();

    layout_bodies(&mut module, dedup());
    let second: Vec<_> = module.functions().iter().map(|f| f.bytecode_offset()).collect();

    assert_eq!(first, second);
}

#[test]
fn function_table_writes_compact_headers() {
    let mut module = module_of([function(&[1]), function(&[2])]);
    let mut serializer = BytecodeSerializer::new(SourceHash::default(), SerializerOptions::new());
    serializer.write_function_table(&mut module);

    assert_eq!(serializer.stream.loc(), 2 * SmallFuncHeader::SIZE);
}

#[test]
fn function_table_overflows_offsets_beyond_compact_range() {
    let mut entry = function(&[1]);
    entry.record_bytecode_offset(1 << 25);
    entry.record_info_offset((1 << 25) + 4);
    let mut module = module_of([entry]);

    let mut serializer = BytecodeSerializer::new(SourceHash::default(), SerializerOptions::new());
    serializer.pass = Pass::Emit;
    serializer.stream = BinaryStream::emit(0);
    serializer.write_function_table(&mut module);

    let small = SmallFuncHeader::from_bytes(&serializer.stream.into_bytes());
    assert!(small.is_overflowed());
    assert_eq!(small.large_header_offset(), (1 << 25) + 4);
}

#[test]
fn overflowed_content_with_large_offsets() {
    let mut entry = FunctionEntry::new(
        FunctionDecl {
            param_count: 200,
            ..decl(0)
        },
        vec![1],
        Vec::new(),
    );
    entry.record_bytecode_offset(1 << 26);
    entry.record_info_offset((1 << 26) + 4);
    let mut module = module_of([entry]);

    let mut serializer = BytecodeSerializer::new(SourceHash::default(), SerializerOptions::new());
    serializer.pass = Pass::Emit;
    serializer.stream = BinaryStream::emit(0);
    serializer.write_function_table(&mut module);

    let small = SmallFuncHeader::from_bytes(&serializer.stream.into_bytes());
    assert!(small.is_overflowed());
    assert_eq!(small.large_header_offset(), (1 << 26) + 4);
}

#[test]
fn late_function_in_large_file_roundtrips() {
    let mut builder = BytecodeModule::builder();
    builder.array_buffer(vec![0; 1 << 25]);
    builder.add_function(function(&[1]));
    let mut module = builder.build();

    let file = roundtrip(&mut module, &SerializerOptions::new());

    let function = module.function(0);
    assert!(function.bytecode_offset().unwrap() >= 1 << 25);
    assert!(file.small_function_header(0).is_overflowed());
    assert_eq!(
        file.small_function_header(0).large_header_offset(),
        function.info_offset().unwrap()
    );
    assert_eq!(file.function_header(0), function.header());
    assert_eq!(file.function_bytecode(0), &[1]);
}

#[test]
fn small_function_early_in_file_stays_compact() {
    let mut module = module_of([function(&[1, 2])]);
    let file = roundtrip(&mut module, &SerializerOptions::new());

    assert!(!file.small_function_header(0).is_overflowed());
    assert_eq!(file.function_header(0), module.function(0).header());
}

#[test]
#[should_panic(expected = "lacks bytecode offset after layout")]
fn emit_without_layout_offsets_panics() {
    let mut module = module_of([function(&[1])]);
    let mut serializer = BytecodeSerializer::new(SourceHash::default(), SerializerOptions::new());
    serializer.pass = Pass::Emit;
    serializer.write_function_table(&mut module);
}

#[test]
fn overflowed_header_is_stored_in_info_block() {
    let big = FunctionDecl {
        frame_size: 1000,
        ..decl(0)
    };
    let mut module = module_of([function(&[1, 2]), FunctionEntry::new(big, vec![3], Vec::new())]);
    let file = roundtrip(&mut module, &SerializerOptions::new());

    let small = file.small_function_header(1);
    let info_offset = module.function(1).info_offset().unwrap();
    assert!(small.is_overflowed());
    assert_eq!(small.large_header_offset(), info_offset);

    let header: FunctionHeader = file.function_header(1);
    assert_eq!(header, module.function(1).header());
    assert_eq!(header.frame_size, 1000);
    assert_eq!(file.function_bytecode(1), &[3]);
}

#[test]
fn info_block_holds_handlers_and_debug_offsets() {
    let handlers = vec![
        ExceptionHandlerInfo::new(0, 4, 8),
        ExceptionHandlerInfo::new(8, 12, 16),
    ];
    let entry = FunctionEntry::new(decl(0), vec![0; 16], Vec::new())
        .with_exception_handlers(handlers.clone())
        .with_debug_offsets(DebugOffsets::new(1, 2));
    let mut module = module_of([entry]);
    let file = roundtrip(&mut module, &SerializerOptions::new());

    assert_eq!(file.exception_handlers(0), handlers);
    assert_eq!(
        file.debug_offsets(0),
        Some(DebugOffsets::new(1, 2))
    );
    assert_eq!(module.function(0).info_offset().unwrap() % 4, 0);
}

#[test]
fn info_offsets_are_aligned_even_when_empty() {
    let mut module = module_of([function(&[1]), function(&[2, 3])]);
    roundtrip(&mut module, &SerializerOptions::new());

    let info_0 = module.function(0).info_offset().unwrap();
    let info_1 = module.function(1).info_offset().unwrap();
    assert_eq!(info_0, info_1);
    assert_eq!(info_0 % 4, 0);
}
