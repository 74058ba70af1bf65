//! Tests for the string, buffer, regexp and CJS table encoders.

use quill_bytecode::{
    OverflowStringTableEntry, RegExpTableEntry, SmallStringTableEntry, SourceHash,
    StringTableEntry,
};

use super::serializer::Pass;
use super::tables::compact_string_entry;
use super::{BinaryStream, BytecodeSerializer, EmitError, SerializerOptions};
use crate::BytecodeModule;

fn emitting() -> BytecodeSerializer {
    let mut serializer = BytecodeSerializer::new(SourceHash::default(), SerializerOptions::new());
    serializer.pass = Pass::Emit;
    serializer.stream = BinaryStream::emit(0);
    serializer
}

fn written(serializer: BytecodeSerializer) -> Vec<u8> {
    serializer.stream.into_bytes()
}

#[test]
fn string_table_spills_large_entries() {
    let mut builder = BytecodeModule::builder();
    builder.add_string_entry(StringTableEntry::new(0, 3, false));
    builder.add_string_entry(StringTableEntry::new(1 << 23, 2, false));
    builder.add_string_entry(StringTableEntry::new(5, 300, true));
    builder.extend_string_storage(b"abc");
    let module = builder.build();

    let mut serializer = emitting();
    serializer.write_string_table(&module).unwrap();
    assert_eq!(serializer.string_table_bytes, 3 * 4 + 2 * 8);

    let bytes = written(serializer);
    let entries: Vec<_> = (0..3)
        .map(|i| SmallStringTableEntry::from_bytes(&bytes[i * 4..]))
        .collect();
    assert!(!entries[0].is_overflowed());
    assert_eq!((entries[0].offset, entries[0].length), (0, 3));
    assert!(entries[1].is_overflowed());
    assert_eq!(entries[1].offset, 0);
    assert!(entries[2].is_overflowed());
    assert!(entries[2].is_utf16);
    assert_eq!(entries[2].offset, 1);

    assert_eq!(
        OverflowStringTableEntry::from_bytes(&bytes[12..]),
        OverflowStringTableEntry::new(1 << 23, 2)
    );
    assert_eq!(
        OverflowStringTableEntry::from_bytes(&bytes[20..]),
        OverflowStringTableEntry::new(5, 300)
    );
    assert_eq!(&bytes[28..], b"abc");
}

#[test]
fn length_254_stays_compact() {
    let mut builder = BytecodeModule::builder();
    builder.add_string_entry(StringTableEntry::new(0, 254, false));
    builder.add_string_entry(StringTableEntry::new(0, 255, false));
    let module = builder.build();

    let mut serializer = emitting();
    serializer.write_string_table(&module).unwrap();
    let bytes = written(serializer);

    assert!(!SmallStringTableEntry::from_bytes(&bytes[0..]).is_overflowed());
    assert!(SmallStringTableEntry::from_bytes(&bytes[4..]).is_overflowed());
    assert_eq!(bytes.len(), 2 * 4 + 8);
}

#[test]
fn identifier_hashes_precede_storage() {
    let mut builder = BytecodeModule::builder();
    builder.add_string("x");
    builder.add_identifier_hash(0x0102_0304);
    let module = builder.build();

    let mut serializer = emitting();
    serializer.write_string_table(&module).unwrap();

    assert_eq!(&written(serializer)[4..], &[4, 3, 2, 1, b'x']);
}

#[test]
fn overflow_index_beyond_compact_field_is_an_error() {
    let long = StringTableEntry::new(0, 300, false);
    let index = SmallStringTableEntry::MAX_OVERFLOW_INDEX + 1;

    let err = compact_string_entry(7, &long, index).unwrap_err();
    assert!(matches!(err, EmitError::OverflowStringTableFull { string: 7 }));
}

#[test]
fn last_overflow_index_is_accepted() {
    let long = StringTableEntry::new(0, 300, true);
    let index = SmallStringTableEntry::MAX_OVERFLOW_INDEX;

    let small = compact_string_entry(0, &long, index).unwrap();
    assert!(small.is_overflowed());
    assert_eq!(small.offset as usize, index);
    assert_eq!(SmallStringTableEntry::from_bytes(&small.to_bytes()), small);
}

#[test]
fn fitting_entry_ignores_full_overflow_table() {
    let short = StringTableEntry::new(16, 4, false);
    let index = SmallStringTableEntry::MAX_OVERFLOW_INDEX + 1;

    let small = compact_string_entry(0, &short, index).unwrap();
    assert!(!small.is_overflowed());
    assert_eq!((small.offset, small.length), (16, 4));
}

#[test]
fn layout_measures_string_table_bytes() {
    let mut builder = BytecodeModule::builder();
    builder.add_string_entry(StringTableEntry::new(0, 1000, false));
    let module = builder.build();

    let mut serializer = BytecodeSerializer::new(SourceHash::default(), SerializerOptions::new());
    serializer.write_string_table(&module).unwrap();

    assert_eq!(serializer.string_table_bytes, 12);
    assert_eq!(serializer.stream.loc(), 12);
}

#[test]
fn object_buffer_writes_keys_then_values() {
    let mut builder = BytecodeModule::builder();
    builder.array_buffer(vec![9]).object_buffers(vec![1, 2], vec![3]);
    let module = builder.build();

    let mut serializer = emitting();
    serializer.write_array_buffer(&module);
    serializer.write_object_buffer(&module);

    assert_eq!(written(serializer), [9, 1, 2, 3]);
}

#[test]
fn regexps_start_section_aligned() {
    let mut builder = BytecodeModule::builder();
    builder.array_buffer(vec![0xee]);
    builder.add_regexp(&[7, 8]);
    let module = builder.build();

    let mut serializer = emitting();
    serializer.write_array_buffer(&module);
    serializer.write_regexps(&module);
    let bytes = written(serializer);

    assert_eq!(&bytes[..4], &[0xee, 0, 0, 0]);
    assert_eq!(RegExpTableEntry::from_bytes(&bytes[4..]), RegExpTableEntry::new(0, 2));
    assert_eq!(&bytes[12..], &[7, 8]);
}

#[test]
fn dynamic_cjs_modules_are_pairs() {
    let mut builder = BytecodeModule::builder();
    builder.add_cjs_module(5, 1).add_cjs_module(6, 2);
    let module = builder.build();

    let mut serializer = emitting();
    serializer.write_cjs_module_table(&module);

    assert_eq!(
        written(serializer),
        [5, 0, 0, 0, 1, 0, 0, 0, 6, 0, 0, 0, 2, 0, 0, 0]
    );
}

#[test]
fn static_cjs_modules_are_function_indices() {
    let mut builder = BytecodeModule::builder();
    builder.array_buffer(vec![1, 2]);
    builder.add_static_cjs_module(3).add_static_cjs_module(4);
    let module = builder.build();

    let mut serializer = emitting();
    serializer.write_array_buffer(&module);
    serializer.write_cjs_module_table(&module);

    assert_eq!(written(serializer), [1, 2, 0, 0, 3, 0, 0, 0, 4, 0, 0, 0]);
}

#[test]
fn empty_tables_write_nothing() {
    let module = BytecodeModule::default();

    let mut serializer = emitting();
    serializer.write_string_table(&module).unwrap();
    serializer.write_array_buffer(&module);
    serializer.write_object_buffer(&module);
    serializer.write_regexps(&module);
    serializer.write_cjs_module_table(&module);

    assert_eq!(serializer.string_table_bytes, 0);
    assert!(written(serializer).is_empty());
}
