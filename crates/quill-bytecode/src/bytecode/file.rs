//! Read-only view over a serialized bytecode file.
//!
//! [`BytecodeFile`] validates the header and decodes records lazily. It is the
//! reader-side counterpart of the serializer and follows the same layout rules.

use std::io;
use std::path::Path;

use super::constants::{FILE_HEADER_SIZE, INFO_ALIGN, VERSION, align_up};
use super::debug::{DebugFileRegion, DebugInfoHeader, DebugOffsets};
use super::function_header::{FunctionHeader, SmallFuncHeader};
use super::header::{FileHeader, SectionOffsets};
use super::record::{Record, read_u32_le};
use super::sections::{ExceptionHandlerInfo, ExceptionHandlerTableHeader, RegExpTableEntry};
use super::string_table::{OverflowStringTableEntry, SmallStringTableEntry, StringTableEntry};

/// File load error.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("invalid magic: expected QUILLHBC")]
    InvalidMagic,
    #[error("unsupported version: {0} (expected {VERSION})")]
    UnsupportedVersion(u32),
    #[error("file too small: {0} bytes (minimum {FILE_HEADER_SIZE})")]
    FileTooSmall(usize),
    #[error("size mismatch: header says {header} bytes, got {actual}")]
    SizeMismatch { header: u32, actual: usize },
    #[error("{section} section out of bounds: ends at {end}, file is {len} bytes")]
    SectionOutOfBounds {
        section: &'static str,
        end: usize,
        len: usize,
    },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Decoded CJS module table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CjsTable {
    /// `(source string id, function index)` pairs in insertion order.
    Dynamic(Vec<(u32, u32)>),
    /// Function index per module, indexed by module id minus the CJS module offset.
    Static(Vec<u32>),
}

impl CjsTable {
    pub fn len(&self) -> usize {
        match self {
            Self::Dynamic(entries) => entries.len(),
            Self::Static(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A serialized bytecode file.
#[derive(Debug)]
pub struct BytecodeFile {
    bytes: Vec<u8>,
    header: FileHeader,
    /// Cached section offsets (computed from header counts).
    offsets: SectionOffsets,
}

impl BytecodeFile {
    /// Load from owned bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, FileError> {
        if bytes.len() < FILE_HEADER_SIZE {
            return Err(FileError::FileTooSmall(bytes.len()));
        }

        let header = FileHeader::from_bytes(&bytes[..FILE_HEADER_SIZE]);

        if !header.validate_magic() {
            return Err(FileError::InvalidMagic);
        }
        if !header.validate_version() {
            return Err(FileError::UnsupportedVersion(header.version));
        }
        if header.file_length as usize != bytes.len() {
            return Err(FileError::SizeMismatch {
                header: header.file_length,
                actual: bytes.len(),
            });
        }

        let offsets = header.compute_offsets();
        check_bounds("fixed", offsets.function_bodies as usize, bytes.len())?;
        check_bounds(
            "debug info",
            offsets.debug_info as usize + DebugInfoHeader::SIZE,
            bytes.len(),
        )?;

        Ok(Self {
            bytes,
            header,
            offsets,
        })
    }

    /// Load from a file path.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FileError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes)
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn offsets(&self) -> &SectionOffsets {
        &self.offsets
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn function_count(&self) -> usize {
        self.header.function_count as usize
    }

    /// The compact function table entry, as stored.
    pub fn small_function_header(&self, index: usize) -> SmallFuncHeader {
        assert!(index < self.function_count(), "function {index} out of range");
        let at = self.offsets.function_table as usize + index * SmallFuncHeader::SIZE;
        SmallFuncHeader::from_bytes(&self.bytes[at..])
    }

    /// The function header, read from the info block when overflowed.
    pub fn function_header(&self, index: usize) -> FunctionHeader {
        let small = self.small_function_header(index);
        if small.is_overflowed() {
            let at = small.large_header_offset() as usize;
            FunctionHeader::from_bytes(&self.bytes[at..])
        } else {
            small.to_full()
        }
    }

    /// Opcode bytes of a function. Deduplicated functions share a slice.
    pub fn function_bytecode(&self, index: usize) -> &[u8] {
        let header = self.function_header(index);
        let start = header.offset as usize;
        &self.bytes[start..start + header.bytecode_size as usize]
    }

    pub fn exception_handlers(&self, index: usize) -> Vec<ExceptionHandlerInfo> {
        let header = self.function_header(index);
        if !header.flags.has_exception_handler() {
            return Vec::new();
        }

        let at = align_up(self.info_cursor(index, &header), INFO_ALIGN);
        let count = read_u32_le(&self.bytes, at) as usize;
        let records = at + ExceptionHandlerTableHeader::SIZE;
        (0..count)
            .map(|i| {
                ExceptionHandlerInfo::from_bytes(
                    &self.bytes[records + i * ExceptionHandlerInfo::SIZE..],
                )
            })
            .collect()
    }

    pub fn debug_offsets(&self, index: usize) -> Option<DebugOffsets> {
        let header = self.function_header(index);
        if !header.flags.has_debug_info() {
            return None;
        }

        let mut at = self.info_cursor(index, &header);
        if header.flags.has_exception_handler() {
            at = align_up(at, INFO_ALIGN);
            let count = read_u32_le(&self.bytes, at) as usize;
            at += ExceptionHandlerTableHeader::SIZE + count * ExceptionHandlerInfo::SIZE;
        }
        at = align_up(at, INFO_ALIGN);
        Some(DebugOffsets::from_bytes(&self.bytes[at..]))
    }

    /// Position in the info block after the optional full header.
    fn info_cursor(&self, index: usize, header: &FunctionHeader) -> usize {
        let mut at = header.info_offset as usize;
        if self.small_function_header(index).is_overflowed() {
            at += FunctionHeader::SIZE;
        }
        at
    }

    pub fn string_count(&self) -> usize {
        self.header.string_count as usize
    }

    pub fn overflow_string_count(&self) -> usize {
        let small_bytes = self.string_count() * SmallStringTableEntry::SIZE;
        (self.header.string_table_bytes as usize - small_bytes) / OverflowStringTableEntry::SIZE
    }

    /// The compact string table entry, as stored.
    pub fn small_string_entry(&self, index: usize) -> SmallStringTableEntry {
        assert!(index < self.string_count(), "string {index} out of range");
        let at = self.offsets.string_table as usize + index * SmallStringTableEntry::SIZE;
        SmallStringTableEntry::from_bytes(&self.bytes[at..])
    }

    /// The string descriptor, resolved through the overflow table if needed.
    pub fn string_entry(&self, index: usize) -> StringTableEntry {
        let small = self.small_string_entry(index);
        if !small.is_overflowed() {
            return StringTableEntry::new(small.offset, small.length, small.is_utf16);
        }

        let at = self.offsets.overflow_string_table as usize
            + small.offset as usize * OverflowStringTableEntry::SIZE;
        let overflow = OverflowStringTableEntry::from_bytes(&self.bytes[at..]);
        StringTableEntry::new(overflow.offset, overflow.length, small.is_utf16)
    }

    /// Raw storage bytes of a string.
    pub fn string_bytes(&self, index: usize) -> &[u8] {
        let range = self.string_entry(index).byte_range();
        &self.string_storage()[range]
    }

    pub fn string_storage(&self) -> &[u8] {
        self.section(
            self.offsets.string_storage,
            self.header.string_storage_size as usize,
        )
    }

    pub fn identifier_hash(&self, index: usize) -> u32 {
        assert!(
            index < self.header.identifier_count as usize,
            "identifier {index} out of range"
        );
        read_u32_le(
            &self.bytes,
            self.offsets.identifier_hashes as usize + index * 4,
        )
    }

    pub fn array_buffer(&self) -> &[u8] {
        self.section(
            self.offsets.array_buffer,
            self.header.array_buffer_size as usize,
        )
    }

    pub fn obj_key_buffer(&self) -> &[u8] {
        self.section(
            self.offsets.obj_key_buffer,
            self.header.obj_key_buffer_size as usize,
        )
    }

    pub fn obj_value_buffer(&self) -> &[u8] {
        self.section(
            self.offsets.obj_value_buffer,
            self.header.obj_value_buffer_size as usize,
        )
    }

    pub fn regexp_entry(&self, index: usize) -> RegExpTableEntry {
        assert!(
            index < self.header.regexp_count as usize,
            "regexp {index} out of range"
        );
        let at = self.offsets.regexp_table as usize + index * RegExpTableEntry::SIZE;
        RegExpTableEntry::from_bytes(&self.bytes[at..])
    }

    pub fn regexp_bytes(&self, index: usize) -> &[u8] {
        let entry = self.regexp_entry(index);
        let storage = self.section(
            self.offsets.regexp_storage,
            self.header.regexp_storage_size as usize,
        );
        &storage[entry.offset as usize..(entry.offset + entry.length) as usize]
    }

    pub fn cjs_modules(&self) -> CjsTable {
        let at = self.offsets.cjs_module_table as usize;
        let count = self.header.cjs_entry_count() as usize;
        if self.header.cjs_is_static() {
            CjsTable::Static(
                (0..count)
                    .map(|i| read_u32_le(&self.bytes, at + i * 4))
                    .collect(),
            )
        } else {
            CjsTable::Dynamic(
                (0..count)
                    .map(|i| {
                        let entry = at + i * 8;
                        (
                            read_u32_le(&self.bytes, entry),
                            read_u32_le(&self.bytes, entry + 4),
                        )
                    })
                    .collect(),
            )
        }
    }

    pub fn debug_info_header(&self) -> DebugInfoHeader {
        DebugInfoHeader::from_bytes(&self.bytes[self.offsets.debug_info as usize..])
    }

    pub fn debug_filenames(&self) -> Vec<StringTableEntry> {
        let header = self.debug_info_header();
        let at = self.offsets.debug_info as usize + DebugInfoHeader::SIZE;
        (0..header.filename_count as usize)
            .map(|i| StringTableEntry::from_bytes(&self.bytes[at + i * StringTableEntry::SIZE..]))
            .collect()
    }

    pub fn debug_file_regions(&self) -> Vec<DebugFileRegion> {
        let header = self.debug_info_header();
        let at = self.debug_filename_storage_end();
        (0..header.file_region_count as usize)
            .map(|i| DebugFileRegion::from_bytes(&self.bytes[at + i * DebugFileRegion::SIZE..]))
            .collect()
    }

    pub fn debug_data(&self) -> &[u8] {
        let header = self.debug_info_header();
        let at = self.debug_filename_storage_end()
            + header.file_region_count as usize * DebugFileRegion::SIZE;
        &self.bytes[at..at + header.debug_data_size as usize]
    }

    fn debug_filename_storage_end(&self) -> usize {
        let header = self.debug_info_header();
        self.offsets.debug_info as usize
            + DebugInfoHeader::SIZE
            + header.filename_count as usize * StringTableEntry::SIZE
            + header.filename_storage_size as usize
    }

    fn section(&self, offset: u32, len: usize) -> &[u8] {
        let start = offset as usize;
        &self.bytes[start..start + len]
    }
}

fn check_bounds(section: &'static str, end: usize, len: usize) -> Result<(), FileError> {
    if end > len {
        return Err(FileError::SectionOutOfBounds { section, end, len });
    }
    Ok(())
}
