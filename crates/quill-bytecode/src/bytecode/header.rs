//! Bytecode file header (128 bytes).
//!
//! The header sits at the front of the file but records sizes and offsets that
//! are only known once everything after it has been laid out. Offsets of the
//! fixed-order sections are computed from its counts and sizes; the debug info
//! offset is stored explicitly.

use super::constants::{FILE_HEADER_SIZE, MAGIC, SECTION_ALIGN, VERSION, align_up};
use super::function_header::SmallFuncHeader;
use super::hash::SourceHash;
use super::record::{Record, read_u32_le};
use super::sections::RegExpTableEntry;
use super::string_table::SmallStringTableEntry;

/// Bytecode option flags (bit field, copied verbatim from the module).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[repr(transparent)]
pub struct BytecodeOptions(pub u8);

impl BytecodeOptions {
    /// Bit 0: builtins may be called through static builtin ids.
    pub const STATIC_BUILTINS: u8 = 0x01;
    /// Bit 1: CJS `require` calls were resolved at compile time.
    pub const CJS_MODULES_STATICALLY_RESOLVED: u8 = 0x02;

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn static_builtins(self) -> bool {
        self.0 & Self::STATIC_BUILTINS != 0
    }

    pub fn set_static_builtins(&mut self, value: bool) {
        self.set(Self::STATIC_BUILTINS, value);
    }

    pub fn cjs_modules_statically_resolved(self) -> bool {
        self.0 & Self::CJS_MODULES_STATICALLY_RESOLVED != 0
    }

    pub fn set_cjs_modules_statically_resolved(&mut self, value: bool) {
        self.set(Self::CJS_MODULES_STATICALLY_RESOLVED, value);
    }

    fn set(&mut self, bit: u8, value: bool) {
        if value {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }
}

/// File header - first 128 bytes of the bytecode file.
///
/// - 0-31: identity (magic, version, source hash)
/// - 32-91: sizes, counts and offsets (15 × u32/i32)
/// - 92: option flags
/// - 93-127: reserved
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(C)]
pub struct FileHeader {
    /// Magic bytes: b"QUILLHBC"
    pub magic: [u8; 8],
    /// Format version (currently 1)
    pub version: u32,
    /// SHA-1 of the source text
    pub source_hash: SourceHash,
    /// Total file size in bytes
    pub file_length: u32,
    /// Index of the global (top-level) function
    pub global_code_index: u32,
    pub function_count: u32,
    pub string_count: u32,
    pub identifier_count: u32,
    /// Bytes taken by compact string entries plus the overflow side table.
    pub string_table_bytes: u32,
    pub string_storage_size: u32,
    pub regexp_count: u32,
    pub regexp_storage_size: u32,
    pub array_buffer_size: u32,
    pub obj_key_buffer_size: u32,
    pub obj_value_buffer_size: u32,
    /// First CJS module id owned by this file.
    pub cjs_module_offset: u32,
    /// Negative: static table with `-count` entries. Otherwise dynamic pairs.
    pub cjs_module_count: i32,
    pub debug_info_offset: u32,
    pub options: BytecodeOptions,
    // Public for struct update syntax across crates.
    pub _reserved: [u8; 35],
}

const _: () = assert!(std::mem::size_of::<FileHeader>() == FILE_HEADER_SIZE);

impl Default for FileHeader {
    fn default() -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            source_hash: SourceHash::default(),
            file_length: 0,
            global_code_index: 0,
            function_count: 0,
            string_count: 0,
            identifier_count: 0,
            string_table_bytes: 0,
            string_storage_size: 0,
            regexp_count: 0,
            regexp_storage_size: 0,
            array_buffer_size: 0,
            obj_key_buffer_size: 0,
            obj_value_buffer_size: 0,
            cjs_module_offset: 0,
            cjs_module_count: 0,
            debug_info_offset: 0,
            options: BytecodeOptions::default(),
            _reserved: [0; 35],
        }
    }
}

/// Section offsets derived from header counts and sizes.
///
/// Everything up to the function bodies is laid out contiguously in a fixed
/// order, so it can be recomputed by a reader without any stored offsets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SectionOffsets {
    pub function_table: u32,
    pub string_table: u32,
    pub overflow_string_table: u32,
    pub identifier_hashes: u32,
    pub string_storage: u32,
    pub array_buffer: u32,
    pub obj_key_buffer: u32,
    pub obj_value_buffer: u32,
    pub regexp_table: u32,
    pub regexp_storage: u32,
    pub cjs_module_table: u32,
    /// First byte after the CJS table: start of the function bodies.
    pub function_bodies: u32,
    pub debug_info: u32,
}

impl FileHeader {
    /// Decode header from 128 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= FILE_HEADER_SIZE, "header too short");

        let mut magic = [0u8; 8];
        magic.copy_from_slice(&bytes[0..8]);
        let mut source_hash = [0u8; 20];
        source_hash.copy_from_slice(&bytes[12..32]);
        let mut reserved = [0u8; 35];
        reserved.copy_from_slice(&bytes[93..128]);

        Self {
            magic,
            version: read_u32_le(bytes, 8),
            source_hash: SourceHash(source_hash),
            file_length: read_u32_le(bytes, 32),
            global_code_index: read_u32_le(bytes, 36),
            function_count: read_u32_le(bytes, 40),
            string_count: read_u32_le(bytes, 44),
            identifier_count: read_u32_le(bytes, 48),
            string_table_bytes: read_u32_le(bytes, 52),
            string_storage_size: read_u32_le(bytes, 56),
            regexp_count: read_u32_le(bytes, 60),
            regexp_storage_size: read_u32_le(bytes, 64),
            array_buffer_size: read_u32_le(bytes, 68),
            obj_key_buffer_size: read_u32_le(bytes, 72),
            obj_value_buffer_size: read_u32_le(bytes, 76),
            cjs_module_offset: read_u32_le(bytes, 80),
            cjs_module_count: read_u32_le(bytes, 84) as i32,
            debug_info_offset: read_u32_le(bytes, 88),
            options: BytecodeOptions(bytes[92]),
            _reserved: reserved,
        }
    }

    /// Encode header to 128 bytes.
    pub fn to_bytes(&self) -> [u8; FILE_HEADER_SIZE] {
        let mut bytes = [0u8; FILE_HEADER_SIZE];
        bytes[0..8].copy_from_slice(&self.magic);
        bytes[8..12].copy_from_slice(&self.version.to_le_bytes());
        bytes[12..32].copy_from_slice(self.source_hash.as_bytes());
        bytes[32..36].copy_from_slice(&self.file_length.to_le_bytes());
        bytes[36..40].copy_from_slice(&self.global_code_index.to_le_bytes());
        bytes[40..44].copy_from_slice(&self.function_count.to_le_bytes());
        bytes[44..48].copy_from_slice(&self.string_count.to_le_bytes());
        bytes[48..52].copy_from_slice(&self.identifier_count.to_le_bytes());
        bytes[52..56].copy_from_slice(&self.string_table_bytes.to_le_bytes());
        bytes[56..60].copy_from_slice(&self.string_storage_size.to_le_bytes());
        bytes[60..64].copy_from_slice(&self.regexp_count.to_le_bytes());
        bytes[64..68].copy_from_slice(&self.regexp_storage_size.to_le_bytes());
        bytes[68..72].copy_from_slice(&self.array_buffer_size.to_le_bytes());
        bytes[72..76].copy_from_slice(&self.obj_key_buffer_size.to_le_bytes());
        bytes[76..80].copy_from_slice(&self.obj_value_buffer_size.to_le_bytes());
        bytes[80..84].copy_from_slice(&self.cjs_module_offset.to_le_bytes());
        bytes[84..88].copy_from_slice(&self.cjs_module_count.to_le_bytes());
        bytes[88..92].copy_from_slice(&self.debug_info_offset.to_le_bytes());
        bytes[92] = self.options.bits();
        bytes[93..128].copy_from_slice(&self._reserved);
        bytes
    }

    pub fn validate_magic(&self) -> bool {
        self.magic == MAGIC
    }

    pub fn validate_version(&self) -> bool {
        self.version == VERSION
    }

    /// Whether the CJS module table uses the static (precomputed) form.
    pub fn cjs_is_static(&self) -> bool {
        self.cjs_module_count < 0
    }

    /// Number of CJS module table entries, regardless of form.
    pub fn cjs_entry_count(&self) -> u32 {
        self.cjs_module_count.unsigned_abs()
    }

    /// Compute section offsets from counts and sizes.
    ///
    /// Section order:
    /// Header → FunctionTable → StringTable (+ overflow) → IdentifierHashes →
    /// StringStorage → ArrayBuffer → ObjKeys → ObjValues → RegExpTable (aligned) →
    /// RegExpStorage → CJSModuleTable (aligned) → FunctionBodies
    pub fn compute_offsets(&self) -> SectionOffsets {
        let align = SECTION_ALIGN;

        let function_table = FILE_HEADER_SIZE;
        let string_table = function_table + self.function_count as usize * SmallFuncHeader::SIZE;
        let overflow_string_table =
            string_table + self.string_count as usize * SmallStringTableEntry::SIZE;
        let identifier_hashes = string_table + self.string_table_bytes as usize;
        let string_storage = identifier_hashes + self.identifier_count as usize * 4;

        let array_buffer = string_storage + self.string_storage_size as usize;
        let obj_key_buffer = array_buffer + self.array_buffer_size as usize;
        let obj_value_buffer = obj_key_buffer + self.obj_key_buffer_size as usize;

        let regexp_table = align_up(obj_value_buffer + self.obj_value_buffer_size as usize, align);
        let regexp_storage = regexp_table + self.regexp_count as usize * RegExpTableEntry::SIZE;

        let cjs_module_table = align_up(regexp_storage + self.regexp_storage_size as usize, align);
        let cjs_entry_size = if self.cjs_is_static() { 4 } else { 8 };
        let function_bodies = cjs_module_table + self.cjs_entry_count() as usize * cjs_entry_size;

        SectionOffsets {
            function_table: function_table as u32,
            string_table: string_table as u32,
            overflow_string_table: overflow_string_table as u32,
            identifier_hashes: identifier_hashes as u32,
            string_storage: string_storage as u32,
            array_buffer: array_buffer as u32,
            obj_key_buffer: obj_key_buffer as u32,
            obj_value_buffer: obj_value_buffer as u32,
            regexp_table: regexp_table as u32,
            regexp_storage: regexp_storage as u32,
            cjs_module_table: cjs_module_table as u32,
            function_bodies: function_bodies as u32,
            debug_info: self.debug_info_offset,
        }
    }
}

impl Record for FileHeader {
    const SIZE: usize = FILE_HEADER_SIZE;

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_bytes());
    }
}
