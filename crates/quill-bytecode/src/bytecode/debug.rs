//! Debug info records.

use super::record::{Record, read_u32_le};

/// Per-function offsets into the debug data blob.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct DebugOffsets {
    /// Start of the function's source location records.
    pub source_locations: u32,
    /// Start of the function's lexical scope data.
    pub lexical_data: u32,
}

impl DebugOffsets {
    pub fn new(source_locations: u32, lexical_data: u32) -> Self {
        Self {
            source_locations,
            lexical_data,
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            source_locations: read_u32_le(bytes, 0),
            lexical_data: read_u32_le(bytes, 4),
        }
    }
}

impl Record for DebugOffsets {
    const SIZE: usize = 8;

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.source_locations.to_le_bytes());
        out.extend_from_slice(&self.lexical_data.to_le_bytes());
    }
}

/// Header of the debug info section (20 bytes).
///
/// All fields are zero when debug info was stripped.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct DebugInfoHeader {
    pub filename_count: u32,
    pub filename_storage_size: u32,
    pub file_region_count: u32,
    /// Offset within the debug data where lexical scope data begins.
    pub lexical_data_offset: u32,
    pub debug_data_size: u32,
}

impl DebugInfoHeader {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            filename_count: read_u32_le(bytes, 0),
            filename_storage_size: read_u32_le(bytes, 4),
            file_region_count: read_u32_le(bytes, 8),
            lexical_data_offset: read_u32_le(bytes, 12),
            debug_data_size: read_u32_le(bytes, 16),
        }
    }
}

impl Record for DebugInfoHeader {
    const SIZE: usize = 20;

    fn encode(&self, out: &mut Vec<u8>) {
        for field in [
            self.filename_count,
            self.filename_storage_size,
            self.file_region_count,
            self.lexical_data_offset,
            self.debug_data_size,
        ] {
            out.extend_from_slice(&field.to_le_bytes());
        }
    }
}

/// Maps a range of debug data addresses to the file it came from.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct DebugFileRegion {
    /// First debug data offset covered by this region.
    pub from_address: u32,
    /// Index into the debug filename table.
    pub filename_id: u32,
    /// Index into the debug filename table, or 0 when there is no source map.
    pub source_mapping_url_id: u32,
}

impl DebugFileRegion {
    pub fn new(from_address: u32, filename_id: u32, source_mapping_url_id: u32) -> Self {
        Self {
            from_address,
            filename_id,
            source_mapping_url_id,
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            from_address: read_u32_le(bytes, 0),
            filename_id: read_u32_le(bytes, 4),
            source_mapping_url_id: read_u32_le(bytes, 8),
        }
    }
}

impl Record for DebugFileRegion {
    const SIZE: usize = 12;

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.from_address.to_le_bytes());
        out.extend_from_slice(&self.filename_id.to_le_bytes());
        out.extend_from_slice(&self.source_mapping_url_id.to_le_bytes());
    }
}
