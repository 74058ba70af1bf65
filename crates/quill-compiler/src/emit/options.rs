//! Configuration for bytecode emission.

use serde::Deserialize;

/// Serializer configuration.
///
/// Deserializable so drivers can load it from a config file; missing keys
/// take their defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SerializerOptions {
    /// Omit per-function debug offsets and emit a zeroed debug info header.
    pub(crate) strip_debug_info_section: bool,
    /// Reuse the bytes of identical function bodies.
    pub(crate) optimization_enabled: bool,
    /// Append this percentage of each body's opcode length as zero bytes.
    pub(crate) pad_function_bodies_percent: u32,
}

impl SerializerOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to strip debug info.
    pub fn strip_debug_info_section(mut self, value: bool) -> Self {
        self.strip_debug_info_section = value;
        self
    }

    /// Set whether to deduplicate identical function bodies.
    pub fn optimization_enabled(mut self, value: bool) -> Self {
        self.optimization_enabled = value;
        self
    }

    /// Set the function body padding percentage.
    pub fn pad_function_bodies_percent(mut self, value: u32) -> Self {
        self.pad_function_bodies_percent = value;
        self
    }

    pub fn strips_debug_info(&self) -> bool {
        self.strip_debug_info_section
    }

    pub fn deduplicates(&self) -> bool {
        self.optimization_enabled
    }

    pub fn body_padding_percent(&self) -> u32 {
        self.pad_function_bodies_percent
    }
}
