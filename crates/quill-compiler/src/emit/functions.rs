//! Function table, function bodies (with deduplication) and function info blocks.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use quill_bytecode::{ExceptionHandlerTableHeader, INFO_ALIGN, SmallFuncHeader, WORD_ALIGN, align_up};
use tracing::trace;

use crate::module::{BytecodeModule, FunctionEntry};

use super::EmitError;
use super::serializer::BytecodeSerializer;

/// Content key of a function body: exact opcode bytes and jump table words.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct DedupKey<'a> {
    opcodes: &'a [u8],
    jump_tables: &'a [u32],
}

impl<'a> DedupKey<'a> {
    fn of(function: &'a FunctionEntry) -> Self {
        Self {
            opcodes: function.opcodes(),
            jump_tables: function.jump_tables(),
        }
    }
}

impl BytecodeSerializer {
    /// One compact header per function, in table order.
    ///
    /// Headers whose content or offsets exceed the compact widths are written
    /// overflowed; the full header follows in the function's info block.
    pub(super) fn write_function_table(&mut self, module: &mut BytecodeModule) {
        let strip = self.options.strips_debug_info();
        let emitting = !self.is_layout();
        for (index, function) in module.functions_mut().iter_mut().enumerate() {
            if strip {
                // Seen by the info block writer as well.
                function.clear_debug_info_flag();
            }

            if emitting {
                assert!(
                    function.bytecode_offset().is_some(),
                    "function {index} lacks bytecode offset after layout"
                );
                assert!(
                    function.info_offset().is_some(),
                    "function {index} lacks info offset after layout"
                );
            }
            self.stream.write(&SmallFuncHeader::new(&function.header()));
        }
    }

    /// Opcodes and jump tables of every function, sharing identical bodies
    /// when deduplication is enabled.
    pub(super) fn write_function_bodies(
        &mut self,
        module: &mut BytecodeModule,
    ) -> Result<(), EmitError> {
        let dedup = self.options.deduplicates();
        let mut offsets = Vec::with_capacity(module.functions().len());
        let mut seen: HashMap<DedupKey<'_>, u32> = HashMap::new();

        for (index, function) in module.functions().iter().enumerate() {
            let loc = self.loc()?;

            if dedup {
                let reused = if self.is_layout() {
                    match seen.entry(DedupKey::of(function)) {
                        Entry::Occupied(first) => Some(*first.get()),
                        Entry::Vacant(slot) => {
                            slot.insert(loc);
                            None
                        }
                    }
                } else {
                    // A body laid out earlier in the stream was reused.
                    let offset = function
                        .bytecode_offset()
                        .expect("function lacks bytecode offset after layout");
                    assert!(
                        offset <= loc,
                        "function {index} has offset {offset} past stream position {loc}"
                    );
                    (offset < loc).then_some(offset)
                };

                if let Some(offset) = reused {
                    if self.is_layout() {
                        self.deduplicated += 1;
                        trace!(function = index, offset, "reusing identical bytecode");
                    }
                    offsets.push(offset);
                    continue;
                }
            }

            if !self.is_layout() {
                assert_eq!(
                    function.bytecode_offset(),
                    Some(loc),
                    "function {index} bytecode moved since layout"
                );
            }
            offsets.push(loc);
            self.write_body(function);
        }
        drop(seen);

        if self.is_layout() {
            for (function, offset) in module.functions_mut().iter_mut().zip(offsets) {
                function.record_bytecode_offset(offset);
            }
        }
        Ok(())
    }

    fn write_body(&mut self, function: &FunctionEntry) {
        self.stream.write_bytes(function.opcodes());

        // Jump tables follow the opcodes, word aligned.
        self.stream.pad(WORD_ALIGN);
        self.stream.write_array(function.jump_tables());

        let percent = self.options.body_padding_percent() as usize;
        if percent > 0 {
            let size = function.opcodes().len() * percent / 100;
            self.stream.write_zeros(size);
            self.stream.pad(WORD_ALIGN);
        }
    }

    /// The function's info block: optional full header, exception handler
    /// table and debug offsets, each aligned to `INFO_ALIGN`.
    pub(super) fn write_function_info(
        &mut self,
        module: &mut BytecodeModule,
        index: usize,
    ) -> Result<(), EmitError> {
        let info_offset = align_up(self.loc()? as usize, INFO_ALIGN) as u32;
        let function = &mut module.functions_mut()[index];
        if self.is_layout() {
            function.record_info_offset(info_offset);
        } else {
            assert_eq!(
                function.info_offset(),
                Some(info_offset),
                "function {index} info block moved since layout"
            );
        }

        // Both offsets are recorded by now, so the overflow decision matches
        // the one taken for the function table entry.
        let header = function.header();
        if !header.fits_small() {
            self.stream.pad(INFO_ALIGN);
            self.stream.write(&header);
        }

        let handlers = function.exception_handlers();
        if function.flags().has_exception_handler() {
            self.stream.pad(INFO_ALIGN);
            self.stream.write(&ExceptionHandlerTableHeader {
                count: handlers.len() as u32,
            });
            self.stream.write_array(handlers);
        }

        if !self.options.strips_debug_info() && function.has_debug_info() {
            let offsets = function
                .debug_offsets()
                .expect("function flagged with debug info has no debug offsets");
            self.stream.pad(INFO_ALIGN);
            self.stream.write(offsets);
        }
        Ok(())
    }
}
