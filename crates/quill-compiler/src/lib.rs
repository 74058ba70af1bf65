//! Quill compiler back end: bytecode module model and bytecode file emission.
//!
//! This crate provides:
//! - `module` - the in-memory bytecode module handed over by the code generator
//! - `emit` - the two-pass serializer producing the bytecode file

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod emit;
pub mod module;

#[cfg(test)]
pub mod test_utils;

pub use emit::{BytecodeSerializer, EmitError, SerializerOptions, emit};
pub use module::{
    BytecodeModule, BytecodeModuleBuilder, CjsModuleTable, DebugInfo, FunctionDecl, FunctionEntry,
};
