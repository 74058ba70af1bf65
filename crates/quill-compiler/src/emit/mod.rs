//! Bytecode file emission.
//!
//! Serializes a [`BytecodeModule`](crate::BytecodeModule) into the flat file
//! format. The header at the front of the file records sizes and offsets of
//! content written after it, so the whole section sequence runs twice:
//! - layout: discards bytes, records every offset and the file length
//! - emit: writes real bytes using the offsets recorded during layout
//!
//! Section order: Header → FunctionTable → StringTable → ArrayBuffer →
//! ObjectBuffers → RegExps → CJSModuleTable → FunctionBodies → FunctionInfo →
//! DebugInfo

mod debug_info;
mod error;
mod functions;
mod options;
mod serializer;
mod stream;
mod tables;

#[cfg(test)]
mod debug_info_tests;
#[cfg(test)]
mod functions_tests;
#[cfg(test)]
mod tables_tests;

pub use error::EmitError;
pub use options::SerializerOptions;
pub use serializer::{BytecodeSerializer, emit};
pub use stream::BinaryStream;
