// In: src/buffer/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Buffer Layer
// ====================================================================================
//
// The `buffer` layer turns host values into memory the native engine can read (or
// keep). It sits between the dtype registry and the call-argument adapters.
//
// Data Flow:
//
//   1. [Host Input (HostInput)]           -> plain sequence of HostValue, or a HostArray
//         |
//         `-> dtype given? resolve it through the registry
//         `-> dtype omitted? infer it from the input (values only)
//
//   2. [Marshaller (marshal_*_buffer)]    -> TypedBuffer<'a>
//         |
//         `-> Borrowed(BufferView<'a>) when a typed array can be viewed in place
//         `-> Owned(OwnedBuffer) otherwise, or whenever `ownable` is requested
//
//   3. [Call-Argument Adapters (ffi)]     -> address + debug name for the native call
//
// ====================================================================================
pub mod host;
pub mod marshal;
pub mod typed;

pub use host::{HostArray, HostInput, Shaped};
pub use marshal::{infer_value_dtype, marshal_index_buffer, marshal_value_buffer, resolve_shape};
pub use typed::{BufferView, OwnedBuffer, TypedBuffer};

#[cfg(test)]
mod tests;
