//! This module defines the core, strongly-typed data representations used at the
//! native boundary.
//!
//! It includes the canonical `Dtype` descriptors, the read-only registry that
//! resolves arbitrary specifiers to them, and the value types that flow through
//! buffers and scalars.

pub mod dtype;
pub mod element;
pub mod registry;
pub mod value;

// Re-export the main type(s) for easier access.
pub use dtype::{Dtype, DtypeKind, ValueClass};
pub use element::Element;
pub use registry::{
    lookup_dtype, lookup_type_name, platform_default_int, DtypeRegistry, DtypeSpecifier, HostType,
};
pub use value::{HostValue, ScalarValue};
