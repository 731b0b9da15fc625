//! The process-wide, read-only dtype registry.
//!
//! The registry is built exactly once, on first use, from the canonical
//! descriptors in `dtype.rs` plus a fixed alias table. There is no mutation path
//! after construction, so it is shared without locking.

use arrow::datatypes::DataType as ArrowDataType;
use hashbrown::HashMap;
use once_cell::sync::Lazy;

use crate::error::{GrblasError, Result};
use crate::types::dtype::{
    Dtype, DtypeKind, BOOL, CANONICAL_DTYPES, FP32, FP64, INDEX, INT16, INT32, INT64, INT8,
    UINT16, UINT32, UINT64, UINT8,
};
use crate::types::element::Element;

//==================================================================================
// 1. Specifiers
//==================================================================================

/// A host scalar type object (`bool`, `int`, `float`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostType {
    Bool,
    Int,
    Float,
    Str,
    NoneType,
}

impl HostType {
    pub fn name(&self) -> &'static str {
        match self {
            HostType::Bool => "bool",
            HostType::Int => "int",
            HostType::Float => "float",
            HostType::Str => "str",
            HostType::NoneType => "NoneType",
        }
    }

    /// Parses the `__name__` of a host type object.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bool" => Some(HostType::Bool),
            "int" => Some(HostType::Int),
            "float" => Some(HostType::Float),
            "str" => Some(HostType::Str),
            "NoneType" => Some(HostType::NoneType),
            _ => None,
        }
    }
}

/// Anything that can be resolved to a dtype descriptor.
#[derive(Debug, Clone, Copy)]
pub enum DtypeSpecifier<'a> {
    /// A canonical name, native type name, C type, host array element name or alias.
    Name(&'a str),
    /// An already-resolved descriptor.
    Descriptor(&'static Dtype),
    /// A host scalar type object.
    Host(HostType),
    /// An Arrow data type.
    Arrow(&'a ArrowDataType),
}

impl DtypeSpecifier<'_> {
    /// The specifier for a Rust element type, e.g. `DtypeSpecifier::of::<i16>()`.
    pub fn of<T: Element>() -> DtypeSpecifier<'static> {
        DtypeSpecifier::Descriptor(T::dtype())
    }
}

impl<'a> From<&'a str> for DtypeSpecifier<'a> {
    fn from(name: &'a str) -> Self {
        DtypeSpecifier::Name(name)
    }
}

impl<'a> From<&'a String> for DtypeSpecifier<'a> {
    fn from(name: &'a String) -> Self {
        DtypeSpecifier::Name(name.as_str())
    }
}

impl From<&'static Dtype> for DtypeSpecifier<'_> {
    fn from(dtype: &'static Dtype) -> Self {
        DtypeSpecifier::Descriptor(dtype)
    }
}

impl From<DtypeKind> for DtypeSpecifier<'_> {
    fn from(kind: DtypeKind) -> Self {
        DtypeSpecifier::Descriptor(kind.dtype())
    }
}

impl From<HostType> for DtypeSpecifier<'_> {
    fn from(host: HostType) -> Self {
        DtypeSpecifier::Host(host)
    }
}

impl<'a> From<&'a ArrowDataType> for DtypeSpecifier<'a> {
    fn from(dt: &'a ArrowDataType) -> Self {
        DtypeSpecifier::Arrow(dt)
    }
}

//==================================================================================
// 2. Registry
//==================================================================================

pub struct DtypeRegistry {
    index: HashMap<&'static str, &'static Dtype>,
}

static REGISTRY: Lazy<DtypeRegistry> = Lazy::new(DtypeRegistry::build);

/// The dtype the host picks for plain integers: its C `long`, which is 32 bits
/// wide on Windows even on 64-bit targets.
pub fn platform_default_int() -> &'static Dtype {
    if cfg!(windows) {
        &INT32
    } else {
        &INT64
    }
}

fn platform_default_uint() -> &'static Dtype {
    if cfg!(windows) {
        &UINT32
    } else {
        &UINT64
    }
}

fn pointer_sized(signed: bool) -> &'static Dtype {
    match (cfg!(target_pointer_width = "64"), signed) {
        (true, true) => &INT64,
        (true, false) => &UINT64,
        (false, true) => &INT32,
        (false, false) => &UINT32,
    }
}

impl DtypeRegistry {
    /// The shared registry instance.
    pub fn global() -> &'static DtypeRegistry {
        &REGISTRY
    }

    fn build() -> Self {
        let mut index: HashMap<&'static str, &'static Dtype> = HashMap::new();
        for &dtype in CANONICAL_DTYPES.iter() {
            for key in [dtype.name, dtype.gb_name, dtype.c_type, dtype.np_type] {
                index.entry(key).or_insert(dtype);
            }
        }
        index.insert(INDEX.c_type, &INDEX);

        let aliases: [(&'static str, &'static Dtype); 27] = [
            // one-character host array codes
            ("?", &BOOL),
            ("b", &INT8),
            ("B", &UINT8),
            ("h", &INT16),
            ("H", &UINT16),
            ("i", &INT32),
            ("I", &UINT32),
            ("q", &INT64),
            ("Q", &UINT64),
            ("f", &FP32),
            ("d", &FP64),
            // C-named host array types
            ("bool_", &BOOL),
            ("byte", &INT8),
            ("ubyte", &UINT8),
            ("short", &INT16),
            ("ushort", &UINT16),
            ("intc", &INT32),
            ("uintc", &UINT32),
            ("longlong", &INT64),
            ("ulonglong", &UINT64),
            ("single", &FP32),
            ("float_", &FP64),
            ("intp", pointer_sized(true)),
            ("uintp", pointer_sized(false)),
            // platform-dependent `long`
            ("long", platform_default_int()),
            ("int_", platform_default_int()),
            ("ulong", platform_default_uint()),
        ];
        for (alias, dtype) in aliases {
            index.entry(alias).or_insert(dtype);
        }
        index.entry("l").or_insert(platform_default_int());
        index.entry("L").or_insert(platform_default_uint());
        index.entry("uint").or_insert(platform_default_uint());

        log::debug!("dtype registry built with {} keys", index.len());
        Self { index }
    }

    /// Resolves any specifier to its descriptor.
    pub fn lookup<'a>(&self, spec: impl Into<DtypeSpecifier<'a>>) -> Result<&'static Dtype> {
        match spec.into() {
            DtypeSpecifier::Descriptor(dtype) => Ok(dtype),
            DtypeSpecifier::Name(name) => self
                .index
                .get(name)
                .copied()
                .ok_or_else(|| GrblasError::UnknownDtype(name.to_string())),
            DtypeSpecifier::Host(host) => match host {
                HostType::Bool => Ok(&BOOL),
                HostType::Int => Ok(&INT64),
                HostType::Float => Ok(&FP64),
                other => Err(GrblasError::UnknownDtype(format!(
                    "host type {}",
                    other.name()
                ))),
            },
            DtypeSpecifier::Arrow(dt) => Ok(DtypeKind::from_arrow_type(dt)?.dtype()),
        }
    }

    /// The canonical descriptors, in registry order.
    pub fn canonical(&self) -> impl Iterator<Item = &'static Dtype> {
        CANONICAL_DTYPES.iter().copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }
}

/// Resolves `spec` against the global registry.
pub fn lookup_dtype<'a>(spec: impl Into<DtypeSpecifier<'a>>) -> Result<&'static Dtype> {
    DtypeRegistry::global().lookup(spec)
}

/// Resolves the `__name__` of a type object. Host scalar types are tried
/// first so `float` means FP64 here; typed element classes such as `int64` or
/// `float32` then resolve through the registry.
pub fn lookup_type_name(name: &str) -> Result<&'static Dtype> {
    match HostType::from_name(name) {
        Some(host) => lookup_dtype(host),
        None => lookup_dtype(name),
    }
}
