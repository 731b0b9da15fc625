// In: src/config.rs

//! Options controlling how host values are marshalled into native buffers.
//!
//! `MarshalOptions` is created at the binding boundary (from keyword arguments
//! or a JSON document) and passed by reference into the marshaller. Every field
//! has a default so callers only spell out what they need.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{GrblasError, Result};

//==================================================================================
// I. Memory Order
//==================================================================================

/// The element order of a marshalled multi-dimensional buffer.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Order {
    /// **Default:** row-major. This is the only order native calls accept.
    #[default]
    #[serde(rename = "C", alias = "c")]
    C,
    /// Column-major.
    #[serde(rename = "F", alias = "f")]
    F,
}

impl FromStr for Order {
    type Err = GrblasError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "C" | "c" => Ok(Order::C),
            "F" | "f" => Ok(Order::F),
            other => Err(GrblasError::InvalidValueType(format!(
                "order must be 'C' or 'F', not '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Order::C => f.write_str("C"),
            Order::F => f.write_str("F"),
        }
    }
}

//==================================================================================
// II. Marshalling Options
//==================================================================================

/// Options shared by both buffer marshalling entry points.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct MarshalOptions {
    /// Always produce a fresh buffer, even when the input could be viewed in place.
    pub copy: bool,
    /// The result must exclusively own its storage, so it may be retained or
    /// mutated by the native engine after the call returns.
    pub ownable: bool,
    /// Element order of the produced buffer.
    pub order: Order,
}

impl MarshalOptions {
    /// Options for a buffer the native engine is allowed to keep.
    pub fn ownable() -> Self {
        Self {
            ownable: true,
            ..Self::default()
        }
    }

    /// Options that force a copy of the input.
    pub fn copied() -> Self {
        Self {
            copy: true,
            ..Self::default()
        }
    }

    pub fn with_order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    /// Parses options from a JSON object, e.g. `{"ownable": true, "order": "F"}`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
