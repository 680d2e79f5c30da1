//! Wire-type resolution.
//!
//! Maps shapes (and values, through their shape) to the runtime's type
//! vocabulary: `Address`, `Raw`, `U<bits>`, `Vec<T>` and tuples. Struct keys
//! have no wire representation, so a struct resolves to the tuple of its
//! field types.

use crate::error::CodecError;
use crate::shape::Shape;
use crate::value::Value;
use std::fmt;

/// Wire-level classification of a shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WireType {
    /// Fixed-width identifier, width in bytes.
    Address(usize),
    /// Compact-length-prefixed bytes.
    Raw,
    /// Little-endian unsigned integer, width in bits.
    Uint(u16),
    /// Compact-count-prefixed sequence.
    Vec(Box<WireType>),
    /// Concatenation of components.
    Tuple(Vec<WireType>),
}

impl WireType {
    /// Exact encoded size, if it does not depend on the value.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            WireType::Address(width) => Some(*width),
            WireType::Uint(bits) => Some(usize::from(*bits / 8)),
            WireType::Raw | WireType::Vec(_) => None,
            WireType::Tuple(items) => items
                .iter()
                .try_fold(0usize, |acc, t| acc.checked_add(t.fixed_size()?)),
        }
    }

    /// Smallest possible encoded size. A length prefix takes at least one byte.
    pub fn min_size(&self) -> usize {
        match self {
            WireType::Address(width) => *width,
            WireType::Uint(bits) => usize::from(*bits / 8),
            WireType::Raw | WireType::Vec(_) => 1,
            WireType::Tuple(items) => items
                .iter()
                .fold(0usize, |acc, t| acc.saturating_add(t.min_size())),
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireType::Address(_) => write!(f, "Address"),
            WireType::Raw => write!(f, "Raw"),
            WireType::Uint(bits) => write!(f, "U{bits}"),
            WireType::Vec(elem) => write!(f, "Vec<{elem}>"),
            WireType::Tuple(items) => {
                let parts: Vec<_> = items.iter().map(|t| t.to_string()).collect();
                write!(f, "({})", parts.join(", "))
            }
        }
    }
}

/// Resolve the wire type of any shape.
pub fn resolve_wire_type(shape: &Shape) -> WireType {
    match shape {
        Shape::Address(width) => WireType::Address(*width),
        Shape::Bytes => WireType::Raw,
        Shape::Uint(width) => WireType::Uint(width.bits()),
        Shape::List(elem) => WireType::Vec(Box::new(resolve_wire_type(elem))),
        Shape::Tuple(items) => WireType::Tuple(items.iter().map(resolve_wire_type).collect()),
        Shape::Struct(fields) => {
            WireType::Tuple(fields.iter().map(|(_, s)| resolve_wire_type(s)).collect())
        }
    }
}

/// Resolve a shape used as a bare element-type probe.
///
/// Only scalars are accepted here; containers must be described by an
/// explicit element shape rather than probed.
pub fn resolve_element_wire_type(shape: &Shape) -> Result<WireType, CodecError> {
    match shape {
        Shape::Address(_) | Shape::Bytes | Shape::Uint(_) => Ok(resolve_wire_type(shape)),
        Shape::List(_) | Shape::Tuple(_) | Shape::Struct(_) => Err(CodecError::unsupported(
            format!("{} is not a scalar element type", shape.kind()),
        )),
    }
}

/// Wire types of each component of a Tuple or field of a Struct, in order.
pub fn resolve_component_wire_types(shape: &Shape) -> Result<Vec<WireType>, CodecError> {
    match shape {
        Shape::Tuple(items) => Ok(items.iter().map(resolve_wire_type).collect()),
        Shape::Struct(fields) => Ok(fields.iter().map(|(_, s)| resolve_wire_type(s)).collect()),
        other => Err(CodecError::unsupported(format!(
            "{} has no components",
            other.kind()
        ))),
    }
}

impl Value {
    /// Wire type of this value.
    pub fn wire_type(&self) -> WireType {
        resolve_wire_type(&self.shape())
    }
}

impl Shape {
    pub fn wire_type(&self) -> WireType {
        resolve_wire_type(self)
    }
}
