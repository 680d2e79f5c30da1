//! Shape descriptors.
//!
//! The wire format carries no type tags, so every decode is driven by a
//! `Shape` supplied by the caller. A shape mirrors the recursive structure of
//! a [`Value`](crate::value::Value) without any leaf magnitudes.

use crate::error::CodecError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of an address when none is given explicitly (AccountId32).
pub const DEFAULT_ADDRESS_WIDTH: usize = 32;

/// Bit-width of an unsigned integer.
///
/// Always a multiple of 8 in `8..=256`, so the encoded size is exactly
/// `bits / 8` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct UintWidth(u16);

impl UintWidth {
    pub const U8: Self = Self(8);
    pub const U16: Self = Self(16);
    pub const U32: Self = Self(32);
    pub const U64: Self = Self(64);
    pub const U128: Self = Self(128);
    pub const U256: Self = Self(256);

    pub fn new(bits: u16) -> Result<Self, CodecError> {
        if bits == 0 || bits > 256 || bits % 8 != 0 {
            return Err(CodecError::InvalidWidth { bits });
        }
        Ok(Self(bits))
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    /// Encoded size in bytes.
    pub fn byte_len(self) -> usize {
        usize::from(self.0 / 8)
    }
}

impl TryFrom<u16> for UintWidth {
    type Error = CodecError;

    fn try_from(bits: u16) -> Result<Self, Self::Error> {
        Self::new(bits)
    }
}

impl From<UintWidth> for u16 {
    fn from(width: UintWidth) -> Self {
        width.0
    }
}

impl fmt::Display for UintWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Structural descriptor used to drive decoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Shape {
    /// Fixed-width identifier; width in bytes.
    Address(usize),
    /// Compact-length-prefixed opaque bytes.
    Bytes,
    /// Fixed-width little-endian unsigned integer.
    Uint(UintWidth),
    /// Compact-count-prefixed homogeneous sequence.
    List(Box<Shape>),
    /// Fixed-arity heterogeneous sequence.
    Tuple(Vec<Shape>),
    /// Named fields in wire order. Names never reach the wire.
    Struct(Vec<(String, Shape)>),
}

impl Shape {
    /// A 32-byte address.
    pub fn address() -> Self {
        Shape::Address(DEFAULT_ADDRESS_WIDTH)
    }

    pub fn uint(bits: u16) -> Result<Self, CodecError> {
        Ok(Shape::Uint(UintWidth::new(bits)?))
    }

    pub fn u64() -> Self {
        Shape::Uint(UintWidth::U64)
    }

    pub fn u256() -> Self {
        Shape::Uint(UintWidth::U256)
    }

    pub fn list(elem: Shape) -> Self {
        Shape::List(Box::new(elem))
    }

    pub fn tuple(items: impl IntoIterator<Item = Shape>) -> Self {
        Shape::Tuple(items.into_iter().collect())
    }

    pub fn structure<K: Into<String>>(fields: impl IntoIterator<Item = (K, Shape)>) -> Self {
        Shape::Struct(fields.into_iter().map(|(k, s)| (k.into(), s)).collect())
    }

    /// Returns `true` for Address, Bytes and Uint.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Shape::Address(_) | Shape::Bytes | Shape::Uint(_))
    }

    /// Container nesting depth; scalars are depth 0.
    pub fn depth(&self) -> usize {
        match self {
            Shape::Address(_) | Shape::Bytes | Shape::Uint(_) => 0,
            Shape::List(elem) => 1 + elem.depth(),
            Shape::Tuple(items) => 1 + items.iter().map(Shape::depth).max().unwrap_or(0),
            Shape::Struct(fields) => 1 + fields.iter().map(|(_, s)| s.depth()).max().unwrap_or(0),
        }
    }

    /// Smallest possible encoded size. Length and count prefixes take at
    /// least one byte, so list elements are never visited.
    pub fn min_size(&self) -> usize {
        match self {
            Shape::Address(width) => *width,
            Shape::Uint(width) => width.byte_len(),
            Shape::Bytes | Shape::List(_) => 1,
            Shape::Tuple(items) => items
                .iter()
                .fold(0usize, |acc, s| acc.saturating_add(s.min_size())),
            Shape::Struct(fields) => fields
                .iter()
                .fold(0usize, |acc, (_, s)| acc.saturating_add(s.min_size())),
        }
    }

    /// Short lowercase name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Address(_) => "address",
            Shape::Bytes => "bytes",
            Shape::Uint(_) => "uint",
            Shape::List(_) => "list",
            Shape::Tuple(_) => "tuple",
            Shape::Struct(_) => "struct",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Address(width) => write!(f, "address{width}"),
            Shape::Bytes => write!(f, "bytes"),
            Shape::Uint(width) => write!(f, "u{width}"),
            Shape::List(elem) => write!(f, "list<{elem}>"),
            Shape::Tuple(items) => {
                let parts: Vec<_> = items.iter().map(|s| s.to_string()).collect();
                write!(f, "({})", parts.join(", "))
            }
            Shape::Struct(fields) => {
                let parts: Vec<_> = fields.iter().map(|(k, s)| format!("{k}: {s}")).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_size_agrees_with_wire_type() {
        let shapes = [
            Shape::address(),
            Shape::Bytes,
            Shape::u256(),
            Shape::list(Shape::u64()),
            Shape::tuple([]),
            Shape::tuple([Shape::u64(), Shape::Bytes, Shape::tuple([Shape::uint(16).unwrap()])]),
            Shape::structure([("n", Shape::u64()), ("tags", Shape::list(Shape::Bytes))]),
        ];
        for shape in &shapes {
            assert_eq!(shape.min_size(), shape.wire_type().min_size(), "{shape}");
        }
        assert_eq!(shapes[5].min_size(), 8 + 1 + 2);
    }

    #[test]
    fn width_validation() {
        assert_eq!(UintWidth::new(64).unwrap().byte_len(), 8);
        assert_eq!(UintWidth::new(256).unwrap().byte_len(), 32);
        assert!(matches!(
            UintWidth::new(12),
            Err(CodecError::InvalidWidth { bits: 12 })
        ));
        assert!(UintWidth::new(0).is_err());
        assert!(UintWidth::new(264).is_err());
    }

    #[test]
    fn shape_display() {
        let shape = Shape::structure([
            ("num", Shape::u64()),
            ("roots", Shape::list(Shape::Bytes)),
        ]);
        assert_eq!(shape.to_string(), "{num: u64, roots: list<bytes>}");
        assert_eq!(Shape::tuple([Shape::address(), Shape::Bytes]).to_string(), "(address32, bytes)");
    }

    #[test]
    fn shape_depth() {
        assert_eq!(Shape::Bytes.depth(), 0);
        assert_eq!(Shape::list(Shape::list(Shape::u64())).depth(), 2);
        assert_eq!(Shape::Tuple(vec![]).depth(), 1);
    }

    #[test]
    fn shape_serde_form() {
        let shape = Shape::tuple([Shape::u64(), Shape::Bytes]);
        let json = serde_json::to_string(&shape).unwrap();
        assert_eq!(
            json,
            r#"{"type":"tuple","value":[{"type":"uint","value":64},{"type":"bytes"}]}"#
        );
        let back: Shape = serde_json::from_str(&json).unwrap();
        assert_eq!(back, shape);
    }

    #[test]
    fn shape_serde_rejects_bad_width() {
        let err = serde_json::from_str::<Shape>(r#"{"type":"uint","value":7}"#);
        assert!(err.is_err());
    }
}
