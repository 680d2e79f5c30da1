//! The value model.
//!
//! `Value` is a closed set of six variants. Every component of the codec
//! matches on it exhaustively, so adding a variant means touching the
//! encoder, decoder and type resolver together.

use crate::error::CodecError;
use crate::shape::{Shape, UintWidth};
use alloy_primitives::{Bytes, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed-width account or contract identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(Bytes);

impl Address {
    pub fn new(raw: impl Into<Vec<u8>>) -> Self {
        Self(Bytes::from(raw.into()))
    }

    /// Width in bytes.
    pub fn width(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

/// Unsigned integer with an explicit bit-width.
///
/// The magnitude is not checked against the width at construction;
/// the encoder rejects out-of-range magnitudes with `IntegerOverflow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Uint {
    pub value: U256,
    pub width: UintWidth,
}

impl Uint {
    pub fn new(value: U256, width: UintWidth) -> Self {
        Self { value, width }
    }

    /// Returns `true` if `value < 2^width`.
    pub fn fits(&self) -> bool {
        self.value.bit_len() <= usize::from(self.width.bits())
    }
}

/// Homogeneous list. Every item conforms to `elem`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawList")]
pub struct List {
    elem: Shape,
    items: Vec<Value>,
}

#[derive(Deserialize)]
struct RawList {
    elem: Shape,
    #[serde(default)]
    items: Vec<Value>,
}

impl TryFrom<RawList> for List {
    type Error = CodecError;

    fn try_from(raw: RawList) -> Result<Self, Self::Error> {
        List::new(raw.elem, raw.items)
    }
}

impl List {
    /// Build a list, rejecting any item that does not match `elem`.
    pub fn new(elem: Shape, items: Vec<Value>) -> Result<Self, CodecError> {
        if let Some(bad) = items.iter().find(|v| !v.conforms_to(&elem)) {
            return Err(CodecError::ShapeMismatch {
                expected: elem.to_string(),
                got: bad.shape().to_string(),
            });
        }
        Ok(Self { elem, items })
    }

    pub fn empty(elem: Shape) -> Self {
        Self {
            elem,
            items: Vec::new(),
        }
    }

    /// Items produced by the decoder already conform to `elem`.
    pub(crate) fn from_decoded(elem: Shape, items: Vec<Value>) -> Self {
        Self { elem, items }
    }

    pub fn push(&mut self, item: Value) -> Result<(), CodecError> {
        if !item.conforms_to(&self.elem) {
            return Err(CodecError::ShapeMismatch {
                expected: self.elem.to_string(),
                got: item.shape().to_string(),
            });
        }
        self.items.push(item);
        Ok(())
    }

    pub fn elem(&self) -> &Shape {
        &self.elem
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<Value> {
        self.items
    }
}

/// A codec value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Address(Address),
    Bytes(Bytes),
    Uint(Uint),
    List(List),
    Tuple(Vec<Value>),
    /// Ordered `(name, value)` pairs; order is wire order.
    Struct(Vec<(String, Value)>),
}

impl Value {
    pub fn address(raw: impl Into<Vec<u8>>) -> Self {
        Value::Address(Address::new(raw))
    }

    pub fn bytes(raw: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(Bytes::from(raw.into()))
    }

    pub fn uint(value: U256, width: UintWidth) -> Self {
        Value::Uint(Uint::new(value, width))
    }

    pub fn u64(value: u64) -> Self {
        Value::uint(U256::from(value), UintWidth::U64)
    }

    pub fn u256(value: U256) -> Self {
        Value::uint(value, UintWidth::U256)
    }

    pub fn list(elem: Shape, items: Vec<Value>) -> Result<Self, CodecError> {
        Ok(Value::List(List::new(elem, items)?))
    }

    pub fn tuple(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Tuple(items.into_iter().collect())
    }

    pub fn structure<K: Into<String>>(fields: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Struct(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// The shape this value encodes as.
    pub fn shape(&self) -> Shape {
        match self {
            Value::Address(a) => Shape::Address(a.width()),
            Value::Bytes(_) => Shape::Bytes,
            Value::Uint(u) => Shape::Uint(u.width),
            Value::List(l) => Shape::List(Box::new(l.elem.clone())),
            Value::Tuple(items) => Shape::Tuple(items.iter().map(Value::shape).collect()),
            Value::Struct(fields) => {
                Shape::Struct(fields.iter().map(|(k, v)| (k.clone(), v.shape())).collect())
            }
        }
    }

    /// Structural check against `shape` without building the value's shape.
    pub fn conforms_to(&self, shape: &Shape) -> bool {
        match (self, shape) {
            (Value::Address(a), Shape::Address(width)) => a.width() == *width,
            (Value::Bytes(_), Shape::Bytes) => true,
            (Value::Uint(u), Shape::Uint(width)) => u.width == *width,
            (Value::List(l), Shape::List(elem)) => l.elem == **elem,
            (Value::Tuple(items), Shape::Tuple(shapes)) => {
                items.len() == shapes.len()
                    && items.iter().zip(shapes).all(|(v, s)| v.conforms_to(s))
            }
            (Value::Struct(fields), Shape::Struct(shapes)) => {
                fields.len() == shapes.len()
                    && fields
                        .iter()
                        .zip(shapes)
                        .all(|((k, v), (sk, s))| k == sk && v.conforms_to(s))
            }
            _ => false,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<&Address> {
        match self {
            Value::Address(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Value::Uint(u) => Some(u.value),
            _ => None,
        }
    }

    /// The magnitude of a Uint, if it fits in a `u64`.
    pub fn as_u64(&self) -> Option<u64> {
        let limbs = self.as_uint()?.into_limbs();
        limbs[1..].iter().all(|&l| l == 0).then_some(limbs[0])
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Components of a Tuple, or field values of a Struct, in wire order.
    pub fn components(&self) -> Option<Vec<&Value>> {
        match self {
            Value::Tuple(items) => Some(items.iter().collect()),
            Value::Struct(fields) => Some(fields.iter().map(|(_, v)| v).collect()),
            _ => None,
        }
    }

    /// Look up a struct field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Struct(fields) => fields.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Address(a) => write!(f, "{a}"),
            Value::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            Value::Uint(u) => write!(f, "{}", u.value),
            Value::List(l) => {
                let parts: Vec<_> = l.items.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Value::Tuple(items) => {
                let parts: Vec<_> = items.iter().map(|x| x.to_string()).collect();
                write!(f, "({})", parts.join(", "))
            }
            Value::Struct(fields) => {
                let parts: Vec<_> = fields.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}
