//! (Shape, bytes) → value.
//!
//! A single-pass recursive-descent reader. The byte stream has no type tags;
//! every length, count and width comes from the shape or from a compact
//! prefix the shape says is there. The reader never backtracks.

use crate::compact::{decode_compact, to_usize};
use crate::config::{CodecConfig, TrailingBytes};
use crate::error::CodecError;
use crate::shape::Shape;
use crate::value::{List, Value};
use alloy_primitives::U256;
use tracing::{debug, trace};

/// Upper bound on the count of a list whose elements encode to zero bytes.
/// Such counts cannot be checked against the remaining input.
pub const MAX_ZERO_SIZED_ITEMS: usize = 1 << 16;

/// Stateless decoder carrying the configured limits.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: CodecConfig,
}

impl Decoder {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Decode a whole buffer, applying the trailing-byte policy.
    pub fn decode(&self, shape: &Shape, bytes: &[u8]) -> Result<Value, CodecError> {
        let (value, consumed) = self.decode_prefix(shape, bytes)?;
        let leftover = bytes.len() - consumed;
        if leftover > 0 && self.config.trailing_bytes == TrailingBytes::Reject {
            debug!(%shape, leftover, "rejecting trailing bytes");
            return Err(CodecError::TrailingBytes { count: leftover });
        }
        Ok(value)
    }

    /// Decode one value from the front of `bytes`.
    ///
    /// Returns the value and the number of bytes it occupied.
    pub fn decode_prefix(&self, shape: &Shape, bytes: &[u8]) -> Result<(Value, usize), CodecError> {
        let mut cursor = Cursor {
            bytes,
            pos: 0,
            max_depth: self.config.max_depth,
        };
        match cursor.read(shape, 0) {
            Ok(value) => {
                trace!(%shape, consumed = cursor.pos, "decoded value");
                Ok((value, cursor.pos))
            }
            Err(e) => {
                debug!(%shape, offset = cursor.pos, error = %e, "decode failed");
                Err(e)
            }
        }
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    max_depth: usize,
}

impl<'a> Cursor<'a> {
    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if n > self.remaining() {
            return Err(CodecError::TruncatedInput {
                offset: self.pos,
                needed: n,
                remaining: self.remaining(),
            });
        }
        let out = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn compact_len(&mut self) -> Result<usize, CodecError> {
        let (n, consumed) = decode_compact(self.bytes, self.pos)?;
        self.pos += consumed;
        // a length beyond usize can never be satisfied by an in-memory buffer
        to_usize(n).ok_or(CodecError::TruncatedInput {
            offset: self.pos,
            needed: usize::MAX,
            remaining: self.remaining(),
        })
    }

    fn enter(&self, depth: usize) -> Result<(), CodecError> {
        if depth >= self.max_depth {
            return Err(CodecError::DepthLimitExceeded {
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    fn read(&mut self, shape: &Shape, depth: usize) -> Result<Value, CodecError> {
        match shape {
            Shape::Address(width) => Ok(Value::address(self.take(*width)?)),
            Shape::Uint(width) => {
                let raw = self.take(width.byte_len())?;
                Ok(Value::uint(U256::from_le_slice(raw), *width))
            }
            Shape::Bytes => {
                let len = self.compact_len()?;
                Ok(Value::bytes(self.take(len)?))
            }
            Shape::List(elem) => {
                self.enter(depth)?;
                let count_offset = self.pos;
                let count = self.compact_len()?;
                self.check_count(elem, count, count_offset)?;
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    items.push(self.read(elem, depth + 1)?);
                }
                Ok(Value::List(List::from_decoded((**elem).clone(), items)))
            }
            Shape::Tuple(shapes) => {
                self.enter(depth)?;
                let items = shapes
                    .iter()
                    .map(|s| self.read(s, depth + 1))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Tuple(items))
            }
            Shape::Struct(fields) => {
                self.enter(depth)?;
                let pairs = fields
                    .iter()
                    .map(|(key, s)| Ok((key.clone(), self.read(s, depth + 1)?)))
                    .collect::<Result<Vec<_>, CodecError>>()?;
                Ok(Value::Struct(pairs))
            }
        }
    }

    /// Reject counts the remaining input cannot possibly hold.
    fn check_count(&self, elem: &Shape, count: usize, count_offset: usize) -> Result<(), CodecError> {
        if count == 0 {
            return Ok(());
        }
        let min = elem.min_size();
        if min == 0 {
            if count > MAX_ZERO_SIZED_ITEMS {
                return Err(CodecError::malformed(
                    count_offset,
                    format!("count {count} of zero-sized elements exceeds {MAX_ZERO_SIZED_ITEMS}"),
                ));
            }
        } else if count > self.remaining() / min {
            return Err(CodecError::TruncatedInput {
                offset: self.pos,
                needed: count.saturating_mul(min),
                remaining: self.remaining(),
            });
        }
        Ok(())
    }
}

/// Decode `bytes` as `shape` with the default configuration (trailing bytes rejected).
pub fn decode(shape: &Shape, bytes: &[u8]) -> Result<Value, CodecError> {
    Decoder::default().decode(shape, bytes)
}

/// Decode `bytes` as `shape` with an explicit configuration.
pub fn decode_with(shape: &Shape, bytes: &[u8], config: &CodecConfig) -> Result<Value, CodecError> {
    Decoder::new(config.clone()).decode(shape, bytes)
}

/// Decode one value from the front of `bytes`, returning it with the byte count consumed.
pub fn decode_prefix(shape: &Shape, bytes: &[u8]) -> Result<(Value, usize), CodecError> {
    Decoder::default().decode_prefix(shape, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode;
    use crate::shape::UintWidth;

    fn h(s: &str) -> Vec<u8> {
        hex::decode(s).unwrap()
    }

    #[test]
    fn decode_bytes() {
        let v = decode(&Shape::Bytes, &h("140012345678")).unwrap();
        assert_eq!(v, Value::bytes(h("0012345678")));
    }

    #[test]
    fn decode_u64() {
        let v = decode(&Shape::u64(), &h("6400000000000000")).unwrap();
        assert_eq!(v.as_uint(), Some(U256::from(100u64)));
    }

    #[test]
    fn decode_u256() {
        let v = decode(
            &Shape::u256(),
            &h("6400000000000000000000000000000000000000000000000000000000000000"),
        )
        .unwrap();
        assert_eq!(v, Value::u256(U256::from(100u64)));
    }

    #[test]
    fn decode_list() {
        let v = decode(&Shape::list(Shape::Bytes), &h("04140012345678")).unwrap();
        let list = v.as_list().unwrap();
        assert_eq!(list.items(), &[Value::bytes(h("0012345678"))]);
    }

    #[test]
    fn decode_struct_repairs_keys() {
        let shape = Shape::structure([("num", Shape::u64()), ("bytes", Shape::Bytes)]);
        let v = decode(&shape, &h("6400000000000000140012345678")).unwrap();
        assert_eq!(
            v,
            Value::structure([("num", Value::u64(100)), ("bytes", Value::bytes(h("0012345678")))])
        );
    }

    #[test]
    fn decode_empty_list() {
        let v = decode(&Shape::list(Shape::Bytes), &[0x00]).unwrap();
        assert!(v.as_list().unwrap().is_empty());
    }

    #[test]
    fn truncated_bytes() {
        assert_eq!(
            decode(&Shape::Bytes, &h("14001234")).unwrap_err(),
            CodecError::TruncatedInput {
                offset: 1,
                needed: 5,
                remaining: 3,
            }
        );
    }

    #[test]
    fn truncated_uint() {
        assert_eq!(
            decode(&Shape::u64(), &h("64000000000000")).unwrap_err(),
            CodecError::TruncatedInput {
                offset: 0,
                needed: 8,
                remaining: 7,
            }
        );
    }

    #[test]
    fn truncated_nested_component() {
        let shape = Shape::tuple([Shape::u64(), Shape::tuple([Shape::Bytes, Shape::address()])]);
        let mut bytes = h("6400000000000000");
        bytes.extend(h("0401"));
        bytes.extend([0u8; 31]);
        assert!(matches!(
            decode(&shape, &bytes),
            Err(CodecError::TruncatedInput { needed: 32, remaining: 31, .. })
        ));
    }

    #[test]
    fn impossible_count_is_rejected_before_allocating() {
        let err = decode(&Shape::list(Shape::u64()), &h("03ffffffff")).unwrap_err();
        assert!(matches!(err, CodecError::TruncatedInput { offset: 5, remaining: 0, .. }));

        let err = decode(&Shape::list(Shape::u64()), &h("080100000000000000")).unwrap_err();
        assert!(matches!(err, CodecError::TruncatedInput { needed: 16, remaining: 8, .. }));
    }

    #[test]
    fn count_check_uses_element_min_size() {
        let shape = Shape::list(Shape::structure([
            ("owner", Shape::Address(1 << 20)),
            ("tags", Shape::list(Shape::list(Shape::Bytes))),
        ]));
        assert!(decode(&shape, &[0x00]).unwrap().as_list().unwrap().is_empty());

        let err = decode(&shape, &h("04ab")).unwrap_err();
        assert!(matches!(err, CodecError::TruncatedInput { needed, remaining: 1, .. } if needed == (1 << 20) + 1));
    }

    #[test]
    fn zero_sized_elements() {
        let shape = Shape::list(Shape::Tuple(vec![]));
        let v = decode(&shape, &[0x0c]).unwrap();
        assert_eq!(v.as_list().unwrap().len(), 3);
        assert!(matches!(
            decode(&shape, &h("03000000ff")),
            Err(CodecError::MalformedCompactPrefix { offset: 0, .. })
        ));
    }

    #[test]
    fn missing_prefix_is_malformed() {
        assert!(matches!(
            decode(&Shape::Bytes, &[]),
            Err(CodecError::MalformedCompactPrefix { offset: 0, .. })
        ));
    }

    #[test]
    fn trailing_bytes_policy() {
        let bytes = h("140012345678ff");
        assert_eq!(
            decode(&Shape::Bytes, &bytes).unwrap_err(),
            CodecError::TrailingBytes { count: 1 }
        );
        let v = decode_with(&Shape::Bytes, &bytes, &CodecConfig::lenient()).unwrap();
        assert_eq!(v, Value::bytes(h("0012345678")));
        let (_, consumed) = decode_prefix(&Shape::Bytes, &bytes).unwrap();
        assert_eq!(consumed, 6);
    }

    #[test]
    fn depth_limit() {
        let shape = Shape::list(Shape::list(Shape::u64()));
        let config = CodecConfig {
            max_depth: 1,
            ..CodecConfig::default()
        };
        assert_eq!(
            decode_with(&shape, &h("0400"), &config).unwrap_err(),
            CodecError::DepthLimitExceeded { limit: 1 }
        );
        assert!(decode(&shape, &h("0400")).is_ok());
    }

    #[test]
    fn roundtrip_nested() {
        let inner = Shape::structure([("id", Shape::Uint(UintWidth::U32)), ("tags", Shape::list(Shape::Bytes))]);
        let value = Value::tuple([
            Value::address([1u8; 32]),
            Value::list(
                inner.clone(),
                vec![
                    Value::structure([
                        ("id", Value::uint(U256::from(7u64), UintWidth::U32)),
                        (
                            "tags",
                            Value::list(Shape::Bytes, vec![Value::bytes(vec![1]), Value::bytes(vec![])])
                                .unwrap(),
                        ),
                    ]),
                    Value::structure([
                        ("id", Value::uint(U256::from(u32::MAX), UintWidth::U32)),
                        ("tags", Value::list(Shape::Bytes, vec![]).unwrap()),
                    ]),
                ],
            )
            .unwrap(),
            Value::bytes(vec![0x5a; 300]),
        ]);
        let bytes = encode(&value).unwrap();
        assert_eq!(decode(&value.shape(), &bytes).unwrap(), value);
    }
}
