//! Value → bytes.
//!
//! # Usage
//! ```
//! use subcodec_core::{encode, Value};
//!
//! let bytes = encode(&Value::bytes(vec![0x00, 0x12, 0x34, 0x56, 0x78])).unwrap();
//! assert_eq!(bytes, vec![0x14, 0x00, 0x12, 0x34, 0x56, 0x78]);
//! ```

use crate::compact::encode_compact_into;
use crate::config::CodecConfig;
use crate::error::CodecError;
use crate::value::Value;
use alloy_primitives::U256;
use tracing::trace;

/// Stateless encoder carrying the configured limits.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    config: CodecConfig,
}

impl Encoder {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        self.encode_into(value, &mut out)?;
        Ok(out)
    }

    /// Append the encoding of `value` to `out`.
    ///
    /// On error `out` is restored to its original length.
    pub fn encode_into(&self, value: &Value, out: &mut Vec<u8>) -> Result<(), CodecError> {
        let start = out.len();
        match self.write(value, out, 0) {
            Ok(()) => {
                trace!(shape = %value.shape(), len = out.len() - start, "encoded value");
                Ok(())
            }
            Err(e) => {
                out.truncate(start);
                Err(e)
            }
        }
    }

    fn write(&self, value: &Value, out: &mut Vec<u8>, depth: usize) -> Result<(), CodecError> {
        match value {
            Value::Address(addr) => out.extend_from_slice(addr.as_slice()),
            Value::Uint(uint) => {
                if !uint.fits() {
                    return Err(CodecError::IntegerOverflow {
                        bits: uint.value.bit_len(),
                        width: uint.width.bits(),
                    });
                }
                let le = uint.value.to_le_bytes::<32>();
                out.extend_from_slice(&le[..uint.width.byte_len()]);
            }
            Value::Bytes(bytes) => {
                encode_compact_into(U256::from(bytes.len() as u64), out);
                out.extend_from_slice(bytes);
            }
            Value::List(list) => {
                self.enter(depth)?;
                encode_compact_into(U256::from(list.len() as u64), out);
                for item in list.items() {
                    self.write(item, out, depth + 1)?;
                }
            }
            Value::Tuple(items) => {
                self.enter(depth)?;
                for item in items {
                    self.write(item, out, depth + 1)?;
                }
            }
            Value::Struct(fields) => {
                self.enter(depth)?;
                for (_, item) in fields {
                    self.write(item, out, depth + 1)?;
                }
            }
        }
        Ok(())
    }

    fn enter(&self, depth: usize) -> Result<(), CodecError> {
        if depth >= self.config.max_depth {
            return Err(CodecError::DepthLimitExceeded {
                limit: self.config.max_depth,
            });
        }
        Ok(())
    }
}

/// Encode `value` with the default configuration.
pub fn encode(value: &Value) -> Result<Vec<u8>, CodecError> {
    Encoder::default().encode(value)
}

/// Encode `value` with an explicit configuration.
pub fn encode_with(value: &Value, config: &CodecConfig) -> Result<Vec<u8>, CodecError> {
    Encoder::new(config.clone()).encode(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compact::encode_compact;
    use crate::shape::{Shape, UintWidth};

    fn hex_of(value: &Value) -> String {
        hex::encode(encode(value).unwrap())
    }

    #[test]
    fn encode_u64() {
        assert_eq!(hex_of(&Value::u64(100)), "6400000000000000");
    }

    #[test]
    fn encode_u256() {
        assert_eq!(
            hex_of(&Value::u256(U256::from(100u64))),
            "6400000000000000000000000000000000000000000000000000000000000000"
        );
    }

    #[test]
    fn encode_bytes() {
        assert_eq!(
            hex_of(&Value::bytes(hex::decode("0012345678").unwrap())),
            "140012345678"
        );
    }

    #[test]
    fn encode_list_of_bytes() {
        let list = Value::list(Shape::Bytes, vec![Value::bytes(hex::decode("0012345678").unwrap())])
            .unwrap();
        assert_eq!(hex_of(&list), "04140012345678");
    }

    #[test]
    fn encode_address_has_no_prefix() {
        let addr = Value::address([0xabu8; 32]);
        assert_eq!(encode(&addr).unwrap(), vec![0xab; 32]);
    }

    #[test]
    fn struct_keys_are_invisible() {
        let data = hex::decode("0012345678").unwrap();
        let s = Value::structure([("num", Value::u64(100)), ("bytes", Value::bytes(data.clone()))]);
        let t = Value::tuple([Value::u64(100), Value::bytes(data)]);
        assert_eq!(encode(&s).unwrap(), encode(&t).unwrap());
        assert_eq!(hex_of(&t), "6400000000000000140012345678");
    }

    #[test]
    fn empty_list_is_just_the_count() {
        let list = Value::list(Shape::u64(), vec![]).unwrap();
        assert_eq!(encode(&list).unwrap(), encode_compact(U256::ZERO));
    }

    #[test]
    fn overflow_is_rejected() {
        let v = Value::uint(U256::from(256u64), UintWidth::U8);
        assert_eq!(
            encode(&v).unwrap_err(),
            CodecError::IntegerOverflow { bits: 9, width: 8 }
        );
        let max = Value::uint(U256::from(u64::MAX), UintWidth::U64);
        assert_eq!(encode(&max).unwrap(), vec![0xff; 8]);
        let over = Value::uint(U256::from(u64::MAX) + U256::from(1u64), UintWidth::U64);
        assert!(matches!(encode(&over), Err(CodecError::IntegerOverflow { .. })));
    }

    #[test]
    fn overflow_inside_list_aborts_and_restores_buffer() {
        let bad = Value::tuple([Value::u64(1), Value::uint(U256::from(300u64), UintWidth::U8)]);
        let mut out = vec![0xaa];
        assert!(Encoder::default().encode_into(&bad, &mut out).is_err());
        assert_eq!(out, vec![0xaa]);
    }

    #[test]
    fn deterministic() {
        let v = Value::tuple([
            Value::u64(7),
            Value::list(Shape::Bytes, vec![Value::bytes(vec![1, 2]), Value::bytes(vec![])]).unwrap(),
        ]);
        assert_eq!(encode(&v).unwrap(), encode(&v).unwrap());
    }

    #[test]
    fn depth_limit() {
        let nested = Value::tuple([Value::tuple([Value::u64(1)])]);
        let config = CodecConfig {
            max_depth: 1,
            ..CodecConfig::default()
        };
        assert_eq!(
            encode_with(&nested, &config).unwrap_err(),
            CodecError::DepthLimitExceeded { limit: 1 }
        );
        let config = CodecConfig {
            max_depth: 2,
            ..CodecConfig::default()
        };
        assert!(encode_with(&nested, &config).is_ok());
    }
}
