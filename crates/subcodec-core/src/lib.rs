//! # subcodec-core
//!
//! Shape-directed codec for the Substrate SCALE wire format, plus the shared
//! error and event types used by the contract client and event watcher.
//!
//! The wire format is not self-describing: encoding walks a [`Value`], and
//! decoding walks a caller-supplied [`Shape`] over the bytes.
//!
//! ```
//! use subcodec_core::{decode, encode, Shape, Value};
//!
//! let value = Value::structure([
//!     ("num", Value::u64(100)),
//!     ("bytes", Value::bytes(vec![0x00, 0x12, 0x34, 0x56, 0x78])),
//! ]);
//! let bytes = encode(&value).unwrap();
//! assert_eq!(decode(&value.shape(), &bytes).unwrap(), value);
//! ```

pub mod batch;
pub mod compact;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod event;
pub mod shape;
pub mod value;
pub mod wire;

pub use alloy_primitives::{Bytes, U256};
pub use compact::{decode_compact, encode_compact};
pub use config::{CodecConfig, TrailingBytes};
pub use decoder::{decode, decode_prefix, decode_with, Decoder};
pub use encoder::{encode, encode_with, Encoder};
pub use error::{ChainError, CodecError, WatchError};
pub use event::EventRecord;
pub use shape::{Shape, UintWidth};
pub use value::{Address, List, Uint, Value};
pub use wire::{resolve_component_wire_types, resolve_element_wire_type, resolve_wire_type, WireType};
