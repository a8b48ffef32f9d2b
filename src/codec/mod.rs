//! Binary column codec.
//!
//! Maps `(TypeTag, raw bytes)` to a native [`Value`]. Decoding is a pure
//! function of its inputs:
//! - a nil column decodes to `None` under every tag
//! - `Bytes` (and every unknown marshaller) returns the input unchanged
//! - malformed input is a [`CastError`] carrying the tag and the raw bytes,
//!   never a zero-equivalent value
//!
//! The `encode` helpers produce the same layouts and exist so callers can
//! build wire bytes for round-trips and fixtures.

mod collection;
mod integer;
pub mod timeuuid;

use thiserror::Error;
use uuid::Uuid;

use crate::types::{TypeTag, Value};

pub use collection::{list_to_bytes, map_to_bytes};
pub use integer::{
    decimal_from_bytes, decimal_to_bytes, long_from_bytes, long_to_bytes, timestamp_from_bytes,
    timestamp_to_bytes, varint_from_bytes, varint_to_bytes,
};

/// Raw bytes could not be interpreted under a type tag.
///
/// The bytes are kept so the offending column can be inspected and
/// repaired without re-querying.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Unable to convert bytes to {tag}: {reason} (raw bytes: 0x{hex})", hex = hex::encode(.bytes))]
pub struct CastError {
    pub tag: TypeTag,
    pub bytes: Vec<u8>,
    pub reason: String,
}

/// A value could not be laid out in the wire encoding.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    #[error("{what} length {len} does not fit a 16-bit length prefix")]
    TooLong { what: &'static str, len: usize },

    #[error("decimal scale {scale} does not fit 32 bits")]
    ScaleOutOfRange { scale: i64 },
}

/// Decodes one column under `tag`.
///
/// `None` bytes (a nil column) decode to `Ok(None)` for every tag.
pub fn decode(tag: &TypeTag, bytes: Option<&[u8]>) -> Result<Option<Value>, CastError> {
    match bytes {
        None => Ok(None),
        Some(bytes) => decode_value(tag, bytes).map(Some),
    }
}

/// Decodes one column under a marshaller class name such as `"LongType"`.
pub fn decode_named(type_name: &str, bytes: Option<&[u8]>) -> Result<Option<Value>, CastError> {
    decode(&TypeTag::parse(type_name), bytes)
}

/// Decodes bytes known to be present.
pub fn decode_value(tag: &TypeTag, bytes: &[u8]) -> Result<Value, CastError> {
    let cast_error = |reason: String| CastError {
        tag: tag.clone(),
        bytes: bytes.to_vec(),
        reason,
    };

    match tag {
        TypeTag::Bytes => Ok(Value::Blob(bytes.to_vec())),
        // text that is not valid UTF-8 is kept as the raw bytes
        TypeTag::Ascii | TypeTag::Utf8 => Ok(String::from_utf8(bytes.to_vec())
            .map(Value::Text)
            .unwrap_or_else(|e| Value::Blob(e.into_bytes()))),
        TypeTag::Boolean => match bytes {
            [b] => Ok(Value::Boolean(*b == 1)),
            _ => Err(cast_error(format!(
                "expected 1 byte for a boolean, got {}",
                bytes.len()
            ))),
        },
        TypeTag::Int32 | TypeTag::VarInt => varint_from_bytes(bytes)
            .map(Value::Integer)
            .map_err(cast_error),
        TypeTag::Int64 | TypeTag::Counter64 => {
            long_from_bytes(bytes).map(Value::Long).map_err(cast_error)
        }
        TypeTag::Double => <[u8; 8]>::try_from(bytes)
            .map(|b| Value::Double(f64::from_be_bytes(b)))
            .map_err(|_| cast_error(format!("expected 8 bytes for a double, got {}", bytes.len()))),
        TypeTag::Float => <[u8; 4]>::try_from(bytes)
            .map(|b| Value::Float(f32::from_be_bytes(b)))
            .map_err(|_| cast_error(format!("expected 4 bytes for a float, got {}", bytes.len()))),
        TypeTag::Decimal => decimal_from_bytes(bytes)
            .map(Value::Decimal)
            .map_err(cast_error),
        TypeTag::Timestamp => timestamp_from_bytes(bytes)
            .map(Value::Timestamp)
            .map_err(cast_error),
        TypeTag::Uuid | TypeTag::TimeUuid => Uuid::from_slice(bytes)
            .map(Value::Uuid)
            .map_err(|_| cast_error(format!("expected 16 bytes for a UUID, got {}", bytes.len()))),
        TypeTag::List(elem) => collection::decode_list(elem, bytes)
            .map(Value::List)
            .map_err(cast_error),
        TypeTag::Set(elem) => collection::decode_set(elem, bytes)
            .map(Value::Set)
            .map_err(cast_error),
        TypeTag::Map(key, value) => collection::decode_map(key, value, bytes)
            .map(Value::Map)
            .map_err(cast_error),
    }
}
