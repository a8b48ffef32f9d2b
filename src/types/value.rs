//! Decoded column values.
//!
//! A `Value` is what the codec produces from raw column bytes. Absent
//! (nil) columns are represented by `Option::None` at the call site, never
//! by a zero-equivalent `Value`.

use std::fmt;

use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use uuid::Uuid;

/// A native value decoded from the binary column encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Ascii or UTF-8 text
    Text(String),
    /// Opaque bytes, returned unchanged
    Blob(Vec<u8>),
    Boolean(bool),
    /// Int32 and VarInt columns decode to arbitrary precision
    Integer(BigInt),
    /// Int64 and Counter64 columns
    Long(i64),
    Double(f64),
    Float(f32),
    Decimal(BigDecimal),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
    List(Vec<Value>),
    /// Unique members, in first-seen order
    Set(Vec<Value>),
    /// Unique keys, in first-seen order; a repeated key keeps the last value
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// Extract as a string slice if the value is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Extract as i64 if the value is an integer that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Long(i) => Some(*i),
            Value::Integer(i) => i.to_i64(),
            _ => None,
        }
    }

    /// Extract as f64 if the value is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(f) => Some(*f),
            Value::Float(f) => Some(f64::from(*f)),
            Value::Long(i) => Some(*i as f64),
            Value::Integer(i) => i.to_f64(),
            _ => None,
        }
    }

    /// Extract as bool if the value is boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract as a time instant if the value is a timestamp.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Extract as a UUID if the value is one.
    pub fn as_uuid(&self) -> Option<&Uuid> {
        match self {
            Value::Uuid(u) => Some(u),
            _ => None,
        }
    }

    /// True when this value is an integer equal to `n`.
    ///
    /// Used to decide whether a numeric row key names a column or a position.
    pub fn is_integer(&self, n: i64) -> bool {
        match self {
            Value::Long(i) => *i == n,
            Value::Integer(i) => *i == BigInt::from(n),
            _ => false,
        }
    }

    /// Get type name for debugging/error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "varint",
            Value::Long(_) => "bigint",
            Value::Double(_) => "double",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::Timestamp(_) => "timestamp",
            Value::Uuid(_) => "uuid",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Blob(b) => write!(f, "0x{}", hex::encode(b)),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Long(i) => write!(f, "{}", i),
            Value::Double(d) => write!(f, "{}", d),
            Value::Float(d) => write!(f, "{}", d),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            Value::Uuid(u) => write!(f, "{}", u.hyphenated()),
            Value::List(items) | Value::Set(items) => {
                let (open, close) = match self {
                    Value::List(_) => ('[', ']'),
                    _ => ('{', '}'),
                };
                write!(f, "{}", open)?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "{}", close)
            }
            Value::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Long(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}
