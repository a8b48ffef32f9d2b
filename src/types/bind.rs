//! Caller-supplied values destined for statement placeholders.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// A dynamically-typed bind value.
///
/// Serialization is driven by the variant alone; the destination column's
/// declared type plays no part.
#[derive(Clone, Debug, PartialEq)]
pub enum BindValue {
    /// Integer value
    Int(i64),
    /// Float value
    Float(f64),
    /// Text value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Opaque bytes; binary content is hex-expanded
    Blob(Vec<u8>),
    /// Time instant
    Timestamp(DateTime<Utc>),
    /// Calendar date without a time component
    Date(NaiveDate),
    /// 128-bit identifier
    Uuid(Uuid),
    /// Ordered sequence, for list-valued placeholders
    List(Vec<BindValue>),
    /// Explicit null; no literal form exists for it
    Null,
}

impl BindValue {
    /// Returns the variant name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            BindValue::Int(_) => "Int",
            BindValue::Float(_) => "Float",
            BindValue::Text(_) => "Text",
            BindValue::Bool(_) => "Bool",
            BindValue::Blob(_) => "Blob",
            BindValue::Timestamp(_) => "Timestamp",
            BindValue::Date(_) => "Date",
            BindValue::Uuid(_) => "Uuid",
            BindValue::List(_) => "List",
            BindValue::Null => "Null",
        }
    }
}

impl From<i64> for BindValue {
    fn from(v: i64) -> Self {
        BindValue::Int(v)
    }
}

impl From<i32> for BindValue {
    fn from(v: i32) -> Self {
        BindValue::Int(i64::from(v))
    }
}

impl From<f64> for BindValue {
    fn from(v: f64) -> Self {
        BindValue::Float(v)
    }
}

impl From<&str> for BindValue {
    fn from(v: &str) -> Self {
        BindValue::Text(v.to_string())
    }
}

impl From<String> for BindValue {
    fn from(v: String) -> Self {
        BindValue::Text(v)
    }
}

impl From<bool> for BindValue {
    fn from(v: bool) -> Self {
        BindValue::Bool(v)
    }
}

impl From<Vec<u8>> for BindValue {
    fn from(v: Vec<u8>) -> Self {
        BindValue::Blob(v)
    }
}

impl From<DateTime<Utc>> for BindValue {
    fn from(v: DateTime<Utc>) -> Self {
        BindValue::Timestamp(v)
    }
}

impl From<NaiveDate> for BindValue {
    fn from(v: NaiveDate) -> Self {
        BindValue::Date(v)
    }
}

impl From<Uuid> for BindValue {
    fn from(v: Uuid) -> Self {
        BindValue::Uuid(v)
    }
}

impl<T: Into<BindValue>> From<Vec<T>> for BindValue
where
    T: NotBytes,
{
    fn from(v: Vec<T>) -> Self {
        BindValue::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<BindValue>> From<Option<T>> for BindValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(BindValue::Null)
    }
}

/// Marker for element types that convert to a list rather than a blob.
///
/// Keeps `Vec<u8>` meaning bytes while `Vec<i64>` or `Vec<&str>` mean lists.
pub trait NotBytes {}

impl NotBytes for i64 {}
impl NotBytes for i32 {}
impl NotBytes for f64 {}
impl NotBytes for &str {}
impl NotBytes for String {}
impl NotBytes for bool {}
impl NotBytes for Uuid {}
impl NotBytes for BindValue {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_of_strings_is_a_list() {
        let bind: BindValue = vec!["a", "b"].into();
        assert_eq!(
            bind,
            BindValue::List(vec![BindValue::from("a"), BindValue::from("b")])
        );
    }

    #[test]
    fn test_vec_of_bytes_is_a_blob() {
        let bind: BindValue = vec![0u8, 1, 2].into();
        assert_eq!(bind, BindValue::Blob(vec![0, 1, 2]));
    }

    #[test]
    fn test_none_is_null() {
        let bind: BindValue = Option::<i64>::None.into();
        assert_eq!(bind, BindValue::Null);
        assert_eq!(bind.type_name(), "Null");
    }
}
