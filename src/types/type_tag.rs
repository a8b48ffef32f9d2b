//! Logical type tags for column names and values.
//!
//! The server describes every column with the class name of the marshaller
//! that validates it, e.g. `org.apache.cassandra.db.marshal.UTF8Type` or
//! `org.apache.cassandra.db.marshal.MapType(...UTF8Type,...Int32Type)`.
//! Only the last dotted segment carries meaning; anything unrecognised is
//! treated as opaque bytes.

use std::fmt;

/// A closed set of logical column types.
///
/// Collection tags own their element tags, so a tag tree mirrors the
/// nesting of the wire name it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Ascii,
    Utf8,
    Boolean,
    /// Opaque passthrough, also the fallback for unknown marshallers
    Bytes,
    Int32,
    /// Arbitrary-precision signed integer
    VarInt,
    Int64,
    Counter64,
    Double,
    Float,
    Decimal,
    Timestamp,
    Uuid,
    TimeUuid,
    List(Box<TypeTag>),
    Set(Box<TypeTag>),
    Map(Box<TypeTag>, Box<TypeTag>),
}

impl TypeTag {
    /// Parses a marshaller class name into a tag.
    ///
    /// Never fails: malformed or unknown names resolve to [`TypeTag::Bytes`].
    pub fn parse(name: &str) -> TypeTag {
        let name = name.trim();
        match name.find('(') {
            Some(open) if name.ends_with(')') => {
                let base = short_name(&name[..open]);
                let args = split_args(&name[open + 1..name.len() - 1]);
                Self::parameterized(base, &args)
            }
            Some(_) => TypeTag::Bytes,
            None => Self::simple(short_name(name)),
        }
    }

    fn simple(short: &str) -> TypeTag {
        match short {
            "AsciiType" => TypeTag::Ascii,
            "UTF8Type" => TypeTag::Utf8,
            "BooleanType" => TypeTag::Boolean,
            "BytesType" => TypeTag::Bytes,
            "Int32Type" => TypeTag::Int32,
            "IntegerType" => TypeTag::VarInt,
            "LongType" => TypeTag::Int64,
            "CounterColumnType" => TypeTag::Counter64,
            "DoubleType" => TypeTag::Double,
            "FloatType" => TypeTag::Float,
            "DecimalType" => TypeTag::Decimal,
            "DateType" | "TimestampType" => TypeTag::Timestamp,
            "UUIDType" => TypeTag::Uuid,
            "TimeUUIDType" => TypeTag::TimeUuid,
            _ => TypeTag::Bytes,
        }
    }

    fn parameterized(base: &str, args: &[&str]) -> TypeTag {
        match (base, args) {
            ("ListType", [elem]) => TypeTag::List(Box::new(TypeTag::parse(elem))),
            ("SetType", [elem]) => TypeTag::Set(Box::new(TypeTag::parse(elem))),
            ("MapType", [key, value]) => TypeTag::Map(
                Box::new(TypeTag::parse(key)),
                Box::new(TypeTag::parse(value)),
            ),
            // Reversal only changes sort order, not the byte layout
            ("ReversedType", [inner]) => TypeTag::parse(inner),
            _ => TypeTag::Bytes,
        }
    }

    /// Returns the short marshaller name for this tag.
    pub fn marshal_name(&self) -> String {
        match self {
            TypeTag::Ascii => "AsciiType".to_string(),
            TypeTag::Utf8 => "UTF8Type".to_string(),
            TypeTag::Boolean => "BooleanType".to_string(),
            TypeTag::Bytes => "BytesType".to_string(),
            TypeTag::Int32 => "Int32Type".to_string(),
            TypeTag::VarInt => "IntegerType".to_string(),
            TypeTag::Int64 => "LongType".to_string(),
            TypeTag::Counter64 => "CounterColumnType".to_string(),
            TypeTag::Double => "DoubleType".to_string(),
            TypeTag::Float => "FloatType".to_string(),
            TypeTag::Decimal => "DecimalType".to_string(),
            TypeTag::Timestamp => "DateType".to_string(),
            TypeTag::Uuid => "UUIDType".to_string(),
            TypeTag::TimeUuid => "TimeUUIDType".to_string(),
            TypeTag::List(elem) => format!("ListType({})", elem.marshal_name()),
            TypeTag::Set(elem) => format!("SetType({})", elem.marshal_name()),
            TypeTag::Map(key, value) => {
                format!("MapType({},{})", key.marshal_name(), value.marshal_name())
            }
        }
    }

    /// True for the list, set and map tags.
    pub fn is_collection(&self) -> bool {
        matches!(self, TypeTag::List(_) | TypeTag::Set(_) | TypeTag::Map(_, _))
    }
}

impl Default for TypeTag {
    fn default() -> Self {
        TypeTag::Bytes
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.marshal_name())
    }
}

impl From<&str> for TypeTag {
    fn from(name: &str) -> Self {
        TypeTag::parse(name)
    }
}

/// Strips the package prefix from a marshaller class name.
fn short_name(name: &str) -> &str {
    let name = name.trim();
    name.rsplit('.').next().unwrap_or(name)
}

/// Splits a parameter list on commas that are not nested inside parentheses.
fn split_args(args: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in args.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(args[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = args[start..].trim();
    if !last.is_empty() {
        parts.push(last);
    }
    parts
}
