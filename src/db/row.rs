//! A lazily-decoded view over one raw record.

use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::sync::Arc;

use tracing::warn;

use super::backend::RawRow;
use super::schema::ResultSchema;
use crate::codec::{self, CastError};
use crate::types::Value;

type Decoded = Result<Option<Value>, CastError>;

/// Address of a column within a row.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnKey {
    /// 0-based position, unless some column is literally named with this integer
    Position(usize),
    Name(Value),
}

impl From<usize> for ColumnKey {
    fn from(position: usize) -> Self {
        ColumnKey::Position(position)
    }
}

impl From<&str> for ColumnKey {
    fn from(name: &str) -> Self {
        ColumnKey::Name(Value::from(name))
    }
}

impl From<String> for ColumnKey {
    fn from(name: String) -> Self {
        ColumnKey::Name(Value::from(name))
    }
}

impl From<Value> for ColumnKey {
    fn from(name: Value) -> Self {
        ColumnKey::Name(name)
    }
}

/// One record of a rows response.
///
/// Each column name is decoded on first need and kept apart from its
/// siblings; each value is decoded the first time it is read, by any access
/// path, and the outcome (including a failure) is cached for the life of
/// the row.
pub struct Row {
    raw: RawRow,
    schema: Arc<ResultSchema>,
    names: OnceCell<Vec<Result<Value, CastError>>>,
    values: RefCell<Vec<Option<Decoded>>>,
}

impl Row {
    pub fn new(raw: RawRow, schema: Arc<ResultSchema>) -> Self {
        let columns = raw.columns.len();
        Self {
            raw,
            schema,
            names: OnceCell::new(),
            values: RefCell::new(vec![None; columns]),
        }
    }

    /// Reads one column by position or name.
    ///
    /// Returns `Ok(None)` both for a nil column and for a column that does
    /// not exist in this row. A sibling whose name fails to decode never
    /// matches, and never fails the lookup.
    pub fn get(&self, key: impl Into<ColumnKey>) -> Result<Option<Value>, CastError> {
        match key.into() {
            ColumnKey::Position(position) => {
                let named = i64::try_from(position).ok().and_then(|n| {
                    self.decoded_names()
                        .iter()
                        .rposition(|name| matches!(name, Ok(name) if name.is_integer(n)))
                });
                match named {
                    Some(index) => self.value_at(index),
                    None => self.value_at(position),
                }
            }
            ColumnKey::Name(name) => self.get_by_name(&name),
        }
    }

    fn get_by_name(&self, name: &Value) -> Result<Option<Value>, CastError> {
        let found = self
            .decoded_names()
            .iter()
            .rposition(|candidate| matches!(candidate, Ok(candidate) if name_matches(candidate, name)));
        match found {
            Some(index) => self.value_at(index),
            None => Ok(None),
        }
    }

    /// Decoded column names in wire order.
    ///
    /// Fails with the first name that does not decode.
    pub fn names(&self) -> Result<Vec<Value>, CastError> {
        self.decoded_names().iter().cloned().collect()
    }

    fn decoded_names(&self) -> &[Result<Value, CastError>] {
        self.names.get_or_init(|| {
            self.raw
                .columns
                .iter()
                .map(|column| {
                    let tag = self.schema.name_type_of(&column.name);
                    codec::decode_value(tag, &column.name)
                })
                .collect()
        })
    }

    /// Decoded column values in wire order, one per name.
    ///
    /// Fails if any single column fails to decode.
    pub fn values(&self) -> Result<Vec<Option<Value>>, CastError> {
        (0..self.raw.columns.len())
            .map(|index| self.value_at(index))
            .collect()
    }

    /// Name/value pairs; a repeated name keeps its first position and its
    /// last value.
    pub fn to_pairs(&self) -> Result<Vec<(Value, Option<Value>)>, CastError> {
        let names = self.names()?;
        let values = self.values()?;
        let mut pairs: Vec<(Value, Option<Value>)> = Vec::with_capacity(names.len());
        for (name, value) in names.into_iter().zip(values) {
            match pairs.iter_mut().find(|(existing, _)| *existing == name) {
                Some(pair) => pair.1 = value,
                None => pairs.push((name, value)),
            }
        }
        Ok(pairs)
    }

    pub fn column_count(&self) -> usize {
        self.raw.columns.len()
    }

    /// Number of column values decoded so far.
    pub fn decoded_columns(&self) -> usize {
        self.values.borrow().iter().filter(|v| v.is_some()).count()
    }

    /// The raw record, for inspecting bytes that failed to decode.
    pub fn raw(&self) -> &RawRow {
        &self.raw
    }

    pub fn key(&self) -> &[u8] {
        &self.raw.key
    }

    pub fn schema(&self) -> &Arc<ResultSchema> {
        &self.schema
    }

    fn value_at(&self, index: usize) -> Decoded {
        if let Some(Some(cached)) = self.values.borrow().get(index) {
            return cached.clone();
        }
        let Some(column) = self.raw.columns.get(index) else {
            return Ok(None);
        };

        let tag = self.schema.value_type_of(&column.name);
        let decoded = codec::decode(tag, column.value.as_deref());
        if let Err(err) = &decoded {
            warn!(column = index, tag = %tag, reason = %err.reason, "column value failed to decode");
        }
        self.values.borrow_mut()[index] = Some(decoded.clone());
        decoded
    }
}

/// Text keys also match names decoded as opaque bytes.
fn name_matches(candidate: &Value, wanted: &Value) -> bool {
    match (candidate, wanted) {
        (Value::Blob(bytes), Value::Text(text)) => bytes.as_slice() == text.as_bytes(),
        _ => candidate == wanted,
    }
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Row")
            .field("key", &hex::encode(&self.raw.key))
            .field("columns", &self.raw.columns.len())
            .field("decoded", &self.decoded_columns())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::backend::RawColumn;
    use crate::test_utils::{long_column, raw_row, text_column};
    use crate::types::TypeTag;
    use rstest::rstest;

    fn schema() -> Arc<ResultSchema> {
        Arc::new(
            ResultSchema::default()
                .with_default_name_type(TypeTag::Utf8)
                .with_default_value_type(TypeTag::Utf8)
                .with_value_type("age", TypeTag::Int64)
                .with_value_type("broken", TypeTag::Int32),
        )
    }

    fn row() -> Row {
        Row::new(
            raw_row(
                b"k1",
                vec![
                    text_column("name", "ada"),
                    long_column("age", 36),
                    RawColumn::new("broken", Some(Vec::new())),
                ],
            ),
            schema(),
        )
    }

    #[test]
    fn test_get_by_name_and_position_agree() {
        let row = row();
        assert_eq!(row.get("age").unwrap(), Some(Value::Long(36)));
        assert_eq!(row.get(1usize).unwrap(), Some(Value::Long(36)));
    }

    #[test]
    fn test_name_then_position_decodes_once() {
        let row = row();
        assert_eq!(row.decoded_columns(), 0);
        row.get("name").unwrap();
        assert_eq!(row.decoded_columns(), 1);
        row.get(0usize).unwrap();
        assert_eq!(row.decoded_columns(), 1);
    }

    #[rstest]
    #[case(ColumnKey::from("missing"))]
    #[case(ColumnKey::from(17usize))]
    fn test_missing_column_is_absent(#[case] key: ColumnKey) {
        let row = row();
        assert_eq!(row.get(key).unwrap(), None);
        assert_eq!(row.decoded_columns(), 0);
    }

    #[test]
    fn test_bad_column_fails_but_siblings_still_decode() {
        let row = row();
        let first = row.get("broken").unwrap_err();
        let second = row.get(2usize).unwrap_err();
        assert_eq!(first, second);
        assert_eq!(first.tag, TypeTag::Int32);
        assert!(row.values().is_err());
        assert_eq!(row.get("name").unwrap(), Some(Value::from("ada")));
    }

    #[test]
    fn test_integer_named_column_wins_over_position() {
        let schema = Arc::new(
            ResultSchema::default()
                .with_default_name_type(TypeTag::Int32)
                .with_default_value_type(TypeTag::Utf8),
        );
        let row = Row::new(
            raw_row(
                b"k",
                vec![
                    RawColumn::new(vec![1u8], Some(b"one".to_vec())),
                    RawColumn::new(vec![0u8], Some(b"zero".to_vec())),
                ],
            ),
            schema,
        );
        assert_eq!(row.get(0usize).unwrap(), Some(Value::from("zero")));
        assert_eq!(row.get(1usize).unwrap(), Some(Value::from("one")));
    }

    #[test]
    fn test_to_pairs_last_value_wins() {
        let row = Row::new(
            raw_row(
                b"k",
                vec![
                    text_column("a", "1"),
                    text_column("b", "2"),
                    text_column("a", "3"),
                ],
            ),
            schema(),
        );
        assert_eq!(
            row.to_pairs().unwrap(),
            vec![
                (Value::from("a"), Some(Value::from("3"))),
                (Value::from("b"), Some(Value::from("2"))),
            ]
        );
        assert_eq!(row.get("a").unwrap(), Some(Value::from("3")));
    }

    #[test]
    fn test_text_key_matches_bytes_names() {
        let row = Row::new(
            raw_row(b"k", vec![text_column("name", "ada")]),
            Arc::new(ResultSchema::default()),
        );
        assert_eq!(row.get("name").unwrap(), Some(Value::Blob(b"ada".to_vec())));
    }

    #[test]
    fn test_raw_bytes_are_kept() {
        let row = row();
        assert_eq!(row.key(), b"k1");
        assert_eq!(row.column_count(), 3);
        assert_eq!(row.raw().columns[2].value, Some(Vec::new()));
    }

    #[test]
    fn test_undecodable_name_spares_its_siblings() {
        let schema = Arc::new(
            ResultSchema::default()
                .with_default_name_type(TypeTag::Int64)
                .with_default_value_type(TypeTag::Utf8),
        );
        let row = Row::new(
            raw_row(
                b"k",
                vec![
                    RawColumn::new(7i64.to_be_bytes().to_vec(), Some(b"seven".to_vec())),
                    RawColumn::new(b"bad".to_vec(), Some(b"orphan".to_vec())),
                ],
            ),
            schema,
        );
        assert_eq!(row.get(0usize).unwrap(), Some(Value::from("seven")));
        assert_eq!(row.get(1usize).unwrap(), Some(Value::from("orphan")));
        assert_eq!(row.get(Value::Long(7)).unwrap(), Some(Value::from("seven")));

        let err = row.names().unwrap_err();
        assert_eq!(err.tag, TypeTag::Int64);
        assert_eq!(err.bytes, b"bad".to_vec());
        assert_eq!(row.to_pairs().unwrap_err(), err);
        assert_eq!(row.values().unwrap().len(), 2);
    }

    #[test]
    fn test_key_column_decodes_under_its_own_rules() {
        let schema = Arc::new(
            ResultSchema::default()
                .with_default_name_type(TypeTag::Int64)
                .with_default_value_type(TypeTag::Utf8)
                .with_key("id", TypeTag::Int64),
        );
        let row = Row::new(
            raw_row(
                b"k",
                vec![
                    long_column("id", 5),
                    RawColumn::new(3i64.to_be_bytes().to_vec(), Some(b"three".to_vec())),
                ],
            ),
            schema,
        );
        assert_eq!(row.names().unwrap(), vec![Value::from("id"), Value::Long(3)]);
        assert_eq!(row.get(0usize).unwrap(), Some(Value::Long(5)));
        assert_eq!(row.get("id").unwrap(), Some(Value::Long(5)));
        assert_eq!(row.get(3usize).unwrap(), Some(Value::from("three")));
    }
}
