//! Pull-based cursor over a query response.

use std::fmt::Debug;
use std::sync::Arc;

use super::CqlError;
use super::backend::{RawResult, RawRow, ResultKind};
use super::row::Row;
use super::schema::ResultSchema;
use crate::codec::CastError;
use crate::types::Value;

/// What one pull produced.
#[derive(Debug)]
pub enum Fetched {
    Row(Row),
    Int(i64),
}

#[derive(Debug, Clone, PartialEq)]
enum Outcome {
    Void,
    /// `None` when the server sent no number
    Int(Option<i64>),
    Rows(Vec<RawRow>),
}

/// Values that can be coerced to a cursor position.
pub trait IntoCursor {
    /// The 0-based position, or `None` if the value is not a valid position.
    fn into_cursor(self) -> Option<usize>;
}

impl IntoCursor for usize {
    fn into_cursor(self) -> Option<usize> {
        Some(self)
    }
}

impl IntoCursor for u32 {
    fn into_cursor(self) -> Option<usize> {
        usize::try_from(self).ok()
    }
}

impl IntoCursor for i32 {
    fn into_cursor(self) -> Option<usize> {
        usize::try_from(self).ok()
    }
}

impl IntoCursor for i64 {
    fn into_cursor(self) -> Option<usize> {
        usize::try_from(self).ok()
    }
}

impl IntoCursor for f64 {
    fn into_cursor(self) -> Option<usize> {
        if self.is_finite() && self >= 0.0 && self <= usize::MAX as f64 {
            Some(self.trunc() as usize)
        } else {
            None
        }
    }
}

impl IntoCursor for &str {
    fn into_cursor(self) -> Option<usize> {
        self.trim().parse().ok()
    }
}

/// A void, scalar or rows response with a cursor.
///
/// A scalar behaves as a one-element sequence: the first pull yields the
/// integer, later pulls yield nothing until the cursor is reset.
#[derive(Debug)]
pub struct QueryResult {
    outcome: Outcome,
    schema: Option<Arc<ResultSchema>>,
    cursor: usize,
}

impl QueryResult {
    /// Wraps a transport response.
    ///
    /// `fallback` supplies the snapshot for a rows response that carries no
    /// metadata of its own; without either, every column decodes as bytes.
    pub fn from_raw(raw: RawResult, fallback: Option<ResultSchema>) -> Result<Self, CqlError> {
        let kind =
            ResultKind::from_code(raw.kind).ok_or(CqlError::InvalidResultType { code: raw.kind })?;
        let result = match kind {
            ResultKind::Void => Self {
                outcome: Outcome::Void,
                schema: None,
                cursor: 0,
            },
            ResultKind::Int => Self {
                outcome: Outcome::Int(raw.num),
                schema: None,
                cursor: 0,
            },
            ResultKind::Rows => {
                let schema = match &raw.schema {
                    Some(metadata) => ResultSchema::from_metadata(metadata),
                    None => fallback.unwrap_or_default(),
                };
                Self {
                    outcome: Outcome::Rows(raw.rows),
                    schema: Some(Arc::new(schema)),
                    cursor: 0,
                }
            }
        };
        Ok(result)
    }

    pub fn is_void(&self) -> bool {
        matches!(self.outcome, Outcome::Void)
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.outcome, Outcome::Int(_))
    }

    pub fn is_rows(&self) -> bool {
        matches!(self.outcome, Outcome::Rows(_))
    }

    /// Number of pullable items: rows, 1 for a scalar, 0 for void or a
    /// scalar without a number.
    pub fn row_count(&self) -> usize {
        match &self.outcome {
            Outcome::Void => 0,
            Outcome::Int(n) => usize::from(n.is_some()),
            Outcome::Rows(rows) => rows.len(),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Moves the cursor. Positions past the end are allowed.
    ///
    /// # Errors
    ///
    /// `InvalidCursor` if `value` does not coerce to a position; the
    /// cursor is left unchanged.
    pub fn set_cursor<V: IntoCursor + Debug>(&mut self, value: V) -> Result<(), CqlError> {
        let shown = format!("{:?}", value);
        self.cursor = value
            .into_cursor()
            .ok_or(CqlError::InvalidCursor { value: shown })?;
        Ok(())
    }

    /// The snapshot shared by every row; `None` unless this is a rows response.
    pub fn schema(&self) -> Option<&Arc<ResultSchema>> {
        self.schema.as_ref()
    }

    /// Pulls the next item and advances the cursor.
    pub fn fetch(&mut self) -> Option<Fetched> {
        let fetched = match &self.outcome {
            Outcome::Void => None,
            Outcome::Int(n) => n.filter(|_| self.cursor == 0).map(Fetched::Int),
            Outcome::Rows(rows) => {
                let raw = rows.get(self.cursor)?.clone();
                let schema = Arc::clone(self.schema.as_ref()?);
                Some(Fetched::Row(Row::new(raw, schema)))
            }
        };
        if fetched.is_some() {
            self.cursor += 1;
        }
        fetched
    }

    /// Pulls the next row; scalar and void responses yield nothing.
    pub fn fetch_row(&mut self) -> Option<Row> {
        if !self.is_rows() {
            return None;
        }
        match self.fetch()? {
            Fetched::Row(row) => Some(row),
            Fetched::Int(_) => None,
        }
    }

    /// Pulls the next item as name/value pairs.
    ///
    /// A scalar appears as a single pair mapping the integer to itself.
    pub fn fetch_pairs(&mut self) -> Result<Option<Vec<(Value, Option<Value>)>>, CastError> {
        match self.fetch() {
            None => Ok(None),
            Some(Fetched::Int(n)) => Ok(Some(vec![(Value::Long(n), Some(Value::Long(n)))])),
            Some(Fetched::Row(row)) => row.to_pairs().map(Some),
        }
    }

    /// Pulls the next item as its values in column order.
    pub fn fetch_values(&mut self) -> Result<Option<Vec<Option<Value>>>, CastError> {
        match self.fetch() {
            None => Ok(None),
            Some(Fetched::Int(n)) => Ok(Some(vec![Some(Value::Long(n))])),
            Some(Fetched::Row(row)) => row.values().map(Some),
        }
    }

    /// Pulls every remaining item as pairs.
    pub fn drain_pairs(&mut self) -> Result<Vec<Vec<(Value, Option<Value>)>>, CastError> {
        let mut drained = Vec::new();
        while let Some(pairs) = self.fetch_pairs()? {
            drained.push(pairs);
        }
        Ok(drained)
    }

    /// Pulls every remaining item as value lists.
    pub fn drain_values(&mut self) -> Result<Vec<Vec<Option<Value>>>, CastError> {
        let mut drained = Vec::new();
        while let Some(values) = self.fetch_values()? {
            drained.push(values);
        }
        Ok(drained)
    }

    /// Iterates the remaining rows, advancing the cursor.
    pub fn rows(&mut self) -> impl Iterator<Item = Row> + '_ {
        std::iter::from_fn(move || self.fetch_row())
    }
}
