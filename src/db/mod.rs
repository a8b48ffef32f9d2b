//! Query session, statement templating and result decoding.
//!
//! This module sits between application code and the transport that speaks
//! the wire protocol:
//! - Statement templating with type-directed bind value serialization
//! - The session that hands finished queries to a [`Transport`]
//! - Result cursors producing lazily-decoded rows
//! - Keyspace and table definitions, and the per-response schema snapshot
//!
//! # Architecture
//!
//! A caller supplies a template and bind values; [`Templater`] produces the
//! finished query text. The transport returns a [`RawResult`], which
//! [`QueryResult`] wraps. Every pulled record becomes a [`Row`] sharing one
//! [`ResultSchema`]; the row decodes a column through the codec only when
//! it is first asked for.
//!
//! # Type Decisions
//!
//! **Why `Arc<ResultSchema>` in every row?**
//! The snapshot is immutable once built, and rows outlive the cursor that
//! produced them. Shared ownership keeps rows independent of the result
//! while letting the snapshot cross threads without locking.
//!
//! **Why a `RefCell` cache inside `Row`?**
//! Reads are logically immutable but decode on first access. The cache is
//! private to each row, so rows are `Send` but not `Sync`; consumers that
//! need concurrency fan out rows rather than share them.

pub mod backend;
pub mod connection;
pub mod escape;
pub mod query;
pub mod result;
pub mod row;
pub mod schema;

pub use backend::{
    Compression, RawColumn, RawResult, RawRow, ResultKind, ResultMetadata, Transport,
    TransportError,
};
pub use connection::{Database, ExecuteOptions};
pub use escape::{CqlLiteral, escape, quote, quote_value, unescape};
pub use query::{KeyspaceChange, Statement, Templater, render, serialize};
pub use result::{Fetched, IntoCursor, QueryResult};
pub use row::{ColumnKey, Row};
pub use schema::{ColumnFamily, KeyColumn, Keyspace, ResultSchema};

use thiserror::Error;

use crate::codec::CastError;

/// Errors raised by templating, decoding and query execution.
///
/// Every variant names the value, position or bytes involved so the
/// condition can be reproduced without re-querying.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CqlError {
    #[error(transparent)]
    Cast(#[from] CastError),

    #[error("Invalid cursor position: {value}")]
    InvalidCursor { value: String },

    #[error("Wrong number of bound variables (statement expected {expected}, was {actual})")]
    InvalidBindVariable { expected: usize, actual: usize },

    #[error("Unable to escape object of type {type_name}")]
    UnescapableObject { type_name: String },

    #[error("Time {value} cannot be embedded in a time-based UUID")]
    TimestampOutOfRange { value: String },

    #[error("Expects one of ROWS (1), VOID (2), INT (3); was {code}")]
    InvalidResultType { code: i32 },

    #[error("Invalid request: {why}")]
    Request { why: String },

    #[error("Transport failed: {message}")]
    Transport { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl From<TransportError> for CqlError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::InvalidRequest { why } => CqlError::Request { why },
            other => CqlError::Transport {
                message: other.to_string(),
            },
        }
    }
}
