//! Transport abstraction and the raw payloads it exchanges.
//!
//! The transport owns the network: connection pooling, retries,
//! authentication and framing all live behind [`Transport`]. This crate
//! only hands it a finished query and decodes what comes back.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use super::schema::definition::KsDef;

/// How the query bytes handed to the transport are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Plain query text
    #[default]
    None,
    /// zlib-deflated query text
    Gzip,
}

/// One column as received on the wire.
///
/// `value: None` is the nil marker; it decodes to an absent value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawColumn {
    pub name: Vec<u8>,
    pub value: Option<Vec<u8>>,
}

impl RawColumn {
    pub fn new(name: impl Into<Vec<u8>>, value: Option<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// One record: its key and its columns in wire order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawRow {
    pub key: Vec<u8>,
    pub columns: Vec<RawColumn>,
}

/// Column-type metadata attached to a rows response.
///
/// Type names are marshaller class names; maps are keyed by raw column
/// name bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultMetadata {
    pub name_types: HashMap<Vec<u8>, String>,
    pub value_types: HashMap<Vec<u8>, String>,
    pub default_name_type: String,
    pub default_value_type: String,
}

/// The three response kinds a query can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Rows,
    Void,
    Int,
}

impl ResultKind {
    pub const ROWS: i32 = 1;
    pub const VOID: i32 = 2;
    pub const INT: i32 = 3;

    /// Maps a wire result-type code to a kind, `None` for unknown codes.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            Self::ROWS => Some(ResultKind::Rows),
            Self::VOID => Some(ResultKind::Void),
            Self::INT => Some(ResultKind::Int),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            ResultKind::Rows => Self::ROWS,
            ResultKind::Void => Self::VOID,
            ResultKind::Int => Self::INT,
        }
    }
}

/// A response exactly as the transport produced it.
///
/// `kind` is kept as the raw code so an unknown kind surfaces as an error
/// when the result is wrapped, not when the transport decodes it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawResult {
    pub kind: i32,
    pub rows: Vec<RawRow>,
    pub num: Option<i64>,
    pub schema: Option<ResultMetadata>,
}

impl RawResult {
    pub fn void() -> Self {
        Self {
            kind: ResultKind::VOID,
            ..Default::default()
        }
    }

    pub fn int(num: i64) -> Self {
        Self {
            kind: ResultKind::INT,
            num: Some(num),
            ..Default::default()
        }
    }

    pub fn rows(rows: Vec<RawRow>, schema: Option<ResultMetadata>) -> Self {
        Self {
            kind: ResultKind::ROWS,
            rows,
            num: None,
            schema,
        }
    }
}

/// Failures reported by a transport.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// The server rejected the request (bad query text, schema mismatch)
    #[error("invalid request: {why}")]
    InvalidRequest { why: String },

    #[error("unavailable: {message}")]
    Unavailable { message: String },

    #[error("{message}")]
    Other { message: String },
}

/// Trait for the wire-level collaborator that executes finished queries.
///
/// Implementations must be thread-safe (Send + Sync); the session never
/// calls them concurrently itself.
pub trait Transport: Send + Sync {
    /// Executes a finished query, possibly compressed.
    fn execute_cql_query(
        &self,
        query: &[u8],
        compression: Compression,
    ) -> Result<RawResult, TransportError>;

    /// Fetches the definition of one keyspace.
    fn describe_keyspace(&self, name: &str) -> Result<KsDef, TransportError>;

    /// Fetches the definitions of every keyspace.
    fn describe_keyspaces(&self) -> Result<Vec<KsDef>, TransportError>;

    /// Reports the server's protocol version; used as a liveness check.
    fn describe_version(&self) -> Result<String, TransportError>;

    /// Selects the query-language version for subsequent requests.
    ///
    /// # Default Implementation
    /// Returns Ok(()) for transports with a fixed language version.
    fn set_cql_version(&self, _version: &str) -> Result<(), TransportError> {
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute_cql_query(
        &self,
        query: &[u8],
        compression: Compression,
    ) -> Result<RawResult, TransportError> {
        (**self).execute_cql_query(query, compression)
    }

    fn describe_keyspace(&self, name: &str) -> Result<KsDef, TransportError> {
        (**self).describe_keyspace(name)
    }

    fn describe_keyspaces(&self) -> Result<Vec<KsDef>, TransportError> {
        (**self).describe_keyspaces()
    }

    fn describe_version(&self) -> Result<String, TransportError> {
        (**self).describe_version()
    }

    fn set_cql_version(&self, version: &str) -> Result<(), TransportError> {
        (**self).set_cql_version(version)
    }
}
