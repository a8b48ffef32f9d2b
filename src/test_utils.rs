//! Shared test utilities for session and result tests.
//!
//! [`MemoryTransport`] stands in for the wire-level transport: it records
//! every query it is handed and replays canned responses in order.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::db::backend::{
    Compression, RawColumn, RawResult, RawRow, Transport, TransportError,
};
use crate::db::schema::KsDef;
use crate::fixtures;
use crate::utils::decompress;

/// A query as the transport received it, decompressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedQuery {
    pub text: String,
    pub compression: Compression,
}

/// In-process transport with scripted responses.
///
/// When the queue of responses is empty every query returns void.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    keyspaces: Vec<KsDef>,
    version: String,
    responses: Mutex<VecDeque<Result<RawResult, TransportError>>>,
    queries: Mutex<Vec<RecordedQuery>>,
    cql_version: Mutex<Option<String>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self {
            version: "19.20.0".to_string(),
            ..Default::default()
        }
    }

    /// A transport that knows the `system` and `cql_marshal_test` fixtures.
    pub fn with_fixtures() -> Self {
        Self::new()
            .with_keyspace(parse_keyspace(fixtures::SYSTEM))
            .with_keyspace(parse_keyspace(fixtures::KEYSPACE))
    }

    pub fn with_keyspace(mut self, keyspace: KsDef) -> Self {
        self.keyspaces.push(keyspace);
        self
    }

    /// Queues the response for the next unanswered query.
    pub fn respond(&self, response: RawResult) {
        self.responses
            .lock()
            .expect("responses lock poisoned")
            .push_back(Ok(response));
    }

    /// Queues a failure for the next unanswered query.
    pub fn fail(&self, error: TransportError) {
        self.responses
            .lock()
            .expect("responses lock poisoned")
            .push_back(Err(error));
    }

    /// Every query received so far, oldest first.
    pub fn queries(&self) -> Vec<RecordedQuery> {
        self.queries.lock().expect("queries lock poisoned").clone()
    }

    pub fn last_query(&self) -> Option<String> {
        self.queries().last().map(|q| q.text.clone())
    }

    pub fn cql_version(&self) -> Option<String> {
        self.cql_version
            .lock()
            .expect("version lock poisoned")
            .clone()
    }
}

impl Transport for MemoryTransport {
    fn execute_cql_query(
        &self,
        query: &[u8],
        compression: Compression,
    ) -> Result<RawResult, TransportError> {
        let bytes = match compression {
            Compression::None => query.to_vec(),
            Compression::Gzip => decompress(query).map_err(|e| TransportError::Other {
                message: e.to_string(),
            })?,
        };
        self.queries
            .lock()
            .expect("queries lock poisoned")
            .push(RecordedQuery {
                text: String::from_utf8_lossy(&bytes).into_owned(),
                compression,
            });
        self.responses
            .lock()
            .expect("responses lock poisoned")
            .pop_front()
            .unwrap_or_else(|| Ok(RawResult::void()))
    }

    fn describe_keyspace(&self, name: &str) -> Result<KsDef, TransportError> {
        self.keyspaces
            .iter()
            .find(|ks| ks.name == name)
            .cloned()
            .ok_or_else(|| TransportError::InvalidRequest {
                why: format!("Keyspace {} does not exist", name),
            })
    }

    fn describe_keyspaces(&self) -> Result<Vec<KsDef>, TransportError> {
        Ok(self.keyspaces.clone())
    }

    fn describe_version(&self) -> Result<String, TransportError> {
        Ok(self.version.clone())
    }

    fn set_cql_version(&self, version: &str) -> Result<(), TransportError> {
        *self.cql_version.lock().expect("version lock poisoned") = Some(version.to_string());
        Ok(())
    }
}

/// Parse a keyspace definition fixture.
pub fn parse_keyspace(json: &str) -> KsDef {
    serde_json::from_str(json).expect("Fixture should be a valid keyspace definition")
}

/// Build a raw record.
pub fn raw_row(key: &[u8], columns: Vec<RawColumn>) -> RawRow {
    RawRow {
        key: key.to_vec(),
        columns,
    }
}

/// A column whose value is UTF-8 text.
pub fn text_column(name: &str, value: &str) -> RawColumn {
    RawColumn::new(name, Some(value.as_bytes().to_vec()))
}

/// A column whose value is a big-endian 64-bit integer.
pub fn long_column(name: &str, value: i64) -> RawColumn {
    RawColumn::new(name, Some(value.to_be_bytes().to_vec()))
}

/// A column carrying the nil marker.
pub fn nil_column(name: &str) -> RawColumn {
    RawColumn::new(name, None)
}
