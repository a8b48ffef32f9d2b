//! Session management on top of a transport.

use tracing::debug;

use super::CqlError;
use super::backend::{Compression, RawResult, ResultKind, Transport};
use super::query::{KeyspaceChange, Statement, Templater};
use super::result::QueryResult;
use super::schema::{Keyspace, ResultSchema};
use crate::config::ConfigFile;
use crate::types::BindValue;
use crate::utils::compress;

/// Per-call overrides for [`Database::execute_statement`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecuteOptions {
    /// `None` uses the session default from the dialect
    pub compression: Option<Compression>,
}

/// A session: renders statements, hands them to the transport and wraps
/// the responses.
///
/// The session tracks the current keyspace by watching the statements it
/// executes. It is not meant to be shared between threads; open one per
/// consumer.
pub struct Database {
    transport: Box<dyn Transport>,
    keyspace: Option<String>,
    templater: Templater,
    compression: Compression,
}

impl Database {
    /// Opens a session and selects the configured keyspace.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport rejects the language version or the
    /// initial `USE`.
    pub fn connect(
        transport: impl Transport + 'static,
        config: &ConfigFile,
    ) -> Result<Self, CqlError> {
        if let Some(version) = &config.connection.cql_version {
            transport.set_cql_version(version)?;
        }

        let mut db = Self {
            transport: Box::new(transport),
            keyspace: None,
            templater: Templater::new(&config.dialect),
            compression: if config.dialect.compression {
                Compression::Gzip
            } else {
                Compression::None
            },
        };
        db.set_keyspace(&config.connection.keyspace)?;
        Ok(db)
    }

    /// The keyspace the last successful `USE` selected.
    pub fn keyspace(&self) -> Option<&str> {
        self.keyspace.as_deref()
    }

    /// Switches the session to `keyspace`.
    pub fn set_keyspace(&mut self, keyspace: &str) -> Result<(), CqlError> {
        self.execute("USE ?", &[keyspace.into()])?;
        debug!(keyspace = %keyspace, "switched keyspace");
        self.keyspace = Some(keyspace.to_string());
        Ok(())
    }

    pub fn templater(&self) -> &Templater {
        &self.templater
    }

    /// Wraps a template for repeated execution.
    pub fn prepare(&self, template: &str) -> Statement {
        Statement::new(template)
    }

    /// Renders and executes a template with the session defaults.
    ///
    /// Returns `None` for a void response.
    pub fn execute(
        &mut self,
        template: &str,
        binds: &[BindValue],
    ) -> Result<Option<QueryResult>, CqlError> {
        self.execute_statement(&Statement::new(template), binds, ExecuteOptions::default())
    }

    /// Renders and executes a prepared statement.
    ///
    /// A rows response without metadata for a `select` is decoded with the
    /// selected table's definition. Keyspace and table are read from the
    /// template, never from bound values.
    ///
    /// # Errors
    ///
    /// - `InvalidBindVariable` / `UnescapableObject` from rendering
    /// - `Request` if the server rejected the query
    /// - `InvalidResultType` for an unknown response kind
    pub fn execute_statement(
        &mut self,
        statement: &Statement,
        binds: &[BindValue],
        options: ExecuteOptions,
    ) -> Result<Option<QueryResult>, CqlError> {
        let finished = self.templater.render(statement.text(), binds)?;
        let compression = options.compression.unwrap_or(self.compression);
        let raw = self.execute_cql_query(&finished, compression)?;

        match statement.keyspace_change() {
            Some(KeyspaceChange::Use(keyspace)) => {
                debug!(keyspace = %keyspace, "switched keyspace");
                self.keyspace = Some(keyspace);
            }
            Some(KeyspaceChange::Drop(keyspace)) => {
                if self.keyspace.as_deref() == Some(keyspace.as_str()) {
                    debug!(keyspace = %keyspace, "dropped current keyspace");
                    self.keyspace = None;
                }
            }
            None => {}
        }

        let fallback = if raw.kind == ResultKind::ROWS && raw.schema.is_none() {
            match statement.column_family() {
                Some(table) => self.table_schema(table)?,
                None => None,
            }
        } else {
            None
        };

        let result = QueryResult::from_raw(raw, fallback)?;
        if result.is_void() {
            Ok(None)
        } else {
            Ok(Some(result))
        }
    }

    /// Sends finished query text to the transport unchanged.
    pub fn execute_cql_query(
        &self,
        query: &str,
        compression: Compression,
    ) -> Result<RawResult, CqlError> {
        let bytes = match compression {
            Compression::None => query.as_bytes().to_vec(),
            Compression::Gzip => compress(query.as_bytes()).map_err(|e| CqlError::Transport {
                message: format!("Failed to compress query: {}", e),
            })?,
        };
        debug!(
            len = query.len(),
            sent = bytes.len(),
            compression = ?compression,
            "executing query"
        );
        Ok(self.transport.execute_cql_query(&bytes, compression)?)
    }

    /// Definition of the current keyspace.
    pub fn schema(&self) -> Result<Keyspace, CqlError> {
        let keyspace = self.keyspace.as_deref().ok_or_else(|| CqlError::Request {
            why: "no keyspace selected".to_string(),
        })?;
        Ok(Keyspace::new(self.transport.describe_keyspace(keyspace)?))
    }

    /// Definitions of every keyspace.
    pub fn keyspaces(&self) -> Result<Vec<Keyspace>, CqlError> {
        Ok(self
            .transport
            .describe_keyspaces()?
            .into_iter()
            .map(Keyspace::new)
            .collect())
    }

    /// Asks the transport for its version; false if it cannot report one.
    pub fn is_active(&self) -> bool {
        self.transport.describe_version().is_ok()
    }

    fn table_schema(&self, table: &str) -> Result<Option<ResultSchema>, CqlError> {
        if self.keyspace.is_none() {
            return Ok(None);
        }
        let keyspace = self.schema()?;
        Ok(keyspace
            .column_family(table)
            .map(ResultSchema::from_column_family))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Dialect, TimeLiteral};
    use crate::db::backend::TransportError;
    use crate::test_utils::{MemoryTransport, long_column, raw_row, text_column};
    use crate::types::{TypeTag, Value};
    use std::sync::Arc;

    fn connect(config: &ConfigFile) -> (Arc<MemoryTransport>, Database) {
        let transport = Arc::new(MemoryTransport::with_fixtures());
        let db = Database::connect(Arc::clone(&transport), config).unwrap();
        (transport, db)
    }

    fn app_config() -> ConfigFile {
        let mut config = ConfigFile::default();
        config.connection.keyspace = "cql_marshal_test".to_string();
        config
    }

    #[test]
    fn test_connect_selects_keyspace() {
        let (transport, db) = connect(&ConfigFile::default());
        assert_eq!(db.keyspace(), Some("system"));
        assert_eq!(transport.last_query().as_deref(), Some("USE 'system'"));
    }

    #[test]
    fn test_connect_passes_cql_version() {
        let mut config = ConfigFile::default();
        config.connection.cql_version = Some("2.0.0".to_string());
        let (transport, _db) = connect(&config);
        assert_eq!(transport.cql_version().as_deref(), Some("2.0.0"));
    }

    #[test]
    fn test_void_result_is_none() {
        let (_transport, mut db) = connect(&app_config());
        let result = db
            .execute("update users set age = ? where id = ?", &[36i64.into(), "ada".into()])
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_use_and_drop_track_keyspace() {
        let (_transport, mut db) = connect(&ConfigFile::default());
        db.execute("use cql_marshal_test", &[]).unwrap();
        assert_eq!(db.keyspace(), Some("cql_marshal_test"));
        db.execute("drop keyspace other", &[]).unwrap();
        assert_eq!(db.keyspace(), Some("cql_marshal_test"));
        db.execute("DROP KEYSPACE cql_marshal_test", &[]).unwrap();
        assert_eq!(db.keyspace(), None);
    }

    #[test]
    fn test_failed_use_keeps_keyspace() {
        let (transport, mut db) = connect(&ConfigFile::default());
        transport.fail(TransportError::InvalidRequest {
            why: "Keyspace 'nope' does not exist".to_string(),
        });
        let err = db.execute("use nope", &[]).unwrap_err();
        assert!(matches!(err, CqlError::Request { .. }));
        assert_eq!(db.keyspace(), Some("system"));
    }

    #[test]
    fn test_select_without_metadata_uses_table_definition() {
        let (transport, mut db) = connect(&app_config());
        transport.respond(RawResult::rows(
            vec![raw_row(
                b"ada",
                vec![text_column("id", "ada"), long_column("age", 36)],
            )],
            None,
        ));
        let mut result = db
            .execute("select * from users where id = ?", &["ada".into()])
            .unwrap()
            .unwrap();
        let row = result.fetch_row().unwrap();
        assert_eq!(row.get("id").unwrap(), Some(Value::from("ada")));
        assert_eq!(row.get("age").unwrap(), Some(Value::Long(36)));
    }

    #[test]
    fn test_bound_text_does_not_pick_the_table() {
        let (transport, mut db) = connect(&app_config());
        transport.respond(RawResult::rows(
            vec![raw_row(b"ada", vec![long_column("age", 36)])],
            None,
        ));
        let mut result = db
            .execute("select ? from users", &[" from counters".into()])
            .unwrap()
            .unwrap();
        assert_eq!(
            transport.last_query().as_deref(),
            Some("select ' from counters' from users")
        );
        let schema = result.schema().unwrap();
        assert_eq!(schema.default_value_type(), &TypeTag::Utf8);
        let row = result.fetch_row().unwrap();
        assert_eq!(row.get("age").unwrap(), Some(Value::Long(36)));
    }

    #[test]
    fn test_session_compression_deflates_queries() {
        let mut config = app_config();
        config.dialect = Dialect {
            time_literal: TimeLiteral::EpochMillis,
            compression: true,
        };
        let (transport, mut db) = connect(&config);
        db.execute("select * from users", &[]).unwrap();
        let last = transport.queries().pop().unwrap();
        assert_eq!(last.compression, Compression::Gzip);
        assert_eq!(last.text, "select * from users");
    }

    #[test]
    fn test_per_call_compression_override() {
        let (transport, mut db) = connect(&app_config());
        let statement = db.prepare("select * from users");
        db.execute_statement(
            &statement,
            &[],
            ExecuteOptions {
                compression: Some(Compression::Gzip),
            },
        )
        .unwrap();
        assert_eq!(transport.queries().pop().unwrap().compression, Compression::Gzip);
    }

    #[test]
    fn test_schema_and_keyspaces() {
        let (_transport, db) = connect(&app_config());
        let schema = db.schema().unwrap();
        assert_eq!(schema.name(), "cql_marshal_test");
        assert!(schema.column_family("users").is_some());
        let names: Vec<String> = db.keyspaces().unwrap().iter().map(|k| k.to_string()).collect();
        assert_eq!(names, vec!["system", "cql_marshal_test"]);
        assert!(db.is_active());
    }

    #[test]
    fn test_bind_count_mismatch_sends_nothing() {
        let (transport, mut db) = connect(&app_config());
        let before = transport.queries().len();
        let err = db.execute("select ? from users", &[]).unwrap_err();
        assert_eq!(
            err,
            CqlError::InvalidBindVariable {
                expected: 1,
                actual: 0
            }
        );
        assert_eq!(transport.queries().len(), before);
    }
}
