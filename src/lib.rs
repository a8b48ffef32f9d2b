//! cql_marshal library - CQL value marshaling and statement templating
//!
//! Provides the binary column codec, the statement templater, and the
//! row/result cursor that sit between application code and a transport
//! speaking the column database's wire protocol.

pub mod codec;
pub mod config;
pub mod db;
pub mod types;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod fixtures;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use codec::{CastError, decode, decode_named};
pub use config::{ConfigFile, Dialect, TimeLiteral};
pub use db::{CqlError, Database, QueryResult, Row, Templater, render, serialize};
pub use types::{BindValue, TypeTag, Value};
