//! Test fixtures for keyspace and table definitions.
//!
//! Fixtures are loaded at compile time using `include_str!` and
//! deserialize into [`KsDef`](crate::db::schema::KsDef).
//!
//! ## Available Fixtures
//!
//! - [`KEYSPACE`] - An application keyspace with three tables
//! - [`SYSTEM`] - A minimal system keyspace

/// Application keyspace `cql_marshal_test`.
///
/// Contains:
/// - `users`: UTF8 names, key alias `id`, typed `age`/`email`/`tags` columns
/// - `counters`: Ascii names, counter values
/// - `sparse`: four declared columns `c1`..`c4` of different types
pub const KEYSPACE: &str = include_str!("keyspace.json");

/// The `system` keyspace selected by default on connect.
pub const SYSTEM: &str = include_str!("system.json");
