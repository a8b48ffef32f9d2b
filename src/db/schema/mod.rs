//! Schema objects: keyspace and table definitions, and the result snapshot.
//!
//! # Architecture
//!
//! - `definition`: serde data as the schema collaborator delivers it
//! - `keyspace`: [`Keyspace`] and [`ColumnFamily`], typed views over it
//! - `result_schema`: [`ResultSchema`], the immutable type rules rows decode with

pub mod definition;
mod keyspace;
mod result_schema;

pub use definition::{CfDef, ColumnDef, KsDef};
pub use keyspace::{ColumnFamily, Keyspace};
pub use result_schema::{KeyColumn, ResultSchema};
