//! Keyspace and table definitions as delivered by the schema collaborator.
//!
//! These are plain data: the transport fills them from its describe calls
//! and the fixtures deserialize them from JSON. Type names are marshaller
//! class names and are only interpreted when a [`ResultSchema`] is built.
//!
//! [`ResultSchema`]: super::ResultSchema

use serde::{Deserialize, Serialize};

/// Definition of one keyspace and the tables it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KsDef {
    pub name: String,

    /// Replica placement strategy class
    #[serde(default)]
    pub strategy_class: String,

    #[serde(default)]
    pub cf_defs: Vec<CfDef>,
}

/// Definition of one column family (table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CfDef {
    pub name: String,

    /// "Standard" or "Super"
    #[serde(default = "default_column_type")]
    pub column_type: String,

    /// Type rule for column names
    #[serde(default = "default_marshal")]
    pub comparator_type: String,

    /// Type rule for values of undeclared columns
    #[serde(default = "default_marshal")]
    pub default_validation_class: String,

    /// Type rule for the row key
    #[serde(default = "default_marshal")]
    pub key_validation_class: String,

    /// Name under which the row key appears as a column
    #[serde(default)]
    pub key_alias: Option<String>,

    #[serde(default)]
    pub column_metadata: Vec<ColumnDef>,

    #[serde(default)]
    pub id: Option<i32>,
}

/// A declared column and the type rule for its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub validation_class: String,
}

fn default_column_type() -> String {
    "Standard".to_string()
}

fn default_marshal() -> String {
    "BytesType".to_string()
}

impl CfDef {
    /// Creates a standard table with bytes everywhere and no declared columns.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: default_column_type(),
            comparator_type: default_marshal(),
            default_validation_class: default_marshal(),
            key_validation_class: default_marshal(),
            key_alias: None,
            column_metadata: Vec::new(),
            id: None,
        }
    }
}
