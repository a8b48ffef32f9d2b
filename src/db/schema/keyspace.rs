//! Keyspace and column family views over the raw definitions.

use std::collections::BTreeMap;
use std::fmt;

use super::definition::{CfDef, KsDef};
use crate::types::TypeTag;

/// A keyspace with its column families indexed by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyspace {
    def: KsDef,
    column_families: BTreeMap<String, ColumnFamily>,
}

impl Keyspace {
    pub fn new(def: KsDef) -> Self {
        let column_families = def
            .cf_defs
            .iter()
            .map(|cf| (cf.name.clone(), ColumnFamily::new(cf.clone())))
            .collect();
        Self {
            def,
            column_families,
        }
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn strategy_class(&self) -> &str {
        &self.def.strategy_class
    }

    pub fn column_families(&self) -> &BTreeMap<String, ColumnFamily> {
        &self.column_families
    }

    pub fn column_family(&self, name: &str) -> Option<&ColumnFamily> {
        self.column_families.get(name)
    }

    /// Names of all column families, sorted.
    pub fn column_family_names(&self) -> Vec<&str> {
        self.column_families.keys().map(String::as_str).collect()
    }

    /// Alias of [`Keyspace::column_family_names`].
    pub fn tables(&self) -> Vec<&str> {
        self.column_family_names()
    }

    /// The definition this view was built from.
    pub fn def(&self) -> &KsDef {
        &self.def
    }
}

impl fmt::Display for Keyspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A column family (table) definition with typed accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFamily {
    def: CfDef,
}

impl ColumnFamily {
    pub fn new(def: CfDef) -> Self {
        Self { def }
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn id(&self) -> Option<i32> {
        self.def.id
    }

    pub fn column_type(&self) -> &str {
        &self.def.column_type
    }

    pub fn is_standard(&self) -> bool {
        self.def.column_type == "Standard"
    }

    pub fn is_super(&self) -> bool {
        self.def.column_type == "Super"
    }

    /// Type rule for column names.
    pub fn comparator(&self) -> TypeTag {
        TypeTag::parse(&self.def.comparator_type)
    }

    pub fn default_validation(&self) -> TypeTag {
        TypeTag::parse(&self.def.default_validation_class)
    }

    pub fn key_validation(&self) -> TypeTag {
        TypeTag::parse(&self.def.key_validation_class)
    }

    pub fn key_alias(&self) -> Option<&str> {
        self.def.key_alias.as_deref()
    }

    /// Declared value types by column name, including the key alias.
    ///
    /// Undeclared columns are not listed; they decode under
    /// [`ColumnFamily::default_validation`].
    pub fn columns(&self) -> BTreeMap<String, TypeTag> {
        let mut columns: BTreeMap<String, TypeTag> = self
            .def
            .column_metadata
            .iter()
            .map(|col| (col.name.clone(), TypeTag::parse(&col.validation_class)))
            .collect();
        if let Some(alias) = self.key_alias() {
            columns.insert(alias.to_string(), self.key_validation());
        }
        columns
    }

    /// The definition this view was built from.
    pub fn def(&self) -> &CfDef {
        &self.def
    }
}
