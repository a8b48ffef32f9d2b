//! The per-response schema snapshot.
//!
//! A [`ResultSchema`] tells a row which type rule decodes each column name
//! and each column value. It is built once per response and shared by
//! every row of that response.

use std::collections::HashMap;

use tracing::debug;

use super::keyspace::ColumnFamily;
use crate::db::backend::ResultMetadata;
use crate::types::TypeTag;

/// The row-key pseudo-column of a keyed table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyColumn {
    pub alias: String,
    pub tag: TypeTag,
}

/// Column-name and column-value type rules for one response.
///
/// Lookups never fail: an unmapped column resolves to the default tag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultSchema {
    default_name_type: TypeTag,
    default_value_type: TypeTag,
    name_types: HashMap<Vec<u8>, TypeTag>,
    value_types: HashMap<Vec<u8>, TypeTag>,
    key: Option<KeyColumn>,
}

impl ResultSchema {
    /// Builds a snapshot from the metadata attached to a rows response.
    pub fn from_metadata(metadata: &ResultMetadata) -> Self {
        let parse_all = |types: &HashMap<Vec<u8>, String>| {
            types
                .iter()
                .map(|(name, type_name)| (name.clone(), TypeTag::parse(type_name)))
                .collect()
        };
        Self {
            default_name_type: TypeTag::parse(&metadata.default_name_type),
            default_value_type: TypeTag::parse(&metadata.default_value_type),
            name_types: parse_all(&metadata.name_types),
            value_types: parse_all(&metadata.value_types),
            key: None,
        }
    }

    /// Builds a snapshot from a table definition.
    ///
    /// Column names decode with the table's comparator, except the key
    /// alias which is always text. Values decode with their declared type
    /// or the default validation class.
    pub fn from_column_family(cf: &ColumnFamily) -> Self {
        let mut schema = Self {
            default_name_type: cf.comparator(),
            default_value_type: cf.default_validation(),
            ..Default::default()
        };
        for (name, tag) in cf.columns() {
            schema.value_types.insert(name.into_bytes(), tag);
        }
        if let Some(alias) = cf.key_alias() {
            schema = schema.with_key(alias, cf.key_validation());
        }
        debug!(
            table = cf.name(),
            columns = schema.value_types.len(),
            "built result schema from table definition"
        );
        schema
    }

    pub fn with_default_name_type(mut self, tag: TypeTag) -> Self {
        self.default_name_type = tag;
        self
    }

    pub fn with_default_value_type(mut self, tag: TypeTag) -> Self {
        self.default_value_type = tag;
        self
    }

    pub fn with_name_type(mut self, name: impl Into<Vec<u8>>, tag: TypeTag) -> Self {
        self.name_types.insert(name.into(), tag);
        self
    }

    pub fn with_value_type(mut self, name: impl Into<Vec<u8>>, tag: TypeTag) -> Self {
        self.value_types.insert(name.into(), tag);
        self
    }

    /// Declares the key pseudo-column: its name is text, its value uses `tag`.
    pub fn with_key(mut self, alias: impl Into<String>, tag: TypeTag) -> Self {
        let alias = alias.into();
        self.name_types
            .insert(alias.clone().into_bytes(), TypeTag::Utf8);
        self.value_types
            .insert(alias.clone().into_bytes(), tag.clone());
        self.key = Some(KeyColumn { alias, tag });
        self
    }

    /// Type rule for decoding the name bytes of a column.
    pub fn name_type_of(&self, name: &[u8]) -> &TypeTag {
        self.name_types.get(name).unwrap_or(&self.default_name_type)
    }

    /// Type rule for decoding the value of the column named `name`.
    pub fn value_type_of(&self, name: &[u8]) -> &TypeTag {
        self.value_types
            .get(name)
            .unwrap_or(&self.default_value_type)
    }

    pub fn default_name_type(&self) -> &TypeTag {
        &self.default_name_type
    }

    pub fn default_value_type(&self) -> &TypeTag {
        &self.default_value_type
    }

    pub fn key(&self) -> Option<&KeyColumn> {
        self.key.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::definition::{CfDef, ColumnDef};

    fn users() -> ColumnFamily {
        let mut def = CfDef::new("users");
        def.comparator_type = "org.apache.cassandra.db.marshal.UTF8Type".to_string();
        def.default_validation_class = "UTF8Type".to_string();
        def.key_validation_class = "LongType".to_string();
        def.key_alias = Some("id".to_string());
        def.column_metadata = vec![ColumnDef {
            name: "age".to_string(),
            validation_class: "Int32Type".to_string(),
        }];
        ColumnFamily::new(def)
    }

    #[test]
    fn test_unmapped_column_uses_default() {
        let schema = ResultSchema::from_column_family(&users());
        assert_eq!(schema.value_type_of(b"never_declared"), &TypeTag::Utf8);
        assert_eq!(schema.value_type_of(b"age"), &TypeTag::Int32);
    }

    #[test]
    fn test_key_column_name_is_text_and_value_uses_key_validation() {
        let schema = ResultSchema::from_column_family(&users());
        assert_eq!(schema.name_type_of(b"id"), &TypeTag::Utf8);
        assert_eq!(schema.value_type_of(b"id"), &TypeTag::Int64);
        assert_eq!(
            schema.key(),
            Some(&KeyColumn {
                alias: "id".to_string(),
                tag: TypeTag::Int64
            })
        );
    }

    #[test]
    fn test_from_metadata() {
        let mut metadata = ResultMetadata {
            default_name_type: "AsciiType".to_string(),
            default_value_type: "BytesType".to_string(),
            ..Default::default()
        };
        metadata
            .value_types
            .insert(b"n".to_vec(), "LongType".to_string());
        metadata
            .name_types
            .insert(b"n".to_vec(), "UTF8Type".to_string());

        let schema = ResultSchema::from_metadata(&metadata);
        assert_eq!(schema.value_type_of(b"n"), &TypeTag::Int64);
        assert_eq!(schema.name_type_of(b"n"), &TypeTag::Utf8);
        assert_eq!(schema.name_type_of(b"other"), &TypeTag::Ascii);
        assert_eq!(schema.value_type_of(b"other"), &TypeTag::Bytes);
    }

    #[test]
    fn test_default_is_bytes_everywhere() {
        let schema = ResultSchema::default();
        assert_eq!(schema.name_type_of(b"x"), &TypeTag::Bytes);
        assert_eq!(schema.value_type_of(b"x"), &TypeTag::Bytes);
    }
}
