//! Statement templating.
//!
//! A template is query text with `?` placeholders. Rendering replaces each
//! placeholder, left to right in one pass, with the literal form of the
//! matching bind value. The literal form depends only on the bind value's
//! variant.

use std::sync::LazyLock;

use regex::Regex;

use super::CqlError;
use super::escape::{CqlLiteral, escape, float_literal, quote};
use crate::codec::timeuuid;
use crate::config::{Dialect, TimeLiteral};
use crate::types::BindValue;
use crate::utils::is_binary_data;

const PLACEHOLDER: char = '?';

static USE_KEYSPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*use\s+'?(\w+)").unwrap());

static DROP_KEYSPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*drop\s+keyspace\s+'?(\w+)").unwrap());

static SELECT_FROM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^\s*select.*?\sfrom\s+'?(\w+)").unwrap());

/// Renders templates under one [`Dialect`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Templater {
    time_literal: TimeLiteral,
}

impl Templater {
    pub fn new(dialect: &Dialect) -> Self {
        Self {
            time_literal: dialect.time_literal,
        }
    }

    pub fn time_literal(&self) -> TimeLiteral {
        self.time_literal
    }

    /// Substitutes `binds` into `template`.
    ///
    /// # Errors
    ///
    /// - `InvalidBindVariable` if the placeholder count differs from `binds.len()`
    /// - `UnescapableObject` if a bind value has no literal form
    pub fn render(&self, template: &str, binds: &[BindValue]) -> Result<String, CqlError> {
        let expected = template.matches(PLACEHOLDER).count();
        if expected != binds.len() {
            return Err(CqlError::InvalidBindVariable {
                expected,
                actual: binds.len(),
            });
        }
        if expected == 0 {
            return Ok(template.to_string());
        }

        let mut binds = binds.iter().peekable();
        let mut rendered = String::with_capacity(template.len() + 16 * expected);
        for c in template.chars() {
            match binds.next_if(|_| c == PLACEHOLDER) {
                Some(value) => rendered.push_str(&self.serialize(value)?),
                None => rendered.push(c),
            }
        }
        Ok(rendered)
    }

    /// The embeddable literal text for one bind value.
    pub fn serialize(&self, value: &BindValue) -> Result<String, CqlError> {
        Ok(quote(&self.cast_to_cql(value)?))
    }

    /// Converts a bind value into literal form without rendering it.
    pub fn cast_to_cql(&self, value: &BindValue) -> Result<CqlLiteral, CqlError> {
        let literal = match value {
            BindValue::Int(n) => CqlLiteral::Raw(n.to_string()),
            BindValue::Float(f) => CqlLiteral::Raw(float_literal(*f)),
            BindValue::Text(text) => CqlLiteral::Quoted(escape(text)),
            BindValue::Bool(b) => CqlLiteral::Quoted(b.to_string()),
            BindValue::Blob(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) if !is_binary_data(bytes) => CqlLiteral::Quoted(escape(text)),
                _ => CqlLiteral::Raw(hex::encode(bytes)),
            },
            BindValue::Timestamp(ts) => match self.time_literal {
                TimeLiteral::EpochMillis => CqlLiteral::Raw(ts.timestamp_millis().to_string()),
                TimeLiteral::TimeUuid => match timeuuid::from_timestamp(ts) {
                    Some(uuid) => CqlLiteral::Quoted(uuid.hyphenated().to_string()),
                    None => {
                        return Err(CqlError::TimestampOutOfRange {
                            value: ts.to_rfc3339(),
                        });
                    }
                },
            },
            BindValue::Date(date) => CqlLiteral::Quoted(date.format("%Y-%m-%d").to_string()),
            BindValue::Uuid(uuid) => CqlLiteral::Quoted(uuid.hyphenated().to_string()),
            BindValue::List(items) => CqlLiteral::List(
                items
                    .iter()
                    .map(|item| self.cast_to_cql(item))
                    .collect::<Result<_, _>>()?,
            ),
            BindValue::Null => {
                return Err(CqlError::UnescapableObject {
                    type_name: value.type_name().to_string(),
                });
            }
        };
        Ok(literal)
    }
}

/// Renders with the default dialect.
pub fn render(template: &str, binds: &[BindValue]) -> Result<String, CqlError> {
    Templater::default().render(template, binds)
}

/// Serializes one value with the default dialect.
pub fn serialize(value: &BindValue) -> Result<String, CqlError> {
    Templater::default().serialize(value)
}

/// How executing a statement changes the session keyspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyspaceChange {
    Use(String),
    Drop(String),
}

/// Query text plus the few things the session reads from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    text: String,
}

impl Statement {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn placeholder_count(&self) -> usize {
        self.text.matches(PLACEHOLDER).count()
    }

    /// The keyspace switch or drop this statement performs, if any.
    pub fn keyspace_change(&self) -> Option<KeyspaceChange> {
        if let Some(caps) = USE_KEYSPACE.captures(&self.text) {
            return Some(KeyspaceChange::Use(caps[1].to_string()));
        }
        DROP_KEYSPACE
            .captures(&self.text)
            .map(|caps| KeyspaceChange::Drop(caps[1].to_string()))
    }

    /// The table a `select` reads from.
    pub fn column_family(&self) -> Option<&str> {
        SELECT_FROM
            .captures(&self.text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}
