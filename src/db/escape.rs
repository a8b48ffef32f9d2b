//! Quoting and escaping for CQL string literals.

use super::CqlError;
use crate::types::BindValue;

/// Escape a string for use inside a single-quoted CQL literal.
///
/// Embedded quotes are doubled; nothing else is rewritten.
pub fn escape(s: &str) -> String {
    s.replace('\'', "''")
}

/// Reverses [`escape`].
pub fn unescape(s: &str) -> String {
    s.replace("''", "'")
}

/// A fragment of query text ready to be placed at a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum CqlLiteral {
    /// Emitted as-is (numbers, hex blobs)
    Raw(String),
    /// Already escaped text, wrapped in single quotes when emitted
    Quoted(String),
    /// Members joined with commas, no brackets
    List(Vec<CqlLiteral>),
}

/// Renders a literal into embeddable query text.
pub fn quote(literal: &CqlLiteral) -> String {
    match literal {
        CqlLiteral::Raw(text) => text.clone(),
        CqlLiteral::Quoted(text) => format!("'{}'", text),
        CqlLiteral::List(items) => items.iter().map(quote).collect::<Vec<_>>().join(","),
    }
}

/// Quotes a bind value that is already in literal form.
///
/// Text is wrapped as given (callers escape first), numbers pass through
/// and lists are joined. Every other value is `UnescapableObject`.
pub fn quote_value(value: &BindValue) -> Result<String, CqlError> {
    match value {
        BindValue::Text(text) => Ok(format!("'{}'", text)),
        BindValue::Int(n) => Ok(n.to_string()),
        BindValue::Float(f) => Ok(float_literal(*f)),
        BindValue::List(items) => Ok(items
            .iter()
            .map(quote_value)
            .collect::<Result<Vec<_>, _>>()?
            .join(",")),
        other => Err(CqlError::UnescapableObject {
            type_name: other.type_name().to_string(),
        }),
    }
}

/// Numeric literal text for a float; finite values always carry a decimal point.
pub fn float_literal(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        let text = f.to_string();
        if text.contains('.') {
            text
        } else {
            format!("{}.0", text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("hello", "hello")]
    #[case("I'm a string with 'cool' quotes", "I''m a string with ''cool'' quotes")]
    #[case("''", "''''")]
    #[case("", "")]
    fn test_escape(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(escape(input), expected);
        assert_eq!(unescape(&escape(input)), input);
    }

    #[rstest]
    fn test_quote_list_joins_members() {
        let literal = CqlLiteral::List(vec![
            CqlLiteral::Quoted("a".to_string()),
            CqlLiteral::Raw("1".to_string()),
        ]);
        assert_eq!(quote(&literal), "'a',1");
    }

    #[rstest]
    #[case(BindValue::from("x"), "'x'")]
    #[case(BindValue::from(12i64), "12")]
    #[case(BindValue::from(60.368), "60.368")]
    #[case(BindValue::List(vec![BindValue::from("a"), BindValue::from(2i64)]), "'a',2")]
    fn test_quote_value(#[case] value: BindValue, #[case] expected: &str) {
        assert_eq!(quote_value(&value).unwrap(), expected);
    }

    #[rstest]
    #[case(BindValue::Bool(true))]
    #[case(BindValue::Null)]
    #[case(BindValue::List(vec![BindValue::Null]))]
    fn test_quote_value_rejects_other_types(#[case] value: BindValue) {
        assert!(matches!(
            quote_value(&value),
            Err(CqlError::UnescapableObject { .. })
        ));
    }

    #[rstest]
    #[case(1.0, "1.0")]
    #[case(-0.5, "-0.5")]
    #[case(1e21, "1000000000000000000000.0")]
    #[case(f64::NAN, "NaN")]
    #[case(f64::NEG_INFINITY, "-Infinity")]
    fn test_float_literal(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(float_literal(value), expected);
    }
}
