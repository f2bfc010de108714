//! Literal values in generated text.
//!
//! Everything that appears as a literal, whether in a query expression, a
//! bracketed column list, or a line protocol field, renders through
//! [`Value`] so that formatting is consistent everywhere a value shows up.

use std::fmt;

/// A scalar or array literal.
///
/// The `Display` impl is the single serialization routine for literals:
///
/// * booleans render as `true`/`false`
/// * integers render as decimal text
/// * floats render as their shortest round-trippable decimal, keeping a
///   decimal point or exponent (`5.0`, not `5`) so Flux reads them as
///   float literals
/// * strings render double quoted with the contents verbatim
/// * arrays render bracketed and comma joined, `[1,2,3]`
///
/// String contents are not escaped. A value containing a double quote
/// produces malformed text; callers own the contents of their strings.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A `true`/`false` literal.
    Boolean(bool),
    /// A 64-bit floating point number.
    Float(f64),
    /// A 64-bit signed integer.
    Integer(i64),
    /// A string literal.
    String(String),
    /// An array of values.
    Array(Vec<Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "\"{v}\""),
            Self::Array(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(other: bool) -> Self {
        Self::Boolean(other)
    }
}

impl From<f64> for Value {
    fn from(other: f64) -> Self {
        Self::Float(other)
    }
}

impl From<f32> for Value {
    fn from(other: f32) -> Self {
        Self::Float(f64::from(other))
    }
}

impl From<i64> for Value {
    fn from(other: i64) -> Self {
        Self::Integer(other)
    }
}

impl From<i32> for Value {
    fn from(other: i32) -> Self {
        Self::Integer(i64::from(other))
    }
}

impl From<&str> for Value {
    fn from(other: &str) -> Self {
        Self::String(other.into())
    }
}

impl From<String> for Value {
    fn from(other: String) -> Self {
        Self::String(other)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(other: Vec<T>) -> Self {
        Self::Array(other.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(other: [T; N]) -> Self {
        Self::Array(other.into_iter().map(Into::into).collect())
    }
}

/// A list of column names, accepted wherever a stage takes one column or
/// several.
///
/// A single name lifts to a one-element list, so `sort("host", false)` and
/// `sort(["host", "region"], false)` both work.
#[derive(Debug, Clone, PartialEq)]
pub struct Columns(Vec<String>);

impl Columns {
    /// The contained column names.
    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub(crate) fn into_value(self) -> Value {
        Value::Array(self.0.into_iter().map(Value::String).collect())
    }
}

impl From<&str> for Columns {
    fn from(other: &str) -> Self {
        Self(vec![other.into()])
    }
}

impl From<String> for Columns {
    fn from(other: String) -> Self {
        Self(vec![other])
    }
}

impl<S: Into<String>> From<Vec<S>> for Columns {
    fn from(other: Vec<S>) -> Self {
        Self(other.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for Columns {
    fn from(other: [S; N]) -> Self {
        Self(other.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String> + Clone> From<&[S]> for Columns {
    fn from(other: &[S]) -> Self {
        Self(other.iter().cloned().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_are_quoted_exactly_once() {
        let v = Value::from("server01");
        assert_eq!(v.to_string(), r#""server01""#);
    }

    #[test]
    fn string_contents_are_verbatim() {
        // No escaping is performed, even for embedded quotes.
        let v = Value::from(r#"say "hi""#);
        assert_eq!(v.to_string(), r#""say "hi"""#);
    }

    #[test]
    fn booleans_are_literals() {
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from(false).to_string(), "false");
    }

    #[test]
    fn integers_are_decimal() {
        assert_eq!(Value::from(5).to_string(), "5");
        assert_eq!(Value::from(-42_i64).to_string(), "-42");
    }

    #[test]
    fn floats_keep_a_decimal_point() {
        assert_eq!(Value::from(0.64).to_string(), "0.64");
        assert_eq!(Value::from(5.0).to_string(), "5.0");
        assert_eq!(Value::from(0.0).to_string(), "0.0");
    }

    #[test]
    fn arrays_are_bracketed_and_comma_joined() {
        assert_eq!(Value::from(vec![1, 2, 3]).to_string(), "[1,2,3]");
        assert_eq!(Value::from(["a", "b"]).to_string(), r#"["a","b"]"#);
    }

    #[test]
    fn single_name_lifts_to_column_list() {
        let columns = Columns::from("_time");
        assert_eq!(columns.names(), ["_time"]);
        assert_eq!(columns.into_value().to_string(), r#"["_time"]"#);
    }

    #[test]
    fn column_lists_render_through_value() {
        let columns = Columns::from(["a", "b"]);
        assert_eq!(columns.into_value().to_string(), r#"["a","b"]"#);

        let columns = Columns::from(&["a", "b"][..]);
        assert_eq!(columns.into_value().to_string(), r#"["a","b"]"#);
    }
}
