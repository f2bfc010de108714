//! Column references and filter expressions.
//!
//! [`col`] names a column of the row under evaluation. Comparisons,
//! membership tests, and arithmetic produce the text fragments consumed by
//! [`Flux::filter`] and the `map`/`reduce` stages.
//!
//! [`Flux::filter`]: crate::query::Flux::filter
//!
//! ```
//! use fluxq::{and, col};
//!
//! let condition = and([
//!     col("_measurement").equals("cpu"),
//!     col("usage").gt(0.5),
//! ]);
//! assert_eq!(condition, r#"(r["_measurement"] == "cpu" and r["usage"] > 0.5)"#);
//! ```

use std::fmt;

use crate::value::Value;

/// A reference to a column of the row being processed, or a computed
/// sub-expression derived from one.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A column reference, rendered as `r["<name>"]`.
    Column(String),
    /// An already-rendered sub-expression, emitted verbatim.
    ///
    /// Arithmetic produces this variant so that its result is not wrapped
    /// in column indexing syntax when it is used again.
    Computed(String),
}

/// References a column of the row being processed.
pub fn col(name: impl Into<String>) -> Expr {
    Expr::Column(name.into())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(name) => write!(f, "r[\"{name}\"]"),
            Self::Computed(text) => f.write_str(text),
        }
    }
}

impl From<Expr> for String {
    fn from(expr: Expr) -> Self {
        expr.to_string()
    }
}

impl Expr {
    fn compare(&self, op: &str, other: impl Into<Operand>) -> String {
        format!("{self} {op} {}", other.into())
    }

    /// Renders `<self> == <other>`.
    pub fn equals(&self, other: impl Into<Operand>) -> String {
        self.compare("==", other)
    }

    /// Renders `<self> != <other>`.
    pub fn not_equals(&self, other: impl Into<Operand>) -> String {
        self.compare("!=", other)
    }

    /// Renders `<self> >= <other>`.
    pub fn gte(&self, other: impl Into<Operand>) -> String {
        self.compare(">=", other)
    }

    /// Renders `<self> > <other>`.
    pub fn gt(&self, other: impl Into<Operand>) -> String {
        self.compare(">", other)
    }

    /// Renders `<self> <= <other>`.
    pub fn lte(&self, other: impl Into<Operand>) -> String {
        self.compare("<=", other)
    }

    /// Renders `<self> < <other>`.
    pub fn lt(&self, other: impl Into<Operand>) -> String {
        self.compare("<", other)
    }

    /// Renders a membership test, `contains(value: <self>, set: <set>)`.
    pub fn is_in(&self, set: impl Into<Value>) -> String {
        format!("contains(value: {self}, set: {})", set.into())
    }

    /// Renders a negated membership test.
    pub fn not_in(&self, set: impl Into<Value>) -> String {
        format!("not contains(value: {self}, set: {})", set.into())
    }

    /// Renders an existence test, `exists <self>`.
    pub fn exists(&self) -> String {
        format!("exists {self}")
    }

    /// Sum of this expression and `other`, as [`add`].
    #[allow(clippy::should_implement_trait)]
    pub fn add(&self, other: impl Into<Operand>) -> Self {
        add(self.clone(), other)
    }

    /// Difference of this expression and `other`, as [`subtract`].
    pub fn subtract(&self, other: impl Into<Operand>) -> Self {
        subtract(self.clone(), other)
    }

    /// Product of this expression and `other`, as [`multiply`].
    pub fn multiply(&self, other: impl Into<Operand>) -> Self {
        multiply(self.clone(), other)
    }

    /// Quotient of this expression and `other`, as [`divide`].
    pub fn divide(&self, other: impl Into<Operand>) -> Self {
        divide(self.clone(), other)
    }
}

/// Either side of a comparison or arithmetic expression: a literal value or
/// another expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A literal, rendered through [`Value`].
    Value(Value),
    /// A column reference or computed expression.
    Expr(Expr),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => write!(f, "{value}"),
            Self::Expr(expr) => write!(f, "{expr}"),
        }
    }
}

impl From<Expr> for Operand {
    fn from(other: Expr) -> Self {
        Self::Expr(other)
    }
}

impl From<Value> for Operand {
    fn from(other: Value) -> Self {
        Self::Value(other)
    }
}

impl From<bool> for Operand {
    fn from(other: bool) -> Self {
        Self::Value(other.into())
    }
}

impl From<f64> for Operand {
    fn from(other: f64) -> Self {
        Self::Value(other.into())
    }
}

impl From<i64> for Operand {
    fn from(other: i64) -> Self {
        Self::Value(other.into())
    }
}

impl From<i32> for Operand {
    fn from(other: i32) -> Self {
        Self::Value(other.into())
    }
}

impl From<&str> for Operand {
    fn from(other: &str) -> Self {
        Self::Value(other.into())
    }
}

impl From<String> for Operand {
    fn from(other: String) -> Self {
        Self::Value(other.into())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Operand {
    fn from(other: Vec<T>) -> Self {
        Self::Value(other.into())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Operand {
    fn from(other: [T; N]) -> Self {
        Self::Value(other.into())
    }
}

/// Renders `(<lhs> + <rhs>)` as a computed expression.
///
/// Addition and subtraction parenthesize their result; multiplication and
/// division do not. Mixing the two can therefore generate text whose
/// precedence differs from the call structure; chain through intermediate
/// expressions where grouping matters.
pub fn add(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Expr {
    Expr::Computed(format!("({} + {})", lhs.into(), rhs.into()))
}

/// Renders `(<lhs> - <rhs>)` as a computed expression. See [`add`] on
/// parenthesization.
pub fn subtract(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Expr {
    Expr::Computed(format!("({} - {})", lhs.into(), rhs.into()))
}

/// Renders `<lhs> * <rhs>`, unparenthesized, as a computed expression. See
/// [`add`] on parenthesization.
pub fn multiply(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Expr {
    Expr::Computed(format!("{} * {}", lhs.into(), rhs.into()))
}

/// Renders `<lhs> / <rhs>`, unparenthesized, as a computed expression. See
/// [`add`] on parenthesization.
pub fn divide(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Expr {
    Expr::Computed(format!("{} / {}", lhs.into(), rhs.into()))
}

/// Joins condition fragments with `and`, wrapped in one pair of
/// parentheses.
pub fn and<I>(conditions: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    join_conditions("and", conditions)
}

/// Joins condition fragments with `or`, wrapped in one pair of parentheses.
pub fn or<I>(conditions: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    join_conditions("or", conditions)
}

fn join_conditions<I>(op: &str, conditions: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut out = String::from("(");
    for (i, condition) in conditions.into_iter().enumerate() {
        if i > 0 {
            out.push(' ');
            out.push_str(op);
            out.push(' ');
        }
        out.push_str(condition.as_ref());
    }
    out.push(')');
    out
}
