//! The Flux query pipeline.

use std::fmt;

use crate::Result;
use crate::time::RangeTime;
use crate::value::{Columns, Value};

/// A Flux query under construction.
///
/// A pipeline is an append-only sequence of stage fragments plus the set of
/// imports those stages require. Stage methods return a new pipeline and
/// leave the receiver untouched; a stage that fails to build appends
/// nothing.
///
/// [`render`](Self::render) joins the accumulated text, prefixed by one
/// `import` line per required import.
#[derive(Debug, Clone, PartialEq)]
pub struct Flux {
    components: Vec<String>,
    imports: Vec<String>,
}

/// Grouping modes accepted by [`Flux::group`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupMode {
    /// Group by the listed columns.
    By,
    /// Group by everything except the listed columns.
    Except,
}

impl fmt::Display for GroupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::By => f.write_str("by"),
            Self::Except => f.write_str("except"),
        }
    }
}

/// The argument of [`Flux::keep`]: keep columns by explicit list or by
/// matching a pattern.
///
/// Strings convert to the pattern form; lists and arrays of names convert
/// to the column list form.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSelector {
    /// Keep the named columns.
    Columns(Columns),
    /// Keep the columns matching a regex pattern, emitted verbatim.
    Pattern(String),
}

impl From<&str> for ColumnSelector {
    fn from(other: &str) -> Self {
        Self::Pattern(other.into())
    }
}

impl From<String> for ColumnSelector {
    fn from(other: String) -> Self {
        Self::Pattern(other)
    }
}

impl From<Columns> for ColumnSelector {
    fn from(other: Columns) -> Self {
        Self::Columns(other)
    }
}

impl<S: Into<String>> From<Vec<S>> for ColumnSelector {
    fn from(other: Vec<S>) -> Self {
        Self::Columns(other.into())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for ColumnSelector {
    fn from(other: [S; N]) -> Self {
        Self::Columns(other.into())
    }
}

impl Flux {
    /// Starts a pipeline reading from the named bucket.
    pub fn from_bucket(bucket: &str) -> Self {
        Self {
            components: vec![format!("from(bucket: \"{bucket}\")")],
            imports: Vec::new(),
        }
    }

    fn with_component(&self, component: String) -> Self {
        let mut next = self.clone();
        next.components.push(component);
        next
    }

    pub(crate) fn with_import(&self, component: String, import: &str) -> Self {
        let mut next = self.with_component(component);
        if !next.imports.iter().any(|i| i == import) {
            next.imports.push(import.to_string());
        }
        next
    }

    /// Appends `|> range(start: <start>, stop: now())`.
    ///
    /// `start` may be a relative expression (`"-15d"`), epoch seconds, or a
    /// calendar time; see [`RangeTime`].
    pub fn range(&self, start: impl Into<RangeTime>) -> Result<Self> {
        let start = start.into().to_flux_literal()?;
        Ok(self.with_component(format!("|> range(start: {start}, stop: now())")))
    }

    /// Appends `|> range(start: <start>, stop: <stop>)`.
    pub fn range_between(
        &self,
        start: impl Into<RangeTime>,
        stop: impl Into<RangeTime>,
    ) -> Result<Self> {
        let start = start.into().to_flux_literal()?;
        let stop = stop.into().to_flux_literal()?;
        Ok(self.with_component(format!("|> range(start: {start}, stop: {stop})")))
    }

    /// Appends `|> filter(fn: (r) => <condition>)`.
    ///
    /// Conditions come from [`col`](crate::expr::col) comparisons combined
    /// with [`and`](crate::expr::and) and [`or`](crate::expr::or).
    pub fn filter(&self, condition: impl Into<String>) -> Self {
        self.with_component(format!("|> filter(fn: (r) => {})", condition.into()))
    }

    /// Appends `|> pivot(rowKey: ..., columnKey: ..., valueColumn: ...)`.
    ///
    /// Absent arguments default to `_time`, `_field` and `_value`.
    pub fn pivot(
        &self,
        rows: Option<Columns>,
        columns: Option<Columns>,
        value: Option<&str>,
    ) -> Self {
        let rows = rows.unwrap_or_else(|| "_time".into()).into_value();
        let columns = columns.unwrap_or_else(|| "_field".into()).into_value();
        let value = value.unwrap_or("_value");
        self.with_component(format!(
            "|> pivot(rowKey: {rows}, columnKey: {columns}, valueColumn: \"{value}\")"
        ))
    }

    /// Appends `|> group(...)` with the present arguments.
    pub fn group(&self, columns: Option<Columns>, mode: Option<GroupMode>) -> Self {
        let mut args = Vec::new();
        if let Some(columns) = columns {
            args.push(format!("columns: {}", columns.into_value()));
        }
        if let Some(mode) = mode {
            args.push(format!("mode: \"{mode}\""));
        }
        self.with_component(format!("|> group({})", args.join(", ")))
    }

    /// Appends `|> sort(columns: [...], desc: <desc>)`.
    pub fn sort(&self, columns: impl Into<Columns>, desc: bool) -> Self {
        self.with_component(format!(
            "|> sort(columns: {}, desc: {desc})",
            columns.into().into_value()
        ))
    }

    /// Appends `|> limit(n: <n>, offset: <offset>)`, defaulting to the
    /// first ten records.
    pub fn limit(&self, n: Option<u64>, offset: Option<u64>) -> Self {
        let n = n.unwrap_or(10);
        let offset = offset.unwrap_or(0);
        self.with_component(format!("|> limit(n: {n}, offset: {offset})"))
    }

    /// Appends `|> last()`, optionally selecting the column to report.
    pub fn last(&self, column: Option<&str>) -> Self {
        match column {
            Some(column) => self.with_component(format!("|> last(column: \"{column}\")")),
            None => self.with_component("|> last()".to_string()),
        }
    }

    /// Appends `|> drop(columns: [...])`.
    pub fn drop(&self, columns: impl Into<Columns>) -> Self {
        self.with_component(format!("|> drop(columns: {})", columns.into().into_value()))
    }

    /// Appends `|> keep(...)`, keeping columns by explicit list or by
    /// pattern; see [`ColumnSelector`].
    pub fn keep(&self, selector: impl Into<ColumnSelector>) -> Self {
        match selector.into() {
            ColumnSelector::Columns(columns) => {
                self.with_component(format!("|> keep(columns: {})", columns.into_value()))
            }
            ColumnSelector::Pattern(pattern) => {
                self.with_component(format!("|> keep(fn: (column) => column =~ {pattern})"))
            }
        }
    }

    /// Appends `|> mean()`, optionally over the named column.
    pub fn mean(&self, column: Option<&str>) -> Self {
        self.with_component(aggregate("mean", column))
    }

    /// Appends `|> stddev()`, optionally over the named column.
    pub fn std(&self, column: Option<&str>) -> Self {
        self.with_component(aggregate("stddev", column))
    }

    /// Appends `|> count()`, optionally over the named column.
    pub fn count(&self, column: Option<&str>) -> Self {
        self.with_component(aggregate("count", column))
    }

    /// Appends `|> fill(...)`, replacing absent values in `column`
    /// (default `_value`) with `value`, or with the previous row's value
    /// when `use_previous` is set.
    ///
    /// Flux requires the fill value to match the column's type; `0.0`
    /// renders as the float literal `0.0` and `0` as the integer `0`.
    pub fn fill(
        &self,
        value: impl Into<Value>,
        column: Option<&str>,
        use_previous: Option<bool>,
    ) -> Self {
        let mut args = Vec::new();
        if let Some(column) = column {
            args.push(format!("column: \"{column}\""));
        }
        args.push(format!("value: {}", value.into()));
        if let Some(use_previous) = use_previous {
            args.push(format!("usePrevious: {use_previous}"));
        }
        self.with_component(format!("|> fill({})", args.join(", ")))
    }

    /// Appends `|> map(fn: (r) => ...)` assigning each `(column,
    /// expression)` pair.
    ///
    /// With `keep_original` the assignments extend the input row (`{ r with
    /// ... }`); without it the output rows carry only the assigned columns.
    pub fn map<I, K, V>(&self, operations: I, keep_original: bool) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let ops = join_pairs(operations);
        let component = if keep_original {
            format!("|> map(fn: (r) => ({{ r with {ops} }}))")
        } else {
            format!("|> map(fn: (r) => ({{{ops}}}))")
        };
        self.with_component(component)
    }

    /// Appends `|> reduce(fn: (r, accumulator) => ..., identity: ...)`.
    ///
    /// `reducers` assigns each output column from the row and the
    /// accumulator; `identity` gives the accumulator's starting record.
    /// Identity values are raw Flux text so callers control their numeric
    /// type (`0.0` stays a float).
    pub fn reduce<I, J, K, V, K2, V2>(&self, reducers: I, identity: J) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
        J: IntoIterator<Item = (K2, V2)>,
        K2: Into<String>,
        V2: Into<String>,
    {
        let reducers = join_pairs(reducers);
        let identity = join_pairs(identity);
        self.with_component(format!(
            "|> reduce(fn: (r, accumulator) => ({{{reducers}}}), identity: {{{identity}}})"
        ))
    }

    /// Appends `|> aggregateWindow(...)` with the present arguments.
    ///
    /// `every` is a raw Flux duration (`1m`) and `func` a raw function name
    /// (`mean`); neither is quoted.
    pub fn aggregate_window(
        &self,
        every: Option<&str>,
        func: Option<&str>,
        create_empty: Option<bool>,
    ) -> Self {
        let mut args = Vec::new();
        if let Some(every) = every {
            args.push(format!("every: {every}"));
        }
        if let Some(func) = func {
            args.push(format!("fn: {func}"));
        }
        if let Some(create_empty) = create_empty {
            args.push(format!("createEmpty: {create_empty}"));
        }
        self.with_component(format!("|> aggregateWindow({})", args.join(", ")))
    }

    /// Renders the accumulated query: one `import "<name>"` line per
    /// required import in first-use order, then the stages, newline joined.
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.imports.len() + self.components.len());
        for import in &self.imports {
            lines.push(format!("import \"{import}\""));
        }
        lines.extend(self.components.iter().cloned());
        lines.join("\n")
    }
}

impl fmt::Display for Flux {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn aggregate(func: &str, column: Option<&str>) -> String {
    match column {
        Some(column) => format!("|> {func}(column: \"{column}\")"),
        None => format!("|> {func}()"),
    }
}

fn join_pairs<I, K, V>(pairs: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(name, expression)| format!("{}: {}", name.into(), expression.into()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{col, multiply};

    #[test]
    fn starts_from_a_bucket() {
        let query = Flux::from_bucket("telemetry");
        assert_eq!(query.render(), r#"from(bucket: "telemetry")"#);
    }

    #[test]
    fn relative_range_defaults_stop_to_now() {
        let query = Flux::from_bucket("b").range("-15d").unwrap();
        assert_eq!(
            query.render(),
            "from(bucket: \"b\")\n|> range(start: -15d, stop: now())"
        );
    }

    #[test]
    fn epoch_second_range_passes_through() {
        let query = Flux::from_bucket("b")
            .range_between(1625659548, 1625745948)
            .unwrap();
        assert_eq!(
            query.render(),
            "from(bucket: \"b\")\n|> range(start: 1625659548, stop: 1625745948)"
        );
    }

    #[test]
    fn failed_range_leaves_receiver_unchanged() {
        let query = Flux::from_bucket("b");
        assert!(query.range(f64::NAN).is_err());
        assert_eq!(query.render(), r#"from(bucket: "b")"#);
    }

    #[test]
    fn filter_wraps_the_condition() {
        let query = Flux::from_bucket("b").filter(col("x").equals(5));
        assert_eq!(
            query.render(),
            "from(bucket: \"b\")\n|> filter(fn: (r) => r[\"x\"] == 5)"
        );
    }

    #[test]
    fn pivot_defaults() {
        let query = Flux::from_bucket("b").pivot(None, None, None);
        assert_eq!(
            last_component(&query),
            r#"|> pivot(rowKey: ["_time"], columnKey: ["_field"], valueColumn: "_value")"#
        );
    }

    #[test]
    fn pivot_with_explicit_keys() {
        let query = Flux::from_bucket("b").pivot(
            Some(["_time", "host"].into()),
            Some("_field".into()),
            Some("usage"),
        );
        assert_eq!(
            last_component(&query),
            r#"|> pivot(rowKey: ["_time","host"], columnKey: ["_field"], valueColumn: "usage")"#
        );
    }

    #[test]
    fn group_renders_present_arguments() {
        let query = Flux::from_bucket("b");
        assert_eq!(last_component(&query.group(None, None)), "|> group()");
        assert_eq!(
            last_component(&query.group(Some("host".into()), None)),
            r#"|> group(columns: ["host"])"#
        );
        assert_eq!(
            last_component(&query.group(Some(["host", "region"].into()), Some(GroupMode::Except))),
            r#"|> group(columns: ["host","region"], mode: "except")"#
        );
        assert_eq!(
            last_component(&query.group(None, Some(GroupMode::By))),
            r#"|> group(mode: "by")"#
        );
    }

    #[test]
    fn sort_renders_desc_as_bare_boolean() {
        let query = Flux::from_bucket("b").sort("_time", false);
        assert_eq!(
            last_component(&query),
            r#"|> sort(columns: ["_time"], desc: false)"#
        );
    }

    #[test]
    fn limit_defaults_to_first_ten() {
        let query = Flux::from_bucket("b");
        assert_eq!(
            last_component(&query.limit(None, None)),
            "|> limit(n: 10, offset: 0)"
        );
        assert_eq!(
            last_component(&query.limit(Some(5), Some(2))),
            "|> limit(n: 5, offset: 2)"
        );
    }

    #[test]
    fn last_with_and_without_column() {
        let query = Flux::from_bucket("b");
        assert_eq!(last_component(&query.last(None)), "|> last()");
        assert_eq!(
            last_component(&query.last(Some("usage"))),
            r#"|> last(column: "usage")"#
        );
    }

    #[test]
    fn drop_renders_column_list() {
        let query = Flux::from_bucket("b").drop(["_start", "_stop"]);
        assert_eq!(
            last_component(&query),
            r#"|> drop(columns: ["_start","_stop"])"#
        );
    }

    #[test]
    fn keep_with_column_list() {
        let query = Flux::from_bucket("b").keep(["a", "b"]);
        assert_eq!(last_component(&query), r#"|> keep(columns: ["a","b"])"#);
    }

    #[test]
    fn keep_with_pattern() {
        let query = Flux::from_bucket("b").keep("^x");
        assert_eq!(
            last_component(&query),
            "|> keep(fn: (column) => column =~ ^x)"
        );
    }

    #[test]
    fn aggregates_with_optional_column() {
        let query = Flux::from_bucket("b");
        assert_eq!(last_component(&query.mean(None)), "|> mean()");
        assert_eq!(
            last_component(&query.std(Some("_value"))),
            r#"|> stddev(column: "_value")"#
        );
        assert_eq!(last_component(&query.count(None)), "|> count()");
    }

    #[test]
    fn fill_orders_arguments() {
        let query = Flux::from_bucket("b");
        assert_eq!(
            last_component(&query.fill(0.0, None, None)),
            "|> fill(value: 0.0)"
        );
        assert_eq!(
            last_component(&query.fill(0, None, None)),
            "|> fill(value: 0)"
        );
        assert_eq!(
            last_component(&query.fill("n/a", Some("status"), Some(false))),
            r#"|> fill(column: "status", value: "n/a", usePrevious: false)"#
        );
    }

    #[test]
    fn map_extends_the_row_by_default() {
        let query =
            Flux::from_bucket("b").map([("doubled", multiply(col("_value"), 2))], true);
        assert_eq!(
            last_component(&query),
            r#"|> map(fn: (r) => ({ r with doubled: r["_value"] * 2 }))"#
        );
    }

    #[test]
    fn map_can_replace_the_row() {
        let query = Flux::from_bucket("b").map([("v", "r._value")], false);
        assert_eq!(last_component(&query), "|> map(fn: (r) => ({v: r._value}))");
    }

    #[test]
    fn reduce_renders_reducers_and_identity() {
        let query = Flux::from_bucket("b").reduce(
            [("sum", "r._value + accumulator.sum")],
            [("sum", "0.0")],
        );
        assert_eq!(
            last_component(&query),
            "|> reduce(fn: (r, accumulator) => ({sum: r._value + accumulator.sum}), identity: {sum: 0.0})"
        );
    }

    #[test]
    fn aggregate_window_renders_present_arguments() {
        let query = Flux::from_bucket("b");
        assert_eq!(
            last_component(&query.aggregate_window(Some("1m"), Some("mean"), Some(false))),
            "|> aggregateWindow(every: 1m, fn: mean, createEmpty: false)"
        );
        assert_eq!(
            last_component(&query.aggregate_window(Some("5s"), None, None)),
            "|> aggregateWindow(every: 5s)"
        );
    }

    #[test]
    fn chaining_never_mutates_the_receiver() {
        let p1 = Flux::from_bucket("b");
        let p2 = p1.range("-15d").unwrap();
        assert_eq!(p1.render(), r#"from(bucket: "b")"#);
        assert_ne!(p1, p2);
    }

    #[test]
    fn display_matches_render() {
        let query = Flux::from_bucket("b").limit(None, None);
        assert_eq!(query.to_string(), query.render());
    }

    fn last_component(query: &Flux) -> &str {
        query.components.last().map(String::as_str).unwrap_or("")
    }
}
