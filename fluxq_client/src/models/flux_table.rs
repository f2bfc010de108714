//! Decoding annotated CSV query responses.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use snafu::ResultExt;

use crate::{RequestError, ResponseCsvSnafu};

/// One table of a query result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FluxTable {
    /// The records of the table, in response order.
    pub records: Vec<FluxRecord>,
}

/// One row of a query result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FluxRecord {
    /// Column name to decoded cell value.
    pub values: BTreeMap<String, RecordValue>,
}

impl FluxRecord {
    /// The value of the named column, if the record has one.
    pub fn value(&self, column: &str) -> Option<&RecordValue> {
        self.values.get(column)
    }
}

/// A decoded cell of a query response.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// A string, also the fallback for unrecognized datatypes
    String(String),
    /// A 64-bit float, from the `double` datatype
    Double(f64),
    /// A 64-bit signed integer, from the `long` datatype
    Long(i64),
    /// A 64-bit unsigned integer, from the `unsignedLong` datatype
    UnsignedLong(u64),
    /// A boolean
    Bool(bool),
    /// An RFC3339 timestamp, normalized to UTC
    Time(DateTime<Utc>),
    /// An absent value
    Null,
}

/// Decodes the annotated CSV body of a query response into tables.
///
/// The decoder relies on the annotations requested by
/// [`Dialect::annotated`](crate::models::Dialect::annotated): `#datatype`
/// rows drive cell decoding and `#default` rows fill empty cells. A new
/// table starts whenever the `table` column's value changes, and a new
/// annotation section resets the boundary, so equal table ids in
/// consecutive results do not merge.
pub fn parse_tables(body: &str) -> Result<Vec<FluxTable>, RequestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut tables: Vec<FluxTable> = Vec::new();
    let mut datatypes: Vec<String> = Vec::new();
    let mut defaults: Vec<String> = Vec::new();
    let mut columns: Vec<String> = Vec::new();
    let mut table_column = None;
    let mut current_table = None;

    for row in reader.records() {
        let row = row.context(ResponseCsvSnafu)?;
        let first = row.get(0).unwrap_or("");

        if let Some(annotation) = first.strip_prefix('#') {
            // Annotations precede their own header row, so one arriving
            // after a header opens a new section even if the previous
            // section had no data rows.
            if !columns.is_empty() {
                datatypes.clear();
                defaults.clear();
                columns.clear();
                current_table = None;
            }
            match annotation {
                "datatype" => datatypes = row.iter().skip(1).map(Into::into).collect(),
                "default" => defaults = row.iter().skip(1).map(Into::into).collect(),
                _ => {}
            }
            continue;
        }

        if columns.is_empty() {
            columns = row.iter().skip(1).map(Into::into).collect();
            table_column = columns.iter().position(|name| name == "table");
            continue;
        }

        let table_id = table_column
            .and_then(|index| row.get(index + 1))
            .unwrap_or("")
            .to_string();
        if current_table.as_ref() != Some(&table_id) {
            tables.push(FluxTable::default());
            current_table = Some(table_id);
        }

        let mut values = BTreeMap::new();
        for (index, name) in columns.iter().enumerate() {
            let mut cell = row.get(index + 1).unwrap_or("");
            if cell.is_empty() {
                cell = defaults.get(index).map(String::as_str).unwrap_or("");
            }
            let datatype = datatypes.get(index).map(String::as_str).unwrap_or("string");
            values.insert(name.clone(), decode_cell(cell, datatype));
        }
        if let Some(table) = tables.last_mut() {
            table.records.push(FluxRecord { values });
        }
    }

    Ok(tables)
}

fn decode_cell(cell: &str, datatype: &str) -> RecordValue {
    if cell.is_empty() {
        return RecordValue::Null;
    }
    match datatype {
        "double" => cell
            .parse()
            .map(RecordValue::Double)
            .unwrap_or_else(|_| RecordValue::String(cell.into())),
        "long" => cell
            .parse()
            .map(RecordValue::Long)
            .unwrap_or_else(|_| RecordValue::String(cell.into())),
        "unsignedLong" => cell
            .parse()
            .map(RecordValue::UnsignedLong)
            .unwrap_or_else(|_| RecordValue::String(cell.into())),
        "boolean" => match cell {
            "true" => RecordValue::Bool(true),
            "false" => RecordValue::Bool(false),
            _ => RecordValue::String(cell.into()),
        },
        "dateTime:RFC3339" | "dateTime:RFC3339Nano" => DateTime::parse_from_rfc3339(cell)
            .map(|time| RecordValue::Time(time.with_timezone(&Utc)))
            .unwrap_or_else(|_| RecordValue::String(cell.into())),
        _ => RecordValue::String(cell.into()),
    }
}
