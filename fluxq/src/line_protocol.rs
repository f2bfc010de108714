//! Building line protocol text for writes.

use crate::Result;
use crate::time::Timestamp;
use crate::value::Value;

/// A single measurement, ready to encode as one line of line protocol.
///
/// Build one with [`Measurement::builder`]. Tags and fields render in
/// insertion order; non-finite float fields are dropped at encode time.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    name: String,
    tags: Vec<(String, String)>,
    fields: Vec<(String, Value)>,
    timestamp: Option<Timestamp>,
}

/// Accumulates tags, fields and an optional timestamp for a [`Measurement`].
#[derive(Debug)]
pub struct MeasurementBuilder {
    name: String,
    tags: Vec<(String, String)>,
    fields: Vec<(String, Value)>,
    timestamp: Option<Timestamp>,
}

impl MeasurementBuilder {
    /// Adds a tag.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }

    /// Adds a field.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Sets the timestamp. Accepts epoch time at second or finer
    /// precision; the scale is inferred from magnitude when encoding.
    pub fn timestamp(mut self, timestamp: impl Into<Timestamp>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Finishes the measurement.
    pub fn build(self) -> Measurement {
        Measurement {
            name: self.name,
            tags: self.tags,
            fields: self.fields,
            timestamp: self.timestamp,
        }
    }
}

impl Measurement {
    /// Starts building a measurement with the given name.
    pub fn builder(name: impl Into<String>) -> MeasurementBuilder {
        MeasurementBuilder {
            name: name.into(),
            tags: Vec::new(),
            fields: Vec::new(),
            timestamp: None,
        }
    }

    /// Encodes this measurement as one line of line protocol.
    ///
    /// The tag set and the timestamp are each omitted when absent, so the
    /// line takes one of the four shapes the protocol allows. Timestamps
    /// are normalized to epoch nanoseconds; a timestamp below second
    /// precision or beyond the nanosecond range is an error.
    pub fn to_line_protocol(&self) -> Result<String> {
        let fields = encode_fields(&self.fields);
        let timestamp = self.timestamp.map(|t| t.to_nanos()).transpose()?;
        let line = match (self.tags.is_empty(), timestamp) {
            (false, Some(ts)) => {
                format!("{},{} {} {}", self.name, encode_tags(&self.tags), fields, ts)
            }
            (true, Some(ts)) => format!("{} {} {}", self.name, fields, ts),
            (false, None) => format!("{},{} {}", self.name, encode_tags(&self.tags), fields),
            (true, None) => format!("{} {}", self.name, fields),
        };
        Ok(line)
    }
}

/// Encodes a batch of measurements, one line each, newline joined.
pub fn to_lines(measurements: &[Measurement]) -> Result<String> {
    let lines = measurements
        .iter()
        .map(Measurement::to_line_protocol)
        .collect::<Result<Vec<_>>>()?;
    Ok(lines.join("\n"))
}

fn encode_tags(tags: &[(String, String)]) -> String {
    tags.iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn encode_fields(fields: &[(String, Value)]) -> String {
    fields
        .iter()
        .filter(|(_, value)| valid_field(value))
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn valid_field(value: &Value) -> bool {
    match value {
        Value::Float(v) => v.is_finite(),
        _ => true,
    }
}
