//! Timestamp handling for query ranges and line protocol.

use std::fmt;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

use crate::{Error, Result};

/// A `range` bound.
///
/// Strings pass through verbatim, so both relative (`-15d`) and absolute
/// (`2021-07-07T12:00:00Z`) Flux expressions work. Integers pass through
/// verbatim as epoch seconds, which Flux accepts directly. Floats and
/// calendar times render as RFC3339 text.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeTime {
    /// A Flux time expression, passed through verbatim.
    Literal(String),
    /// Epoch seconds, passed through verbatim.
    Epoch(i64),
    /// Fractional epoch seconds, rendered as an absolute RFC3339 time.
    EpochFloat(f64),
    /// A calendar time, rendered as an absolute RFC3339 time.
    DateTime(DateTime<Utc>),
}

impl From<&str> for RangeTime {
    fn from(other: &str) -> Self {
        Self::Literal(other.into())
    }
}

impl From<String> for RangeTime {
    fn from(other: String) -> Self {
        Self::Literal(other)
    }
}

impl From<i64> for RangeTime {
    fn from(other: i64) -> Self {
        Self::Epoch(other)
    }
}

impl From<i32> for RangeTime {
    fn from(other: i32) -> Self {
        Self::Epoch(i64::from(other))
    }
}

impl From<f64> for RangeTime {
    fn from(other: f64) -> Self {
        Self::EpochFloat(other)
    }
}

impl From<DateTime<Utc>> for RangeTime {
    fn from(other: DateTime<Utc>) -> Self {
        Self::DateTime(other)
    }
}

impl RangeTime {
    /// Renders this bound as Flux text.
    ///
    /// Fails with [`Error::InvalidTime`] when a float bound is not a finite,
    /// representable point in time.
    pub fn to_flux_literal(&self) -> Result<String> {
        match self {
            Self::Literal(text) => Ok(text.clone()),
            Self::Epoch(secs) => Ok(secs.to_string()),
            Self::EpochFloat(secs) => {
                let dt = datetime_from_epoch(*secs)?;
                Ok(format_rfc3339(dt, TimestampFormat::Long))
            }
            Self::DateTime(dt) => Ok(format_rfc3339(*dt, TimestampFormat::Long)),
        }
    }
}

fn datetime_from_epoch(secs: f64) -> Result<DateTime<Utc>> {
    let nanos = secs * 1e9;
    if !nanos.is_finite() || nanos < i64::MIN as f64 || nanos > i64::MAX as f64 {
        return Err(Error::InvalidTime { value: secs });
    }
    Ok(Utc.timestamp_nanos(nanos.round() as i64))
}

/// Rendering modes for RFC3339 text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampFormat {
    /// Calendar date only, `2021-07-07`.
    Date,
    /// Second precision, `2021-07-07T12:05:48Z`.
    Short,
    /// Millisecond precision, `2021-07-07T12:05:48.123Z`. The default used
    /// for range bounds.
    #[default]
    Long,
}

/// Renders a calendar time in the given [`TimestampFormat`].
pub fn format_rfc3339(dt: DateTime<Utc>, format: TimestampFormat) -> String {
    match format {
        TimestampFormat::Date => dt.format("%Y-%m-%d").to_string(),
        TimestampFormat::Short => dt.to_rfc3339_opts(SecondsFormat::Secs, true),
        TimestampFormat::Long => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// A line protocol timestamp of unspecified precision.
///
/// Precision is inferred from magnitude alone: epoch values above 1e18 are
/// nanoseconds, above 1e15 microseconds, above 1e12 milliseconds, above 1e9
/// seconds. Values at or below 1e9 are rejected rather than guessed, so
/// second-precision epoch times from early 2001 and before do not survive
/// this codec.
///
/// Float inputs convert in `f64` arithmetic; nanosecond precision can be
/// lost to the 52-bit mantissa.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timestamp {
    /// An integer epoch time.
    Int(i64),
    /// A floating point epoch time.
    Float(f64),
}

const NANOS_THRESHOLD: i64 = 1_000_000_000_000_000_000;
const MICROS_THRESHOLD: i64 = 1_000_000_000_000_000;
const MILLIS_THRESHOLD: i64 = 1_000_000_000_000;
const SECONDS_THRESHOLD: i64 = 1_000_000_000;

impl Timestamp {
    /// Converts to integer nanoseconds since the epoch.
    pub fn to_nanos(self) -> Result<i64> {
        let multiplier = self
            .multiplier()
            .ok_or(Error::TimestampPrecision { value: self })?;
        match self {
            Self::Int(v) => v
                .checked_mul(multiplier)
                .ok_or(Error::TimestampOverflow { value: self }),
            Self::Float(v) => {
                let nanos = (v * multiplier as f64).round();
                if nanos < i64::MIN as f64 || nanos > i64::MAX as f64 {
                    return Err(Error::TimestampOverflow { value: self });
                }
                Ok(nanos as i64)
            }
        }
    }

    fn multiplier(self) -> Option<i64> {
        match self {
            Self::Int(v) => {
                if v > NANOS_THRESHOLD {
                    Some(1)
                } else if v > MICROS_THRESHOLD {
                    Some(1_000)
                } else if v > MILLIS_THRESHOLD {
                    Some(1_000_000)
                } else if v > SECONDS_THRESHOLD {
                    Some(1_000_000_000)
                } else {
                    None
                }
            }
            Self::Float(v) => {
                if v > 1e18 {
                    Some(1)
                } else if v > 1e15 {
                    Some(1_000)
                } else if v > 1e12 {
                    Some(1_000_000)
                } else if v > 1e9 {
                    Some(1_000_000_000)
                } else {
                    None
                }
            }
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for Timestamp {
    fn from(other: i64) -> Self {
        Self::Int(other)
    }
}

impl From<i32> for Timestamp {
    fn from(other: i32) -> Self {
        Self::Int(i64::from(other))
    }
}

impl From<f64> for Timestamp {
    fn from(other: f64) -> Self {
        Self::Float(other)
    }
}
