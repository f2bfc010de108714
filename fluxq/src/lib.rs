//! # fluxq
//!
//! Build [Flux] queries and line protocol for InfluxDB 2.x without writing
//! the text by hand.
//!
//! [Flux]: https://docs.influxdata.com/flux/v0/
//!
//! A query starts from a bucket and grows stage by stage. Every stage method
//! returns a new pipeline and leaves the receiver untouched, so a partially
//! built query can be shared and extended down independent branches.
//!
//! ```
//! use fluxq::{Flux, col};
//!
//! # fn main() -> Result<(), fluxq::Error> {
//! let query = Flux::from_bucket("telemetry")
//!     .range("-15d")?
//!     .filter(col("_measurement").equals("cpu"))
//!     .keep(["_time", "_value"]);
//!
//! assert_eq!(
//!     query.render(),
//!     "from(bucket: \"telemetry\")\n\
//!      |> range(start: -15d, stop: now())\n\
//!      |> filter(fn: (r) => r[\"_measurement\"] == \"cpu\")\n\
//!      |> keep(columns: [\"_time\",\"_value\"])"
//! );
//! # Ok(())
//! # }
//! ```
//!
//! Writes go through [`Measurement`], which encodes to one line of line
//! protocol:
//!
//! ```
//! use fluxq::Measurement;
//!
//! # fn main() -> Result<(), fluxq::Error> {
//! let point = Measurement::builder("cpu_load_short")
//!     .tag("host", "server01")
//!     .field("value", 0.64)
//!     .timestamp(1625659548)
//!     .build();
//!
//! assert_eq!(
//!     point.to_line_protocol()?,
//!     "cpu_load_short,host=server01 value=0.64 1625659548000000000"
//! );
//! # Ok(())
//! # }
//! ```

#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::explicit_iter_loop,
    clippy::use_self,
    clippy::clone_on_ref_ptr,
    clippy::todo,
    clippy::dbg_macro
)]

pub mod experimental;
pub mod expr;
pub mod line_protocol;
pub mod query;
pub mod time;
pub mod value;

pub use crate::experimental::Experimental;
pub use crate::expr::{Expr, Operand, add, and, col, divide, multiply, or, subtract};
pub use crate::line_protocol::{Measurement, MeasurementBuilder};
pub use crate::query::{ColumnSelector, Flux, GroupMode};
pub use crate::time::{RangeTime, Timestamp, TimestampFormat};
pub use crate::value::{Columns, Value};

/// Errors produced while rendering query or line protocol text.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum Error {
    /// A floating point range bound that cannot be interpreted as an
    /// absolute point in time.
    #[error("invalid time value: {value}")]
    InvalidTime {
        /// The offending epoch-seconds value.
        value: f64,
    },

    /// A line protocol timestamp at or below second-granularity epoch time,
    /// where the magnitude heuristic of [`Timestamp`] gives up rather than
    /// guess a precision.
    #[error("timestamp must be at least second-precision epoch time, got {value}")]
    TimestampPrecision {
        /// The timestamp as supplied by the caller.
        value: Timestamp,
    },

    /// A line protocol timestamp whose nanosecond count does not fit in a
    /// signed 64-bit integer.
    #[error("timestamp {value} overflows the nanosecond range")]
    TimestampOverflow {
        /// The timestamp as supplied by the caller.
        value: Timestamp,
    },
}

/// A specialized `Result` for text generation errors.
pub type Result<T, E = Error> = std::result::Result<T, E>;
