//! Request and response bodies of the API.

pub mod dialect;
pub mod flux_table;
pub mod query;

pub use self::dialect::{Annotations, Dialect};
pub use self::flux_table::{FluxRecord, FluxTable, RecordValue, parse_tables};
pub use self::query::QueryRequest;
