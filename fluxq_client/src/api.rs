//! The operations the client can perform, grouped by API family.

pub mod query;
pub mod write;
