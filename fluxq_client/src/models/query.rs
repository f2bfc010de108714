//! Query request body

use crate::models::dialect::Dialect;
use serde::Serialize;

/// The JSON body of a query request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRequest {
    /// Flux query script to execute
    pub query: String,
    /// The type of query. Must be "flux".
    #[serde(rename = "type")]
    pub query_type: String,
    /// The CSV output options the response should honor
    pub dialect: Dialect,
}

impl QueryRequest {
    /// Wraps rendered Flux query text with the dialect the response
    /// decoder expects.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            query_type: "flux".to_string(),
            dialect: Dialect::annotated(),
        }
    }
}
