//! Query API

use crate::models::{FluxRecord, FluxTable, QueryRequest, parse_tables};
use crate::{Client, HttpSnafu, RequestError, ReqwestProcessingSnafu, SerializingSnafu};
use fluxq::Flux;
use reqwest::{Method, StatusCode};
use snafu::ResultExt;

impl Client {
    /// Runs a Flux query and decodes the annotated CSV response into
    /// tables of records.
    pub async fn query(&self, query: &Flux) -> Result<Vec<FluxTable>, RequestError> {
        let body = self.query_raw(&query.render()).await?;
        parse_tables(&body)
    }

    /// Runs a Flux query and flattens every record of every returned table
    /// into one sequence. The table grouping is discarded; use
    /// [`query`](Self::query) to keep it.
    pub async fn query_records(&self, query: &Flux) -> Result<Vec<FluxRecord>, RequestError> {
        let tables = self.query(query).await?;
        Ok(tables
            .into_iter()
            .flat_map(|table| table.records)
            .collect())
    }

    /// Submits raw Flux query text and returns the annotated CSV response
    /// undecoded.
    pub async fn query_raw(&self, query: &str) -> Result<String, RequestError> {
        let url = self.url("/api/v2/query")?;
        let request = QueryRequest::new(query);

        let response = self
            .request(Method::POST, url)
            .header("Accept", "application/csv")
            .header("Content-Type", "application/json")
            .query(&[("org", self.org())])
            .body(serde_json::to_string(&request).context(SerializingSnafu)?)
            .send()
            .await
            .context(ReqwestProcessingSnafu)?;

        match response.status() {
            StatusCode::OK => Ok(response.text().await.context(ReqwestProcessingSnafu)?),
            status => {
                let text = response.text().await.context(ReqwestProcessingSnafu)?;
                HttpSnafu { status, text }.fail()?
            }
        }
    }
}
