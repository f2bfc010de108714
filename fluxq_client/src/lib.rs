#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::explicit_iter_loop,
    clippy::use_self,
    clippy::clone_on_ref_ptr,
    clippy::todo,
    clippy::dbg_macro
)]

//! # fluxq_client
//!
//! An async client to a server supporting the InfluxData 2.0 API. Queries
//! are built with the [`fluxq`] crate, submitted as Flux, and decoded from
//! the annotated CSV the server responds with; writes are encoded as line
//! protocol.
//!
//! ## Example
//!
//! ```no_run
//! use fluxq::{Flux, col};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client =
//!         fluxq_client::Client::new("http://localhost:8086", "my-org", "my-token")?;
//!
//!     let query = Flux::from_bucket("telemetry")
//!         .range("-15m")?
//!         .filter(col("_measurement").equals("cpu"));
//!
//!     for record in client.query_records(&query).await? {
//!         println!("{:?}", record.value("_value"));
//!     }
//!     Ok(())
//! }
//! ```

use reqwest::Method;
use secrecy::{ExposeSecret, Secret};
use snafu::{ResultExt, Snafu};
use url::Url;

pub mod api;
pub mod models;

pub use api::write::{WriteCallbacks, WriteTarget};
pub use models::{FluxRecord, FluxTable, RecordValue};

/// Errors that occur while making requests to the server.
#[derive(Debug, Snafu)]
pub enum RequestError {
    /// The base URL the client was constructed with could not be parsed.
    #[snafu(display("base URL error: {}", source))]
    BaseUrl {
        /// The underlying error object from `url`.
        source: url::ParseError,
    },

    /// An API path could not be joined onto the base URL.
    #[snafu(display("request URL error: {}", source))]
    RequestUrl {
        /// The underlying error object from `url`.
        source: url::ParseError,
    },

    /// While making a request to the server, the underlying `reqwest`
    /// library returned an error that was not an HTTP 400 or 500.
    #[snafu(display("Error while processing the HTTP request: {}", source))]
    ReqwestProcessing {
        /// The underlying error object from `reqwest`.
        source: reqwest::Error,
    },

    /// The server returned an HTTP error with code 400 (meaning a client
    /// error) or 500 (meaning a server error).
    #[snafu(display("HTTP request returned an error: {}, `{}`", status, text))]
    Http {
        /// The `StatusCode` returned from the request
        status: reqwest::StatusCode,
        /// Any text data returned from the request
        text: String,
    },

    /// While serializing data as JSON to send in a request, the underlying
    /// `serde_json` library returned an error.
    #[snafu(display("Error while serializing to JSON: {}", source))]
    Serializing {
        /// The underlying error object from `serde_json`.
        source: serde_json::Error,
    },

    /// While parsing the annotated CSV of a query response, the underlying
    /// `csv` library returned an error.
    #[snafu(display("Error while parsing the query response CSV: {}", source))]
    ResponseCsv {
        /// The underlying error object from `csv`.
        source: csv::Error,
    },

    /// A measurement could not be encoded as line protocol.
    #[snafu(display("Error while encoding line protocol: {}", source))]
    LineProtocol {
        /// The underlying error object from `fluxq`.
        source: fluxq::Error,
    },
}

/// Client to a server supporting the InfluxData 2.0 API.
#[derive(Debug, Clone)]
pub struct Client {
    /// The base URL requests are made against
    base_url: Url,
    /// The organization queries and writes are scoped to
    org: String,
    /// The API token sent with each request
    auth_token: Secret<String>,
    /// The underlying HTTP client
    http_client: reqwest::Client,
}

impl Client {
    /// Creates a client for the server at `base_url`, scoping queries and
    /// writes to `org` and authenticating each request with `auth_token`.
    ///
    /// # Example
    ///
    /// ```
    /// # fn main() -> Result<(), fluxq_client::RequestError> {
    /// let client =
    ///     fluxq_client::Client::new("http://localhost:8086", "my-org", "my-token")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(
        base_url: impl AsRef<str>,
        org: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Result<Self, RequestError> {
        let base_url = Url::parse(base_url.as_ref()).context(BaseUrlSnafu)?;
        Ok(Self {
            base_url,
            org: org.into(),
            auth_token: Secret::new(auth_token.into()),
            http_client: reqwest::Client::new(),
        })
    }

    /// The organization this client's queries and writes are scoped to.
    pub fn org(&self) -> &str {
        &self.org
    }

    pub(crate) fn url(&self, path: &str) -> Result<Url, RequestError> {
        self.base_url.join(path).context(RequestUrlSnafu)
    }

    pub(crate) fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        self.http_client.request(method, url).header(
            "Authorization",
            format!("Token {}", self.auth_token.expose_secret()),
        )
    }

    /// Checks connectivity by hitting the server's `/ping` endpoint.
    ///
    /// Any transport error or non-success status reports as `false` instead
    /// of surfacing, so this can poll a server that is still starting up.
    pub async fn ping(&self) -> bool {
        let Ok(url) = self.url("/ping") else {
            return false;
        };
        match self.request(Method::GET, url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
