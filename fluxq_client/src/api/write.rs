//! Write API

use crate::{Client, HttpSnafu, LineProtocolSnafu, RequestError, ReqwestProcessingSnafu};
use fluxq::line_protocol::{self, Measurement};
use reqwest::{Body, Method};
use snafu::ResultExt;
use tracing::warn;

/// The bucket and organization a write was addressed to, as reported to
/// [`WriteCallbacks`] hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteTarget<'a> {
    /// The bucket written to
    pub bucket: &'a str,
    /// The organization written to
    pub org: &'a str,
}

/// Hooks reporting how a write attempt settled.
///
/// At most one of [`on_success`](Self::on_success) and
/// [`on_error`](Self::on_error) fires per attempt. This client performs no
/// retries of its own, so it never fires [`on_retry`](Self::on_retry); the
/// hook exists for callers layering a retry policy on top, which invoke it
/// before each resubmission.
pub trait WriteCallbacks: Send + Sync {
    /// The server accepted the write.
    fn on_success(&self, _target: &WriteTarget<'_>, _body: &str) {}

    /// The write failed with `cause`.
    fn on_error(&self, target: &WriteTarget<'_>, _body: &str, cause: &RequestError) {
        warn!(bucket = target.bucket, org = target.org, %cause, "write failed");
    }

    /// A caller-driven retry is about to resubmit the write.
    fn on_retry(&self, _target: &WriteTarget<'_>, _body: &str, _cause: &RequestError) {}
}

impl Client {
    /// Write line protocol data to the specified bucket.
    pub async fn write_line_protocol(
        &self,
        bucket: &str,
        body: impl Into<Body> + Send,
    ) -> Result<(), RequestError> {
        let body = body.into();
        let url = self.url("/api/v2/write")?;

        let response = self
            .request(Method::POST, url)
            .query(&[("bucket", bucket), ("org", self.org())])
            .body(body)
            .send()
            .await
            .context(ReqwestProcessingSnafu)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.context(ReqwestProcessingSnafu)?;
            HttpSnafu { status, text }.fail()?;
        }

        Ok(())
    }

    /// Encodes the measurements as line protocol and writes them to the
    /// specified bucket in one request.
    pub async fn write(
        &self,
        bucket: &str,
        measurements: &[Measurement],
    ) -> Result<(), RequestError> {
        let body = line_protocol::to_lines(measurements).context(LineProtocolSnafu)?;
        self.write_line_protocol(bucket, body).await
    }

    /// Like [`write`](Self::write), additionally reporting the attempt's
    /// outcome to `callbacks`.
    ///
    /// When the measurements cannot be encoded, `on_error` fires with an
    /// empty body, since no line protocol was produced.
    pub async fn write_with_callbacks(
        &self,
        bucket: &str,
        measurements: &[Measurement],
        callbacks: &dyn WriteCallbacks,
    ) -> Result<(), RequestError> {
        let target = WriteTarget {
            bucket,
            org: self.org(),
        };

        let body = match line_protocol::to_lines(measurements).context(LineProtocolSnafu) {
            Ok(body) => body,
            Err(cause) => {
                callbacks.on_error(&target, "", &cause);
                return Err(cause);
            }
        };

        match self.write_line_protocol(bucket, body.clone()).await {
            Ok(()) => {
                callbacks.on_success(&target, &body);
                Ok(())
            }
            Err(cause) => {
                callbacks.on_error(&target, &body, &cause);
                Err(cause)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct Recorder {
        successes: Mutex<Vec<String>>,
        errors: Mutex<Vec<String>>,
    }

    impl WriteCallbacks for Recorder {
        fn on_success(&self, _target: &WriteTarget<'_>, body: &str) {
            self.successes.lock().unwrap().push(body.to_string());
        }

        fn on_error(&self, _target: &WriteTarget<'_>, body: &str, _cause: &RequestError) {
            self.errors.lock().unwrap().push(body.to_string());
        }
    }

    fn sample_measurements() -> Vec<Measurement> {
        vec![
            Measurement::builder("cpu")
                .tag("host", "server01")
                .field("usage", 0.5)
                .build(),
            Measurement::builder("cpu")
                .tag("host", "server01")
                .tag("region", "us-west")
                .field("usage", 0.87)
                .build(),
        ]
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn writing_measurements() {
        let org = "some-org";
        let bucket = "some-bucket";
        let token = "some-token";

        let mut mock_server = Server::new_async().await;
        let mock = mock_server
            .mock(
                "POST",
                format!("/api/v2/write?bucket={bucket}&org={org}").as_str(),
            )
            .match_header("Authorization", format!("Token {token}").as_str())
            .match_body(
                "\
cpu,host=server01 usage=0.5
cpu,host=server01,region=us-west usage=0.87",
            )
            .create_async()
            .await;

        let client = Client::new(mock_server.url(), org, token).unwrap();

        // If the requests made are incorrect, Mockito returns status 501 and
        // `write` will return an error, which causes the test to fail here
        // instead of when we assert on mock. The error messages that Mockito
        // provides are much clearer for explaining why a test failed than
        // just that the server returned 501, so don't use `?` here.
        let _result = client.write(bucket, &sample_measurements()).await;

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn callbacks_observe_success() {
        let mut mock_server = Server::new_async().await;
        let _mock = mock_server
            .mock("POST", "/api/v2/write?bucket=b&org=o")
            .with_status(204)
            .create_async()
            .await;

        let client = Client::new(mock_server.url(), "o", "token").unwrap();
        let recorder = Recorder::default();

        client
            .write_with_callbacks("b", &sample_measurements(), &recorder)
            .await
            .unwrap();

        let successes = recorder.successes.lock().unwrap();
        assert_eq!(successes.len(), 1);
        assert!(successes[0].starts_with("cpu,host=server01"));
        assert!(recorder.errors.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn callbacks_observe_server_errors() {
        let mut mock_server = Server::new_async().await;
        let _mock = mock_server
            .mock("POST", "/api/v2/write?bucket=b&org=o")
            .with_status(503)
            .with_body("try again later")
            .create_async()
            .await;

        let client = Client::new(mock_server.url(), "o", "token").unwrap();
        let recorder = Recorder::default();

        let result = client
            .write_with_callbacks("b", &sample_measurements(), &recorder)
            .await;

        assert!(matches!(result, Err(RequestError::Http { .. })));
        assert!(recorder.successes.lock().unwrap().is_empty());
        assert_eq!(recorder.errors.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn callbacks_observe_encoding_failures() {
        let client = Client::new("http://127.0.0.1:1", "o", "token").unwrap();
        let recorder = Recorder::default();

        let unencodable = vec![Measurement::builder("m")
            .field("v", 1)
            .timestamp(123)
            .build()];

        let result = client
            .write_with_callbacks("b", &unencodable, &recorder)
            .await;

        assert!(matches!(result, Err(RequestError::LineProtocol { .. })));
        let errors = recorder.errors.lock().unwrap();
        assert_eq!(errors.as_slice(), [String::new()]);
    }
}
