//! HTTP fetch abstraction.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

/// Errors from the underlying HTTP transport.
///
/// Distinct from HTTP error *statuses*, which are data to the resolver: a
/// `404` is a [`FetchResponse`], a refused connection is a [`FetchError`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum FetchError {
	/// The request never produced a response.
	#[error("request failed: {0}")]
	Request(String),
	/// The HTTP client could not be constructed.
	#[error("http client construction failed: {0}")]
	Client(String),
}

impl From<reqwest::Error> for FetchError {
	fn from(value: reqwest::Error) -> Self {
		Self::Request(value.to_string())
	}
}

/// A fetched response: status plus the body parsed as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body. `Null` when the body was empty or not JSON.
	pub body: Value,
}

impl FetchResponse {
	/// Whether the status is a 2xx success.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Something that can issue GET requests and hand back JSON bodies.
///
/// The resolver walks candidate URLs through this seam; tests script it,
/// production uses [`HttpFetcher`].
pub trait Fetcher {
	/// Fetch `url` and return the response status and JSON body.
	fn get(&self, url: &str) -> impl Future<Output = Result<FetchResponse, FetchError>> + Send;
}

/// [`Fetcher`] backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
	client: reqwest::Client,
}

impl HttpFetcher {
	/// Build a fetcher with the given per-request timeout.
	///
	/// # Errors
	///
	/// [`FetchError::Client`] when the underlying client cannot be built.
	pub fn new(timeout: Duration) -> Result<Self, FetchError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|err| FetchError::Client(err.to_string()))?;
		Ok(Self { client })
	}
}

impl Fetcher for HttpFetcher {
	async fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
		let response = self.client.get(url).send().await?;
		let status = response.status().as_u16();
		let text = response.text().await?;
		let body = serde_json::from_str(&text).unwrap_or_else(|err| {
			debug!(status, error = %err, "response body was not JSON");
			Value::Null
		});
		Ok(FetchResponse { status, body })
	}
}
