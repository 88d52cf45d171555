//! Transport primitives for marketplace calls.
//!
//! The module exposes [`HttpTransport`] alongside the crate-owned [`HttpRequest`] and
//! [`HttpResponse`] values so the token cache and the search client never depend on a
//! concrete HTTP stack. Implementations fill [`ResponseMetadata`] once a status or
//! retry hint is known so error mapping can report it consistently.

// crates.io
#[cfg(feature = "reqwest")] use reqwest::header::{HeaderMap, RETRY_AFTER};
#[cfg(feature = "reqwest")] use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing marketplace requests.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can be shared by
/// the token cache and the search client behind an `Arc`. A non-success status is not a
/// transport failure: implementations return it as an [`HttpResponse`] and leave the
/// classification to the caller.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and resolves with the raw response.
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_>;
}

/// HTTP verbs used by the marketplace APIs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
	/// `GET`.
	Get,
	/// `POST`.
	Post,
}
impl HttpMethod {
	/// Returns the canonical verb string.
	pub const fn as_str(self) -> &'static str {
		match self {
			HttpMethod::Get => "GET",
			HttpMethod::Post => "POST",
		}
	}
}

/// Transport-agnostic outbound request.
#[derive(Clone, Debug)]
pub struct HttpRequest {
	/// Request verb.
	pub method: HttpMethod,
	/// Fully resolved URL including query parameters.
	pub url: Url,
	/// Header name/value pairs in insertion order.
	pub headers: Vec<(&'static str, String)>,
	/// Encoded request body, if any.
	pub body: Option<Vec<u8>>,
	/// Upper bound on the time the transport may spend on this request.
	pub timeout: Option<StdDuration>,
}
impl HttpRequest {
	/// Creates a bodiless request.
	pub fn new(method: HttpMethod, url: Url) -> Self {
		Self { method, url, headers: Vec::new(), body: None, timeout: None }
	}

	/// Creates a `GET` request.
	pub fn get(url: Url) -> Self {
		Self::new(HttpMethod::Get, url)
	}

	/// Creates a `POST` request.
	pub fn post(url: Url) -> Self {
		Self::new(HttpMethod::Post, url)
	}

	/// Appends a header.
	pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
		self.headers.push((name, value.into()));

		self
	}

	/// Appends an `Authorization: Bearer` header.
	pub fn bearer(self, token: &str) -> Self {
		self.header("authorization", format!("Bearer {token}"))
	}

	/// Sets a form-encoded body.
	pub fn form<'a, I>(self, pairs: I) -> Self
	where
		I: IntoIterator<Item = (&'a str, &'a str)>,
	{
		let encoded = url::form_urlencoded::Serializer::new(String::new())
			.extend_pairs(pairs)
			.finish();

		self.body("application/x-www-form-urlencoded", encoded.into_bytes())
	}

	/// Sets a JSON body.
	pub fn json<T>(self, payload: &T) -> Result<Self, serde_json::Error>
	where
		T: ?Sized + Serialize,
	{
		let encoded = serde_json::to_vec(payload)?;

		Ok(self.body("application/json", encoded))
	}

	/// Sets a raw body and its content type.
	pub fn body(mut self, content_type: &'static str, bytes: Vec<u8>) -> Self {
		self.headers.retain(|(name, _)| !name.eq_ignore_ascii_case("content-type"));
		self.headers.push(("content-type", content_type.to_owned()));
		self.body = Some(bytes);

		self
	}

	/// Bounds the time the transport may spend on this request.
	pub fn with_timeout(mut self, timeout: Option<StdDuration>) -> Self {
		self.timeout = timeout;

		self
	}

	/// Returns the first header value matching `name` (case-insensitive).
	pub fn header_value(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}

/// Captures metadata from an HTTP response for downstream error mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
	/// HTTP status code, if available.
	pub status: Option<u16>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}

/// Raw response handed back by an [`HttpTransport`].
#[derive(Clone, Debug)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Metadata captured from the response headers.
	pub metadata: ResponseMetadata,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl HttpResponse {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Creates a response with no retry hint.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self {
			status,
			metadata: ResponseMetadata { status: Some(status), retry_after: None },
			body: body.into(),
		}
	}

	/// Attaches a Retry-After hint.
	pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
		self.metadata.retry_after = Some(retry_after);

		self
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Lossy UTF-8 preview of the body, truncated on a character boundary.
	pub fn body_preview(&self) -> String {
		let text = String::from_utf8_lossy(&self.body);

		if text.len() <= Self::BODY_PREVIEW_LIMIT {
			return text.into_owned();
		}

		let mut end = Self::BODY_PREVIEW_LIMIT;

		while !text.is_char_boundary(end) {
			end -= 1;
		}

		format!("{}...", &text[..end])
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let method = match request.method {
				HttpMethod::Get => reqwest::Method::GET,
				HttpMethod::Post => reqwest::Method::POST,
			};
			let mut builder = client.request(method, request.url);

			for (name, value) in request.headers {
				builder = builder.header(name, value);
			}
			if let Some(body) = request.body {
				builder = builder.body(body);
			}
			if let Some(timeout) = request.timeout {
				builder = builder.timeout(timeout);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let retry_after = parse_retry_after(response.headers());
			let body = response.bytes().await?.to_vec();

			Ok(HttpResponse {
				status,
				metadata: ResponseMetadata { status: Some(status), retry_after },
				body,
			})
		})
	}
}

#[cfg(feature = "reqwest")]
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u32>() {
		return Some(Duration::seconds(i64::from(secs)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
