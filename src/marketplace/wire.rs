//! Wire shapes of the marketplace authentication and Browse endpoints.

// crates.io
use serde_json::Value;
// self
use crate::{_prelude::*, summary::SearchItem};

/// Error identifier the marketplace uses for its call-rate limiter.
pub const RATE_LIMIT_ERROR_ID: &str = "10001";

/// Successful client-credentials response.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct TokenResponse {
	pub(crate) access_token: String,
	pub(crate) expires_in: i64,
}

/// Successful search response. Missing fields decode as an empty page.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchPage {
	#[serde(default)]
	pub(crate) item_summaries: Option<Vec<SearchItem>>,
	#[serde(default)]
	pub(crate) total: Option<u64>,
}
impl SearchPage {
	pub(crate) fn into_parts(self) -> (u64, Vec<SearchItem>) {
		(self.total.unwrap_or(0), self.item_summaries.unwrap_or_default())
	}
}

/// Image search request body.
#[derive(Clone, Debug, Serialize)]
pub(crate) struct ImageSearchRequest<'a> {
	/// Base64-encoded image bytes.
	pub(crate) image: &'a str,
}

/// Decodes `body` with path-aware error reporting.
pub(crate) fn decode<T>(body: &[u8]) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
where
	T: serde::de::DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
}

/// Returns `true` when an error body carries [`RATE_LIMIT_ERROR_ID`].
///
/// Two envelopes are recognized: the legacy one nesting everything in single-element
/// arrays (`errorMessage[0].error[0].errorId[0]`) and the Browse one
/// (`errors[].errorId`). Identifiers may be strings or numbers.
pub fn is_rate_limit_error(body: &[u8]) -> bool {
	let Ok(envelope) = serde_json::from_slice::<Value>(body) else {
		return false;
	};
	let legacy = envelope
		.get("errorMessage")
		.and_then(|value| value.get(0))
		.and_then(|value| value.get("error"))
		.and_then(|value| value.get(0))
		.and_then(|value| value.get("errorId"))
		.and_then(|value| value.get(0))
		.is_some_and(is_rate_limit_id);
	let browse = envelope
		.get("errors")
		.and_then(Value::as_array)
		.is_some_and(|errors| {
			errors.iter().filter_map(|error| error.get("errorId")).any(is_rate_limit_id)
		});

	legacy || browse
}

fn is_rate_limit_id(value: &Value) -> bool {
	match value {
		Value::String(raw) => raw.trim() == RATE_LIMIT_ERROR_ID,
		Value::Number(number) => number.to_string() == RATE_LIMIT_ERROR_ID,
		_ => false,
	}
}
