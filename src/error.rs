//! Crate-level error types shared by the token cache, the marketplace client, and the
//! collaborator contracts.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// A failed search never yields a partial summary; callers receive exactly one of these
/// variants and can tell "try later" ([`Error::RateLimitExceeded`]) apart from broken
/// credentials ([`Error::Auth`]) and a broken upstream ([`Error::Upstream`]).
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credential exchange against the authentication endpoint failed.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Search endpoint kept answering with the rate-limit signal.
	#[error("Marketplace rate limit persisted after {attempts} attempts.")]
	RateLimitExceeded {
		/// Number of requests issued before giving up.
		attempts: u32,
	},
	/// Search endpoint failed for any reason other than rate limiting.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),
	/// Caller-supplied deadline elapsed before the call could finish.
	#[error("Deadline elapsed after {attempts} attempts.")]
	DeadlineExceeded {
		/// Number of requests issued before the deadline hit.
		attempts: u32,
	},
	/// Local configuration or input problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Collaborator backend (inventory, spreadsheet, identity) failure.
	#[error("{0}")]
	Collaborator(
		#[from]
		#[source]
		crate::collab::CollaboratorError,
	),
}
impl Error {
	/// Returns `true` when waiting and calling again may succeed.
	pub fn is_transient(&self) -> bool {
		matches!(self, Self::RateLimitExceeded { .. } | Self::DeadlineExceeded { .. })
	}

	/// Returns `true` when the marketplace rate limit was the terminal failure.
	pub fn is_rate_limited(&self) -> bool {
		matches!(self, Self::RateLimitExceeded { .. })
	}
}

/// Credential exchange failures. Never retried by the cache.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// Authentication endpoint answered with a non-success status.
	#[error("Authentication endpoint rejected the credential exchange with status {status}.")]
	Rejected {
		/// HTTP status code.
		status: u16,
		/// Truncated response body for diagnostics.
		body_preview: String,
	},
	/// Authentication endpoint could not be reached.
	#[error("Authentication endpoint could not be reached.")]
	Transport(#[source] TransportError),
	/// Authentication endpoint returned a body that is not a token response.
	#[error("Authentication endpoint returned a malformed token response.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Token response carried a zero or negative lifetime.
	#[error("The expires_in value must be positive, got {expires_in}.")]
	NonPositiveExpiresIn {
		/// Lifetime reported by the endpoint.
		expires_in: i64,
	},
}

/// Search endpoint failures other than the rate-limit signal.
#[derive(Debug, ThisError)]
pub enum UpstreamError {
	/// Search endpoint answered with a non-success status.
	#[error("Marketplace responded with status {status}: {body_preview}")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Truncated response body for diagnostics.
		body_preview: String,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Search endpoint could not be reached.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Search endpoint returned a success status with a body that is not JSON of the
	/// expected shape.
	#[error("Marketplace returned a malformed search response.")]
	MalformedBody {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Configuration and input validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Endpoint URL cannot be parsed.
	#[error("The {endpoint} endpoint is not a valid URL.")]
	InvalidEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoint uses a scheme other than `http` or `https`.
	#[error("The {endpoint} endpoint must use http or https: {url}.")]
	UnsupportedScheme {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Required environment variable is absent or empty.
	#[error("Environment variable `{name}` is not set.")]
	MissingEnv {
		/// Variable name.
		name: &'static str,
	},
	/// Environment variable holds an unsupported value.
	#[error("Environment variable `{name}` has an unsupported value `{value}`.")]
	InvalidEnv {
		/// Variable name.
		name: &'static str,
		/// Rejected value.
		value: String,
	},
	/// Marketplace identifier failed validation.
	#[error("Marketplace identifier is invalid.")]
	InvalidMarketplaceId(#[from] crate::id::IdentifierError),
	/// Search query is empty after trimming.
	#[error("Search query must not be empty.")]
	EmptyQuery,
	/// Page size is outside the accepted range.
	#[error("Search limit must be between 1 and {max}, got {limit}.")]
	InvalidLimit {
		/// Rejected page size.
		limit: u32,
		/// Largest accepted page size.
		max: u32,
	},
	/// Request body could not be encoded.
	#[error("Request body could not be encoded.")]
	RequestEncoding(#[from] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Transport-level failures (network, timeouts).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the marketplace.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request did not complete within its timeout.
	#[error("Request to the marketplace timed out.")]
	Timeout,
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout } else { Self::network(e) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::collab::CollaboratorError;

	#[test]
	fn transient_classification_only_covers_waitable_failures() {
		assert!(Error::RateLimitExceeded { attempts: 5 }.is_transient());
		assert!(Error::DeadlineExceeded { attempts: 1 }.is_transient());
		assert!(!Error::from(ConfigError::EmptyQuery).is_transient());
		assert!(
			!Error::from(AuthError::Rejected { status: 401, body_preview: String::new() })
				.is_transient()
		);
		assert!(!Error::from(UpstreamError::Transport(TransportError::Timeout)).is_rate_limited());
	}

	#[test]
	fn collaborator_error_keeps_its_source() {
		let inner = CollaboratorError::Backend { message: "bucket unavailable".into() };
		let err: Error = inner.clone().into();

		assert!(err.to_string().contains("bucket unavailable"));

		let source = StdError::source(&err)
			.expect("Crate error should expose the collaborator error as its source.");

		assert_eq!(source.to_string(), inner.to_string());
	}
}
