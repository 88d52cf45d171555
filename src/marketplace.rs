//! Marketplace search client: keyword and image search over active listings.
//!
//! [`MarketplaceClient`] obtains a bearer token from a [`TokenSource`], issues the search
//! request through an [`HttpTransport`], retries only on the marketplace rate-limit
//! signal, and folds the returned page into a [`SearchSummary`](crate::summary::SearchSummary).

pub mod config;
pub mod metrics;
pub mod retry;
pub mod search;
pub mod wire;

pub use self::config::*;
pub use self::metrics::*;
pub use self::retry::*;
pub use self::search::*;
pub use self::wire::{RATE_LIMIT_ERROR_ID, is_rate_limit_error};

// self
use crate::{
	_prelude::*,
	cache::{TokenCache, TokenSource},
	http::HttpTransport,
};
#[cfg(feature = "reqwest")]
use crate::{error::ConfigError, http::ReqwestTransport};

/// Rate-limit aware search client for one marketplace configuration.
///
/// The client owns the HTTP transport, token source, retry policy, and timer handles so
/// search operations only deal with request shaping and response classification. By
/// default the token source is a [`TokenCache`] built from the same configuration and
/// transport; inject another one with [`MarketplaceClient::with_token_source`].
#[derive(Clone)]
pub struct MarketplaceClient {
	/// Transport used for every outbound request.
	pub transport: Arc<dyn HttpTransport>,
	/// Capability handing out bearer tokens.
	pub tokens: Arc<dyn TokenSource>,
	/// Endpoints, scope, and marketplace identifier.
	pub config: MarketplaceConfig,
	/// Attempt ceiling and backoff schedule for rate-limited searches.
	pub retry_policy: RetryPolicy,
	/// Timer used for backoff waits.
	pub sleeper: Arc<dyn Sleeper>,
	metrics: Arc<ClientMetrics>,
}
impl MarketplaceClient {
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_transport(config: MarketplaceConfig, transport: Arc<dyn HttpTransport>) -> Self {
		let metrics = Arc::new(ClientMetrics::default());
		let tokens = TokenCache::new(
			transport.clone(),
			config.credentials.clone(),
			config.endpoints.auth.clone(),
			config.scope.clone(),
		)
		.with_metrics(metrics.clone());

		Self {
			transport,
			tokens: Arc::new(tokens),
			config,
			retry_policy: RetryPolicy::default(),
			sleeper: Arc::new(TokioSleeper),
			metrics,
		}
	}

	/// Replaces the token source, e.g. with a cache shared across clients.
	pub fn with_token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
		self.tokens = tokens;

		self
	}

	/// Replaces the retry policy.
	pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
		self.retry_policy = policy;

		self
	}

	/// Replaces the backoff timer.
	pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
		self.sleeper = sleeper;

		self
	}

	/// Counters shared with the default token cache.
	pub fn metrics(&self) -> &Arc<ClientMetrics> {
		&self.metrics
	}
}
#[cfg(feature = "reqwest")]
impl MarketplaceClient {
	/// Creates a client backed by a fresh reqwest transport.
	pub fn new(config: MarketplaceConfig) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().build().map_err(ConfigError::http_client_build)?;

		Ok(Self::with_transport(config, Arc::new(ReqwestTransport::with_client(client))))
	}
}
impl Debug for MarketplaceClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("MarketplaceClient")
			.field("config", &self.config)
			.field("retry_policy", &self.retry_policy)
			.finish()
	}
}
