//! Always-on counters for token and search traffic.

// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters shared by the token cache and the marketplace client.
#[derive(Debug, Default)]
pub struct ClientMetrics {
	token_refreshes: AtomicU64,
	token_cache_hits: AtomicU64,
	token_refresh_joins: AtomicU64,
	search_attempts: AtomicU64,
	rate_limited: AtomicU64,
}
impl ClientMetrics {
	/// Returns the number of credential exchanges sent to the authentication endpoint.
	pub fn token_refreshes(&self) -> u64 {
		self.token_refreshes.load(Ordering::Relaxed)
	}

	/// Returns the number of token requests served from the cache.
	pub fn token_cache_hits(&self) -> u64 {
		self.token_cache_hits.load(Ordering::Relaxed)
	}

	/// Returns the number of token requests that waited on a refresh another caller was
	/// running and were served by its result.
	pub fn token_refresh_joins(&self) -> u64 {
		self.token_refresh_joins.load(Ordering::Relaxed)
	}

	/// Returns the number of search requests sent, retries included.
	pub fn search_attempts(&self) -> u64 {
		self.search_attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of responses that carried the rate-limit signal.
	pub fn rate_limited(&self) -> u64 {
		self.rate_limited.load(Ordering::Relaxed)
	}

	pub(crate) fn record_token_refresh(&self) {
		self.token_refreshes.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_token_cache_hit(&self) {
		self.token_cache_hits.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_token_refresh_join(&self) {
		self.token_refresh_joins.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_search_attempt(&self) {
		self.search_attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_rate_limited(&self) {
		self.rate_limited.fetch_add(1, Ordering::Relaxed);
	}
}
