//! Client-credentials token cache with single-flight refreshes.
//!
//! [`TokenCache`] keeps one [`CachedToken`] for the configured application keyset and
//! hands out its value while `now < expires_at`. Once the token is absent or expired the
//! cache performs a client-credentials exchange, stores the new value and expiry as one
//! unit, and returns the fresh value. Exchange failures surface as
//! [`AuthError`](crate::error::AuthError) and are never retried here.

// self
use crate::{
	_prelude::*,
	auth::{CachedToken, ClientCredentials, TokenSecret},
	error::AuthError,
	http::{HttpRequest, HttpTransport},
	marketplace::{ClientMetrics, wire},
	obs::{self, Operation, OperationSpan, Outcome},
};

/// Boxed future returned by [`TokenSource::token`].
pub type TokenFuture<'a> = Pin<Box<dyn Future<Output = Result<TokenSecret>> + 'a + Send>>;

/// Capability handing out a bearer token that is valid at the time of the call.
pub trait TokenSource
where
	Self: Send + Sync,
{
	/// Resolves with a usable bearer token.
	fn token(&self) -> TokenFuture<'_>;
}

/// Caches one bearer token minted through the client-credentials grant.
pub struct TokenCache {
	transport: Arc<dyn HttpTransport>,
	credentials: ClientCredentials,
	endpoint: Url,
	scope: String,
	slot: RwLock<Option<CachedToken>>,
	refresh_guard: AsyncMutex<()>,
	metrics: Arc<ClientMetrics>,
}
impl TokenCache {
	/// Creates an empty cache that exchanges `credentials` at `endpoint` for `scope`.
	pub fn new(
		transport: Arc<dyn HttpTransport>,
		credentials: ClientCredentials,
		endpoint: Url,
		scope: impl Into<String>,
	) -> Self {
		Self {
			transport,
			credentials,
			endpoint,
			scope: scope.into(),
			slot: RwLock::new(None),
			refresh_guard: AsyncMutex::new(()),
			metrics: Default::default(),
		}
	}

	/// Shares counters with another component (typically the search client).
	pub fn with_metrics(mut self, metrics: Arc<ClientMetrics>) -> Self {
		self.metrics = metrics;

		self
	}

	/// Counters updated by this cache.
	pub fn metrics(&self) -> &Arc<ClientMetrics> {
		&self.metrics
	}

	/// Returns the cached pair, expired or not.
	pub fn cached(&self) -> Option<CachedToken> {
		self.slot.read().clone()
	}

	/// Drops the cached pair so the next call performs an exchange.
	pub fn invalidate(&self) {
		*self.slot.write() = None;
	}

	/// Returns a valid token, refreshing it when absent or expired.
	pub async fn get_token(&self) -> Result<TokenSecret> {
		self.get_token_at(OffsetDateTime::now_utc()).await
	}

	/// Same as [`TokenCache::get_token`], evaluating expiry at `now`.
	pub async fn get_token_at(&self, now: OffsetDateTime) -> Result<TokenSecret> {
		if let Some((value, expires_at)) = self.valid_at(now) {
			self.metrics.record_token_cache_hit();
			obs::token_reused(expires_at);

			return Ok(value);
		}

		let _singleflight = self.refresh_guard.lock().await;

		// Another caller may have refreshed while this one waited on the guard.
		if let Some((value, _)) = self.valid_at(now) {
			self.metrics.record_token_refresh_join();

			return Ok(value);
		}

		const OPERATION: Operation = Operation::TokenRefresh;

		let span = OperationSpan::new(OPERATION, "get_token");

		obs::record_outcome(OPERATION, Outcome::Attempt);

		let result = span.instrument(self.exchange(now)).await;

		match &result {
			Ok(token) => {
				obs::record_outcome(OPERATION, Outcome::Success);
				obs::token_refreshed(token.expires_at());
			},
			Err(_) => obs::record_outcome(OPERATION, Outcome::Failure),
		}

		let token = result?;
		let value = token.value().clone();

		*self.slot.write() = Some(token);

		Ok(value)
	}

	fn valid_at(&self, now: OffsetDateTime) -> Option<(TokenSecret, OffsetDateTime)> {
		let guard = self.slot.read();
		let token = guard.as_ref().filter(|token| token.is_valid_at(now))?;

		Some((token.value().clone(), token.expires_at()))
	}

	async fn exchange(&self, now: OffsetDateTime) -> Result<CachedToken, AuthError> {
		self.metrics.record_token_refresh();

		let request = HttpRequest::post(self.endpoint.clone())
			.header("authorization", self.credentials.basic_authorization())
			.form([("grant_type", "client_credentials"), ("scope", self.scope.as_str())]);
		let response = self.transport.execute(request).await.map_err(AuthError::Transport)?;

		if !response.is_success() {
			return Err(AuthError::Rejected {
				status: response.status,
				body_preview: response.body_preview(),
			});
		}

		let payload = wire::decode::<wire::TokenResponse>(&response.body)
			.map_err(|source| AuthError::MalformedResponse { source })?;

		if payload.expires_in <= 0 {
			return Err(AuthError::NonPositiveExpiresIn { expires_in: payload.expires_in });
		}

		Ok(CachedToken::issued(
			TokenSecret::new(payload.access_token),
			now,
			Duration::seconds(payload.expires_in),
		))
	}
}
impl TokenSource for TokenCache {
	fn token(&self) -> TokenFuture<'_> {
		Box::pin(self.get_token())
	}
}
impl Debug for TokenCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache")
			.field("endpoint", &self.endpoint.as_str())
			.field("client_id", &self.credentials.client_id)
			.field("scope", &self.scope)
			.field("cached", &self.slot.read().as_ref().map(CachedToken::expires_at))
			.finish()
	}
}

/// [`TokenSource`] returning a fixed token; useful when another process owns the cache.
#[derive(Clone, Debug)]
pub struct StaticToken(pub TokenSecret);
impl TokenSource for StaticToken {
	fn token(&self) -> TokenFuture<'_> {
		let value = self.0.clone();

		Box::pin(async move { Ok(value) })
	}
}
