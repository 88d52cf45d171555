//! Keyword and image search over active listings.
//!
//! Keyword searches run inside the retry machine from [`super::retry`]: the token is
//! fetched once, the same request is replayed while the marketplace answers with the
//! rate-limit signal, and any other failure ends the call. Image searches are a single
//! attempt. Both honor [`SearchOptions::deadline`].

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError, UpstreamError},
	http::{HttpRequest, HttpResponse},
	marketplace::{MarketplaceClient, RetryStep, wire},
	obs::{self, Operation, OperationSpan, Outcome},
	summary::SearchSummary,
};

/// Page size used when the caller does not pick one.
pub const DEFAULT_SEARCH_LIMIT: u32 = 100;
/// Largest page size the Browse API accepts.
pub const MAX_SEARCH_LIMIT: u32 = 200;
/// Restricts keyword searches to fixed-price listings in used or new condition.
pub const ACTIVE_LISTING_FILTER: &str = "buyingOptions:{FIXED_PRICE},condition:{USED,NEW}";

const MARKETPLACE_ID_HEADER: &str = "x-ebay-c-marketplace-id";

/// Per-call search parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchOptions {
	/// Requested page size, `1..=MAX_SEARCH_LIMIT`.
	pub limit: u32,
	/// Absolute instant after which the call fails with
	/// [`Error::DeadlineExceeded`] instead of waiting or sending more requests.
	pub deadline: Option<OffsetDateTime>,
}
impl SearchOptions {
	/// Default page size and no deadline.
	pub const fn new() -> Self {
		Self { limit: DEFAULT_SEARCH_LIMIT, deadline: None }
	}

	/// Overrides the page size.
	pub fn with_limit(mut self, limit: u32) -> Self {
		self.limit = limit;

		self
	}

	/// Sets an absolute deadline.
	pub fn with_deadline(mut self, deadline: OffsetDateTime) -> Self {
		self.deadline = Some(deadline);

		self
	}

	/// Sets a deadline `timeout` from now.
	pub fn with_timeout(self, timeout: StdDuration) -> Self {
		self.with_deadline(OffsetDateTime::now_utc() + timeout)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if (1..=MAX_SEARCH_LIMIT).contains(&self.limit) {
			Ok(())
		} else {
			Err(ConfigError::InvalidLimit { limit: self.limit, max: MAX_SEARCH_LIMIT })
		}
	}
}
impl Default for SearchOptions {
	fn default() -> Self {
		Self::new()
	}
}

impl MarketplaceClient {
	/// Searches active fixed-price listings for `query` and summarizes their prices.
	///
	/// Rate-limited responses are retried per [`MarketplaceClient::retry_policy`]; the
	/// final failure is [`Error::RateLimitExceeded`]. Every other non-success status or
	/// transport failure ends the call with [`Error::Upstream`].
	pub async fn search_active(&self, query: &str, options: SearchOptions) -> Result<SearchSummary> {
		const OPERATION: Operation = Operation::KeywordSearch;

		let span = OperationSpan::new(OPERATION, "search_active");

		obs::record_outcome(OPERATION, Outcome::Attempt);

		let result = span
			.instrument(async move {
				let query = query.trim();

				if query.is_empty() {
					return Err(ConfigError::EmptyQuery.into());
				}

				options.validate()?;
				ensure_before(options.deadline, 0)?;

				let token = self.tokens.token().await?;
				let mut url = self.config.endpoints.search.clone();

				url.query_pairs_mut()
					.append_pair("q", query)
					.append_pair("limit", &options.limit.to_string())
					.append_pair("filter", ACTIVE_LISTING_FILTER);

				let request = HttpRequest::get(url)
					.bearer(token.expose())
					.header(MARKETPLACE_ID_HEADER, self.config.marketplace_id.to_string());
				let response = self.fetch_with_retry(request, options.deadline).await?;

				summarize(&response)
			})
			.await;

		finish(OPERATION, result)
	}

	/// Searches active listings visually similar to `image` and summarizes their prices.
	///
	/// The request is sent once; a rate-limited response is reported as
	/// [`Error::Upstream`] like any other failure.
	pub async fn search_by_image(
		&self,
		image: &[u8],
		options: SearchOptions,
	) -> Result<SearchSummary> {
		const OPERATION: Operation = Operation::ImageSearch;

		let span = OperationSpan::new(OPERATION, "search_by_image");

		obs::record_outcome(OPERATION, Outcome::Attempt);

		let result = span
			.instrument(async move {
				options.validate()?;
				ensure_before(options.deadline, 0)?;

				let token = self.tokens.token().await?;
				let encoded = STANDARD.encode(image);
				let mut url = self.config.endpoints.image_search.clone();

				url.query_pairs_mut().append_pair("limit", &options.limit.to_string());

				let request = HttpRequest::post(url)
					.bearer(token.expose())
					.header(MARKETPLACE_ID_HEADER, self.config.marketplace_id.to_string())
					.json(&wire::ImageSearchRequest { image: &encoded })
					.map_err(ConfigError::from)?
					.with_timeout(remaining(options.deadline));

				self.metrics.record_search_attempt();

				let response = self
					.transport
					.execute(request)
					.await
					.map_err(|e| transport_failure(e, options.deadline, 1))?;

				if !response.is_success() {
					return Err(status_error(response).into());
				}

				summarize(&response)
			})
			.await;

		finish(OPERATION, result)
	}

	async fn fetch_with_retry(
		&self,
		request: HttpRequest,
		deadline: Option<OffsetDateTime>,
	) -> Result<HttpResponse> {
		let mut state = self.retry_policy.start();

		loop {
			ensure_before(deadline, state.attempts())?;
			state.begin_attempt();
			self.metrics.record_search_attempt();

			let attempt = request.clone().with_timeout(remaining(deadline));
			let response = self
				.transport
				.execute(attempt)
				.await
				.map_err(|e| transport_failure(e, deadline, state.attempts()))?;

			if response.is_success() {
				return Ok(response);
			}
			if !wire::is_rate_limit_error(&response.body) {
				return Err(status_error(response).into());
			}

			self.metrics.record_rate_limited();

			let attempts = state.attempts();
			let step = state.on_rate_limited();
			let wait = step.wait();

			obs::rate_limited(attempts, wait, response.metadata.retry_after);

			let exhausted = matches!(step, RetryStep::GiveUp { .. });

			if remaining(deadline).is_some_and(|left| left < wait) || is_past(deadline) {
				return Err(Error::DeadlineExceeded { attempts });
			}

			self.sleeper.sleep(wait).await;

			if exhausted {
				obs::retries_exhausted(attempts);

				return Err(Error::RateLimitExceeded { attempts });
			}
		}
	}
}

fn summarize(response: &HttpResponse) -> Result<SearchSummary> {
	let (total, items) = wire::decode::<wire::SearchPage>(&response.body)
		.map_err(|source| UpstreamError::MalformedBody { source })?
		.into_parts();

	Ok(SearchSummary::from_page(total, items))
}

fn finish(operation: Operation, result: Result<SearchSummary>) -> Result<SearchSummary> {
	match &result {
		Ok(_) => obs::record_outcome(operation, Outcome::Success),
		Err(e) => {
			obs::record_outcome(operation, Outcome::Failure);

			match e {
				Error::Upstream(UpstreamError::Status { status, .. }) =>
					obs::upstream_failed(operation, Some(*status)),
				Error::Upstream(_) => obs::upstream_failed(operation, None),
				_ => {},
			}
		},
	}

	result
}

fn status_error(response: HttpResponse) -> UpstreamError {
	UpstreamError::Status {
		status: response.status,
		body_preview: response.body_preview(),
		retry_after: response.metadata.retry_after,
	}
}

fn transport_failure(e: TransportError, deadline: Option<OffsetDateTime>, attempts: u32) -> Error {
	match e {
		TransportError::Timeout if deadline.is_some() => Error::DeadlineExceeded { attempts },
		e => UpstreamError::Transport(e).into(),
	}
}

fn ensure_before(deadline: Option<OffsetDateTime>, attempts: u32) -> Result<()> {
	if is_past(deadline) { Err(Error::DeadlineExceeded { attempts }) } else { Ok(()) }
}

fn is_past(deadline: Option<OffsetDateTime>) -> bool {
	deadline.is_some_and(|deadline| OffsetDateTime::now_utc() >= deadline)
}

// Time left before `deadline`; `None` when there is no deadline or it has passed.
fn remaining(deadline: Option<OffsetDateTime>) -> Option<StdDuration> {
	let left = deadline? - OffsetDateTime::now_utc();

	StdDuration::try_from(left).ok().filter(|left| !left.is_zero())
}
