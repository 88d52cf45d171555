// self
use crate::{_prelude::*, obs::Operation};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOperation<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOperation<F> = F;

/// A span builder used by marketplace operations.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OperationSpan {
	/// Creates a new span tagged with the provided operation + stage.
	pub fn new(operation: Operation, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"market_scout.operation",
				operation = operation.as_str(),
				stage
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (operation, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOperation<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Notes that a cached token satisfied the request.
pub fn token_reused(expires_at: OffsetDateTime) {
	#[cfg(feature = "tracing")]
	tracing::debug!(%expires_at, "Using cached marketplace token.");
	#[cfg(not(feature = "tracing"))]
	let _ = expires_at;
}

/// Notes that a fresh token was minted.
pub fn token_refreshed(expires_at: OffsetDateTime) {
	#[cfg(feature = "tracing")]
	tracing::info!(%expires_at, "Marketplace token acquired.");
	#[cfg(not(feature = "tracing"))]
	let _ = expires_at;
}

/// Notes that the search endpoint answered with the rate-limit signal.
pub fn rate_limited(attempt: u32, wait: StdDuration, retry_after: Option<Duration>) {
	#[cfg(feature = "tracing")]
	tracing::warn!(
		attempt,
		wait_ms = wait.as_millis() as u64,
		retry_after = ?retry_after,
		"Marketplace rate limit hit, backing off."
	);
	#[cfg(not(feature = "tracing"))]
	let _ = (attempt, wait, retry_after);
}

/// Notes that the retry budget ran out.
pub fn retries_exhausted(attempts: u32) {
	#[cfg(feature = "tracing")]
	tracing::error!(attempts, "Marketplace rate limit persisted; giving up.");
	#[cfg(not(feature = "tracing"))]
	let _ = attempts;
}

/// Notes a terminal upstream failure.
pub fn upstream_failed(operation: Operation, status: Option<u16>) {
	#[cfg(feature = "tracing")]
	tracing::error!(operation = operation.as_str(), status = ?status, "Marketplace call failed.");
	#[cfg(not(feature = "tracing"))]
	let _ = (operation, status);
}
