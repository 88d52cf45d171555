//! Backoff policy and the per-call retry state machine for rate-limited searches.
//!
//! Only the marketplace rate-limit signal drives this machine; every other failure ends
//! the call immediately.
//!
//! ```text
//! INIT -> REQUESTING -> (SUCCESS | RATE_LIMITED | FAILED)
//! RATE_LIMITED -> WAITING -> REQUESTING   (attempts < max)
//! RATE_LIMITED -> WAITING -> FAILED       (attempts == max)
//! ```

// self
use crate::_prelude::*;

/// Boxed future returned by [`Sleeper::sleep`].
pub type SleepFuture<'a> = Pin<Box<dyn Future<Output = ()> + 'a + Send>>;

/// Timer used for backoff waits. Waits must yield to the executor instead of blocking.
pub trait Sleeper
where
	Self: Send + Sync,
{
	/// Suspends the caller for `duration`.
	fn sleep(&self, duration: StdDuration) -> SleepFuture<'_>;
}

/// [`Sleeper`] backed by the tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSleeper;
impl Sleeper for TokioSleeper {
	fn sleep(&self, duration: StdDuration) -> SleepFuture<'_> {
		Box::pin(tokio::time::sleep(duration))
	}
}

/// Attempt ceiling and initial backoff for rate-limited requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Maximum number of requests per call, the first one included.
	pub max_attempts: u32,
	/// Wait after the first rate-limited response; doubled after each one.
	pub initial_backoff: StdDuration,
}
impl RetryPolicy {
	/// Five attempts starting at one second: 1s, 2s, 4s, 8s, 16s.
	pub const DEFAULT: Self =
		Self { max_attempts: 5, initial_backoff: StdDuration::from_millis(1_000) };

	/// Overrides the attempt ceiling (at least one attempt is always made).
	pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
		self.max_attempts = max_attempts.max(1);

		self
	}

	/// Overrides the initial backoff.
	pub fn with_initial_backoff(mut self, backoff: StdDuration) -> Self {
		self.initial_backoff = backoff;

		self
	}

	/// Starts a fresh state machine for one outbound call.
	pub fn start(self) -> RetryState {
		RetryState::new(self)
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self::DEFAULT
	}
}

/// Decision taken after a rate-limited response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryStep {
	/// Wait, then issue the same request again.
	Retry {
		/// Backoff to wait before the next attempt.
		wait: StdDuration,
	},
	/// Wait, then fail the call with the rate-limit error.
	GiveUp {
		/// Backoff to wait before surfacing the failure.
		wait: StdDuration,
	},
}
impl RetryStep {
	/// Returns the wait carried by either step.
	pub fn wait(self) -> StdDuration {
		match self {
			RetryStep::Retry { wait } | RetryStep::GiveUp { wait } => wait,
		}
	}
}

/// Transient state of one outbound call: attempts made so far and the next backoff.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryState {
	policy: RetryPolicy,
	attempts: u32,
	backoff: StdDuration,
}
impl RetryState {
	/// Creates the state for a call that has not issued any request yet.
	pub fn new(policy: RetryPolicy) -> Self {
		Self { policy, attempts: 0, backoff: policy.initial_backoff }
	}

	/// Records that a request is about to be sent.
	pub fn begin_attempt(&mut self) {
		self.attempts += 1;
	}

	/// Number of requests sent so far.
	pub fn attempts(&self) -> u32 {
		self.attempts
	}

	/// Backoff that the next rate-limited response will wait.
	pub fn current_backoff(&self) -> StdDuration {
		self.backoff
	}

	/// Advances the machine after a rate-limited response and doubles the backoff.
	pub fn on_rate_limited(&mut self) -> RetryStep {
		let wait = self.backoff;

		self.backoff = self.backoff.saturating_mul(2);

		if self.attempts >= self.policy.max_attempts {
			RetryStep::GiveUp { wait }
		} else {
			RetryStep::Retry { wait }
		}
	}
}
