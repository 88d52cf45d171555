//! Immutable cached bearer token paired with its absolute expiry.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Bearer token issued by the authentication endpoint together with the instant it stops
/// being usable.
///
/// The pair is replaced as a whole whenever a new token is minted; there is no way to
/// update one half without the other.
#[derive(Clone, PartialEq, Eq)]
pub struct CachedToken {
	value: TokenSecret,
	expires_at: OffsetDateTime,
}
impl CachedToken {
	/// Creates a token that expires at the provided instant.
	pub fn new(value: TokenSecret, expires_at: OffsetDateTime) -> Self {
		Self { value, expires_at }
	}

	/// Creates a token issued at `issued_at` that lives for `lifetime`.
	pub fn issued(value: TokenSecret, issued_at: OffsetDateTime, lifetime: Duration) -> Self {
		Self::new(value, issued_at + lifetime)
	}

	/// Returns the bearer value.
	pub fn value(&self) -> &TokenSecret {
		&self.value
	}

	/// Returns the expiry instant.
	pub fn expires_at(&self) -> OffsetDateTime {
		self.expires_at
	}

	/// Returns `true` while `instant` is strictly before the expiry.
	pub fn is_valid_at(&self, instant: OffsetDateTime) -> bool {
		instant < self.expires_at
	}

	/// Convenience helper that checks validity against the current UTC clock.
	pub fn is_valid(&self) -> bool {
		self.is_valid_at(OffsetDateTime::now_utc())
	}

	/// Remaining lifetime at `instant`, clamped to zero once expired.
	pub fn remaining_at(&self, instant: OffsetDateTime) -> Duration {
		let remaining = self.expires_at - instant;

		if remaining.is_negative() { Duration::ZERO } else { remaining }
	}
}
impl Debug for CachedToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CachedToken")
			.field("value", &"<redacted>")
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn validity_ends_exactly_at_expiry() {
		let issued = macros::datetime!(2025-01-01 00:00 UTC);
		let token = CachedToken::issued(TokenSecret::new("access"), issued, Duration::hours(2));

		assert_eq!(token.expires_at(), macros::datetime!(2025-01-01 02:00 UTC));
		assert!(token.is_valid_at(macros::datetime!(2025-01-01 01:59:59 UTC)));
		assert!(!token.is_valid_at(macros::datetime!(2025-01-01 02:00 UTC)));
		assert!(!token.is_valid_at(macros::datetime!(2025-01-01 03:00 UTC)));
	}

	#[test]
	fn remaining_lifetime_clamps_at_zero() {
		let token = CachedToken::new(
			TokenSecret::new("access"),
			macros::datetime!(2025-01-01 01:00 UTC),
		);

		assert_eq!(token.remaining_at(macros::datetime!(2025-01-01 00:30 UTC)), Duration::minutes(30));
		assert_eq!(token.remaining_at(macros::datetime!(2025-01-01 02:00 UTC)), Duration::ZERO);
		assert!(format!("{token:?}").contains("<redacted>"));
	}
}
