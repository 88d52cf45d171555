//! User identity: bearer-token resolution plus password sign-up and sign-in.

pub mod memory;

pub use memory::MemoryIdentity;

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	collab::{CollabFuture, CollaboratorError},
	id::UserId,
};

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
	let (scheme, token) = header.trim().split_once(' ')?;
	let token = token.trim();

	(scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Optional metadata captured at sign-up.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
	/// Unique handle.
	pub username: Option<String>,
	/// Name shown in the UI.
	pub display_name: Option<String>,
}

/// Registered user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	/// Stable identifier used to scope inventory rows.
	pub id: UserId,
	/// Login email, stored lowercase.
	pub email: String,
	/// Sign-up metadata.
	pub profile: UserProfile,
	/// Registration instant.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
}

/// Session minted by a successful sign-in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
	/// Bearer token accepted by [`IdentityProvider::resolve_user`].
	pub access_token: TokenSecret,
	/// Instant after which the token is rejected.
	pub expires_at: OffsetDateTime,
	/// Signed-in user.
	pub user: User,
}

/// Identity backend used to authenticate inventory requests.
pub trait IdentityProvider
where
	Self: Send + Sync,
{
	/// Maps a bearer token to its user; fails with `Unauthorized` when unknown or expired.
	fn resolve_user<'a>(&'a self, bearer: &'a str) -> CollabFuture<'a, User>;

	/// Registers a new account.
	fn sign_up<'a>(
		&'a self,
		email: &'a str,
		password: &'a str,
		profile: UserProfile,
	) -> CollabFuture<'a, User>;

	/// Verifies the password and mints a session.
	fn sign_in<'a>(&'a self, email: &'a str, password: &'a str) -> CollabFuture<'a, Session>;
}

pub(crate) fn normalize_email(email: &str) -> Result<String, CollaboratorError> {
	let email = email.trim().to_ascii_lowercase();

	match email.split_once('@') {
		Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
		_ => Err(CollaboratorError::invalid("email address is malformed")),
	}
}
