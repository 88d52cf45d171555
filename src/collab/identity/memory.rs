//! In-memory [`IdentityProvider`] with salted password digests and opaque session tokens.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	collab::{
		CollabFuture, CollaboratorError,
		identity::{self, IdentityProvider, Session, User, UserProfile},
	},
	id::UserId,
};

const MIN_PASSWORD_LEN: usize = 6;
const SALT_LEN: usize = 16;
const SESSION_TOKEN_LEN: usize = 48;
const USER_ID_LEN: usize = 24;

#[derive(Clone, Debug)]
struct Account {
	user: User,
	salt: String,
	digest: String,
}

#[derive(Clone, Debug)]
struct SessionEntry {
	user_id: UserId,
	expires_at: OffsetDateTime,
}

#[derive(Debug, Default)]
struct State {
	// Keyed by normalized email.
	accounts: HashMap<String, Account>,
	sessions: HashMap<String, SessionEntry>,
}

/// Thread-safe identity backend for tests and local development.
#[derive(Clone, Debug)]
pub struct MemoryIdentity {
	state: Arc<RwLock<State>>,
	session_ttl: Duration,
}
impl MemoryIdentity {
	/// Sessions stay valid for one hour unless overridden.
	pub const DEFAULT_SESSION_TTL: Duration = Duration::hours(1);

	/// Creates an empty identity store.
	pub fn new() -> Self {
		Self { state: Default::default(), session_ttl: Self::DEFAULT_SESSION_TTL }
	}

	/// Overrides the session lifetime.
	pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
		self.session_ttl = ttl;

		self
	}

	/// Drops every session whose expiry is at or before `now`.
	pub fn purge_expired(&self, now: OffsetDateTime) -> usize {
		let mut state = self.state.write();
		let before = state.sessions.len();

		state.sessions.retain(|_, session| now < session.expires_at);

		before - state.sessions.len()
	}

	fn resolve_now(&self, bearer: &str, now: OffsetDateTime) -> Result<User, CollaboratorError> {
		let rejected = || CollaboratorError::unauthorized("invalid or expired token");
		let mut state = self.state.write();
		let lookup =
			state.sessions.get(bearer).map(|session| (session.user_id.clone(), now < session.expires_at));
		let user_id = match lookup {
			Some((user_id, true)) => user_id,
			Some((_, false)) => {
				state.sessions.remove(bearer);

				return Err(rejected());
			},
			None => return Err(rejected()),
		};

		state
			.accounts
			.values()
			.find(|account| account.user.id == user_id)
			.map(|account| account.user.clone())
			.ok_or_else(rejected)
	}

	fn sign_up_now(
		&self,
		email: &str,
		password: &str,
		profile: UserProfile,
	) -> Result<User, CollaboratorError> {
		let email = identity::normalize_email(email)?;

		if password.chars().count() < MIN_PASSWORD_LEN {
			return Err(CollaboratorError::invalid(format!(
				"password must be at least {MIN_PASSWORD_LEN} characters"
			)));
		}

		let mut state = self.state.write();

		if state.accounts.contains_key(&email) {
			return Err(CollaboratorError::Conflict { message: "user already registered".into() });
		}

		let id = UserId::new(random_string(USER_ID_LEN))
			.map_err(|e| CollaboratorError::Backend { message: e.to_string() })?;
		let user = User { id, email: email.clone(), profile, created_at: OffsetDateTime::now_utc() };
		let salt = random_string(SALT_LEN);
		let digest = password_digest(&salt, password);

		state.accounts.insert(email, Account { user: user.clone(), salt, digest });

		Ok(user)
	}

	fn sign_in_now(
		&self,
		email: &str,
		password: &str,
		now: OffsetDateTime,
	) -> Result<Session, CollaboratorError> {
		let rejected = || CollaboratorError::unauthorized("invalid login credentials");
		let email = identity::normalize_email(email).map_err(|_| rejected())?;
		let mut state = self.state.write();
		let user = state
			.accounts
			.get(&email)
			.filter(|account| password_digest(&account.salt, password) == account.digest)
			.map(|account| account.user.clone())
			.ok_or_else(rejected)?;
		let token = random_string(SESSION_TOKEN_LEN);
		let expires_at = now + self.session_ttl;

		state
			.sessions
			.insert(token.clone(), SessionEntry { user_id: user.id.clone(), expires_at });

		Ok(Session { access_token: TokenSecret::new(token), expires_at, user })
	}
}
impl Default for MemoryIdentity {
	fn default() -> Self {
		Self::new()
	}
}
impl IdentityProvider for MemoryIdentity {
	fn resolve_user<'a>(&'a self, bearer: &'a str) -> CollabFuture<'a, User> {
		Box::pin(async move { self.resolve_now(bearer, OffsetDateTime::now_utc()) })
	}

	fn sign_up<'a>(
		&'a self,
		email: &'a str,
		password: &'a str,
		profile: UserProfile,
	) -> CollabFuture<'a, User> {
		Box::pin(async move { self.sign_up_now(email, password, profile) })
	}

	fn sign_in<'a>(&'a self, email: &'a str, password: &'a str) -> CollabFuture<'a, Session> {
		Box::pin(async move { self.sign_in_now(email, password, OffsetDateTime::now_utc()) })
	}
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

fn password_digest(salt: &str, password: &str) -> String {
	let mut hasher = Sha256::new();

	hasher.update(salt.as_bytes());
	hasher.update(password.as_bytes());

	URL_SAFE_NO_PAD.encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn profile() -> UserProfile {
		UserProfile { username: Some("camera-flipper".into()), display_name: Some("Sam".into()) }
	}

	#[tokio::test]
	async fn sign_up_then_sign_in_resolves_user() {
		let provider = MemoryIdentity::new();
		let user = provider
			.sign_up("Sam@Example.com", "hunter22", profile())
			.await
			.expect("Sign-up should succeed.");
		let session = provider
			.sign_in("sam@example.com", "hunter22")
			.await
			.expect("Sign-in should succeed.");
		let header = format!("Bearer {}", session.access_token.expose());
		let token = identity::bearer_token(&header).expect("Header should carry a token.");
		let resolved = provider.resolve_user(token).await.expect("Session should resolve.");

		assert_eq!(resolved, user);
		assert_eq!(resolved.email, "sam@example.com");
		assert_eq!(resolved.profile.display_name.as_deref(), Some("Sam"));
	}

	#[tokio::test]
	async fn wrong_password_and_duplicate_email_fail() {
		let provider = MemoryIdentity::new();

		provider.sign_up("sam@example.com", "hunter22", profile()).await.expect("Sign-up should succeed.");

		assert!(matches!(
			provider.sign_in("sam@example.com", "hunter23").await,
			Err(CollaboratorError::Unauthorized { .. })
		));
		assert!(matches!(
			provider.sign_up("SAM@example.com", "another1", UserProfile::default()).await,
			Err(CollaboratorError::Conflict { .. })
		));
		assert!(matches!(
			provider.sign_up("new@example.com", "short", UserProfile::default()).await,
			Err(CollaboratorError::InvalidInput { .. })
		));
		assert!(matches!(
			provider.resolve_user("not-a-session").await,
			Err(CollaboratorError::Unauthorized { .. })
		));
	}

	#[test]
	fn expired_sessions_are_rejected_and_purged() {
		let provider = MemoryIdentity::new().with_session_ttl(Duration::minutes(5));
		let now = OffsetDateTime::UNIX_EPOCH;

		provider
			.sign_up_now("sam@example.com", "hunter22", UserProfile::default())
			.expect("Sign-up should succeed.");

		let session =
			provider.sign_in_now("sam@example.com", "hunter22", now).expect("Sign-in should succeed.");
		let idle =
			provider.sign_in_now("sam@example.com", "hunter22", now).expect("Sign-in should succeed.");
		let token = session.access_token.expose();

		assert!(provider.resolve_now(token, now + Duration::minutes(4)).is_ok());
		assert!(provider.resolve_now(token, now + Duration::minutes(5)).is_err());
		assert!(!provider.state.read().sessions.contains_key(token));
		assert!(provider.state.read().sessions.contains_key(idle.access_token.expose()));
		assert_eq!(provider.purge_expired(now + Duration::minutes(5)), 1);
		assert!(provider.state.read().sessions.is_empty());
	}

	#[test]
	fn digests_depend_on_salt() {
		assert_ne!(password_digest("salt-a", "hunter22"), password_digest("salt-b", "hunter22"));
		assert_eq!(password_digest("salt-a", "hunter22"), password_digest("salt-a", "hunter22"));
	}
}
