//! Application credentials used for the client-credentials exchange.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Application keyset (client id + client secret) issued by the marketplace developer
/// program.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
	/// Public application identifier.
	pub client_id: String,
	/// Application secret; never logged.
	pub client_secret: TokenSecret,
}
impl ClientCredentials {
	/// Creates a keyset from raw values.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self { client_id: client_id.into(), client_secret: TokenSecret::new(client_secret) }
	}

	/// Builds the `Authorization` header value for HTTP Basic client authentication.
	pub fn basic_authorization(&self) -> String {
		let raw = format!("{}:{}", self.client_id, self.client_secret.expose());

		format!("Basic {}", STANDARD.encode(raw))
	}
}
impl Debug for ClientCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientCredentials")
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.finish()
	}
}
