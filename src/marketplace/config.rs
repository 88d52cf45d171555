//! Marketplace endpoint, scope, and credential configuration.

// std
use std::env;
// self
use crate::{_prelude::*, auth::ClientCredentials, error::ConfigError, id::MarketplaceId};

/// Default marketplace when none is configured.
pub const DEFAULT_MARKETPLACE_ID: &str = "EBAY_US";
/// OAuth scope granting public Browse API access.
pub const DEFAULT_SCOPE: &str = "https://api.ebay.com/oauth/api_scope";

const ENV_CLIENT_ID: &str = "EBAY_CLIENT_ID";
const ENV_CLIENT_SECRET: &str = "EBAY_CLIENT_SECRET";
const ENV_ENVIRONMENT: &str = "EBAY_ENVIRONMENT";
const ENV_MARKETPLACE_ID: &str = "EBAY_MARKETPLACE_ID";

/// Marketplace deployment whose endpoints are used by default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
	#[default]
	/// Live marketplace.
	Production,
	/// Developer sandbox.
	Sandbox,
}
impl Environment {
	/// Token endpoint for the client-credentials grant.
	pub const fn auth_endpoint(self) -> &'static str {
		match self {
			Environment::Production => "https://api.ebay.com/identity/v1/oauth2/token",
			Environment::Sandbox => "https://api.sandbox.ebay.com/identity/v1/oauth2/token",
		}
	}

	/// Keyword search endpoint.
	pub const fn search_endpoint(self) -> &'static str {
		match self {
			Environment::Production => "https://api.ebay.com/buy/browse/v1/item_summary/search",
			Environment::Sandbox =>
				"https://api.sandbox.ebay.com/buy/browse/v1/item_summary/search",
		}
	}

	/// Image search endpoint.
	pub const fn image_search_endpoint(self) -> &'static str {
		match self {
			Environment::Production =>
				"https://api.ebay.com/buy/browse/v1/item_summary/search_by_image",
			Environment::Sandbox =>
				"https://api.sandbox.ebay.com/buy/browse/v1/item_summary/search_by_image",
		}
	}
}
impl FromStr for Environment {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"production" | "prod" => Ok(Self::Production),
			"sandbox" => Ok(Self::Sandbox),
			_ => Err(ConfigError::InvalidEnv { name: ENV_ENVIRONMENT, value: s.to_owned() }),
		}
	}
}

/// Endpoint set used by the token cache and the search client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarketplaceEndpoints {
	/// Client-credentials token endpoint.
	pub auth: Url,
	/// Keyword search endpoint.
	pub search: Url,
	/// Image search endpoint.
	pub image_search: Url,
}

/// Immutable configuration consumed by [`MarketplaceClient`](crate::marketplace::MarketplaceClient).
#[derive(Clone, Debug)]
pub struct MarketplaceConfig {
	/// Application keyset.
	pub credentials: ClientCredentials,
	/// Resolved endpoints.
	pub endpoints: MarketplaceEndpoints,
	/// OAuth scope requested during the credential exchange.
	pub scope: String,
	/// Value of the marketplace-id header sent with searches.
	pub marketplace_id: MarketplaceId,
}
impl MarketplaceConfig {
	/// Creates a builder seeded with the provided credentials.
	pub fn builder(credentials: ClientCredentials) -> MarketplaceConfigBuilder {
		MarketplaceConfigBuilder::new(credentials)
	}

	/// Loads credentials and optional overrides from the process environment.
	///
	/// Reads `EBAY_CLIENT_ID` and `EBAY_CLIENT_SECRET` (required), `EBAY_ENVIRONMENT`
	/// (`production` or `sandbox`), and `EBAY_MARKETPLACE_ID`.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| env::var(name).ok())
	}

	/// Same as [`MarketplaceConfig::from_env`] with a custom variable lookup.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let required = |name: &'static str| {
			lookup(name)
				.filter(|value| !value.trim().is_empty())
				.ok_or(ConfigError::MissingEnv { name })
		};
		let credentials = ClientCredentials::new(required(ENV_CLIENT_ID)?, required(ENV_CLIENT_SECRET)?);
		let mut builder = Self::builder(credentials);

		if let Some(raw) = lookup(ENV_ENVIRONMENT).filter(|value| !value.trim().is_empty()) {
			builder = builder.environment(raw.parse()?);
		}
		if let Some(raw) = lookup(ENV_MARKETPLACE_ID).filter(|value| !value.trim().is_empty()) {
			builder = builder.marketplace_id(MarketplaceId::new(raw.trim())?);
		}

		builder.build()
	}
}

/// Builder for [`MarketplaceConfig`] values.
#[derive(Debug)]
pub struct MarketplaceConfigBuilder {
	credentials: ClientCredentials,
	environment: Environment,
	auth_endpoint: Option<String>,
	search_endpoint: Option<String>,
	image_search_endpoint: Option<String>,
	scope: String,
	marketplace_id: Option<MarketplaceId>,
}
impl MarketplaceConfigBuilder {
	fn new(credentials: ClientCredentials) -> Self {
		Self {
			credentials,
			environment: Environment::default(),
			auth_endpoint: None,
			search_endpoint: None,
			image_search_endpoint: None,
			scope: DEFAULT_SCOPE.into(),
			marketplace_id: None,
		}
	}

	/// Selects the deployment whose endpoints fill any endpoint not set explicitly.
	pub fn environment(mut self, environment: Environment) -> Self {
		self.environment = environment;

		self
	}

	/// Overrides the token endpoint.
	pub fn auth_endpoint(mut self, url: impl Into<String>) -> Self {
		self.auth_endpoint = Some(url.into());

		self
	}

	/// Overrides the keyword search endpoint.
	pub fn search_endpoint(mut self, url: impl Into<String>) -> Self {
		self.search_endpoint = Some(url.into());

		self
	}

	/// Overrides the image search endpoint.
	pub fn image_search_endpoint(mut self, url: impl Into<String>) -> Self {
		self.image_search_endpoint = Some(url.into());

		self
	}

	/// Overrides the OAuth scope.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = scope.into();

		self
	}

	/// Overrides the marketplace-id header value.
	pub fn marketplace_id(mut self, id: MarketplaceId) -> Self {
		self.marketplace_id = Some(id);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<MarketplaceConfig, ConfigError> {
		let env = self.environment;
		let endpoints = MarketplaceEndpoints {
			auth: parse_endpoint("auth", self.auth_endpoint.as_deref().unwrap_or(env.auth_endpoint()))?,
			search: parse_endpoint(
				"search",
				self.search_endpoint.as_deref().unwrap_or(env.search_endpoint()),
			)?,
			image_search: parse_endpoint(
				"image search",
				self.image_search_endpoint.as_deref().unwrap_or(env.image_search_endpoint()),
			)?,
		};
		let marketplace_id = match self.marketplace_id {
			Some(id) => id,
			None => MarketplaceId::new(DEFAULT_MARKETPLACE_ID)?,
		};

		Ok(MarketplaceConfig { credentials: self.credentials, endpoints, scope: self.scope, marketplace_id })
	}
}

fn parse_endpoint(endpoint: &'static str, raw: &str) -> Result<Url, ConfigError> {
	let url = Url::parse(raw).map_err(|source| ConfigError::InvalidEndpoint { endpoint, source })?;

	match url.scheme() {
		"http" | "https" => Ok(url),
		_ => Err(ConfigError::UnsupportedScheme { endpoint, url: url.to_string() }),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn credentials() -> ClientCredentials {
		ClientCredentials::new("app-id", "app-secret")
	}

	#[test]
	fn defaults_target_production() {
		let config = MarketplaceConfig::builder(credentials())
			.build()
			.expect("Default configuration should build.");

		assert_eq!(config.endpoints.auth.as_str(), Environment::Production.auth_endpoint());
		assert_eq!(config.endpoints.search.host_str(), Some("api.ebay.com"));
		assert_eq!(config.scope, DEFAULT_SCOPE);
		assert_eq!(config.marketplace_id.as_ref(), DEFAULT_MARKETPLACE_ID);
	}

	#[test]
	fn explicit_endpoints_override_environment() {
		let config = MarketplaceConfig::builder(credentials())
			.environment(Environment::Sandbox)
			.search_endpoint("http://127.0.0.1:9000/search")
			.build()
			.expect("Configuration with overrides should build.");

		assert_eq!(config.endpoints.search.as_str(), "http://127.0.0.1:9000/search");
		assert_eq!(config.endpoints.auth.host_str(), Some("api.sandbox.ebay.com"));
	}

	#[test]
	fn unsupported_schemes_are_rejected() {
		let err = MarketplaceConfig::builder(credentials())
			.auth_endpoint("ftp://api.example.com/token")
			.build()
			.expect_err("FTP endpoint must be rejected.");

		assert!(matches!(err, ConfigError::UnsupportedScheme { endpoint: "auth", .. }));

		let err = MarketplaceConfig::builder(credentials())
			.image_search_endpoint("not a url")
			.build()
			.expect_err("Unparseable endpoint must be rejected.");

		assert!(matches!(err, ConfigError::InvalidEndpoint { endpoint: "image search", .. }));
	}

	#[test]
	fn lookup_requires_credentials_and_reads_overrides() {
		let missing = MarketplaceConfig::from_lookup(|_| None).expect_err("Credentials are required.");

		assert!(matches!(missing, ConfigError::MissingEnv { name: "EBAY_CLIENT_ID" }));

		let config = MarketplaceConfig::from_lookup(|name| match name {
			"EBAY_CLIENT_ID" => Some("app-id".into()),
			"EBAY_CLIENT_SECRET" => Some("app-secret".into()),
			"EBAY_ENVIRONMENT" => Some("Sandbox".into()),
			"EBAY_MARKETPLACE_ID" => Some("EBAY_DE".into()),
			_ => None,
		})
		.expect("Complete environment should build.");

		assert_eq!(config.credentials.client_id, "app-id");
		assert_eq!(config.endpoints.auth.host_str(), Some("api.sandbox.ebay.com"));
		assert_eq!(config.marketplace_id.as_ref(), "EBAY_DE");

		let invalid = MarketplaceConfig::from_lookup(|name| match name {
			"EBAY_ENVIRONMENT" => Some("staging".into()),
			_ => Some("value".into()),
		})
		.expect_err("Unknown environment should be rejected.");

		assert!(matches!(invalid, ConfigError::InvalidEnv { name: "EBAY_ENVIRONMENT", .. }));
	}
}
