//! Shared fixtures for the marketplace integration tests.

#![allow(dead_code)]

// std
use std::{sync::Arc, time::Duration};
// crates.io
use httpmock::{Mock, prelude::*};
use parking_lot::Mutex;
// self
use market_scout::{
	auth::ClientCredentials,
	http::ReqwestTransport,
	marketplace::{MarketplaceClient, MarketplaceConfig, SleepFuture, Sleeper},
};

pub const CLIENT_ID: &str = "scout-id";
pub const CLIENT_SECRET: &str = "scout-secret";
// base64("scout-id:scout-secret")
pub const BASIC_AUTHORIZATION: &str = "Basic c2NvdXQtaWQ6c2NvdXQtc2VjcmV0";
pub const RATE_LIMITED_BODY: &str = "{\"errors\":[{\"errorId\":10001,\"domain\":\"ACCESS\",\"category\":\"REQUEST\",\"message\":\"The request limit has been reached for the resource.\"}]}";

/// Records every backoff and returns immediately.
#[derive(Debug, Default)]
pub struct RecordingSleeper(Mutex<Vec<Duration>>);
impl RecordingSleeper {
	pub fn waits_ms(&self) -> Vec<u128> {
		self.0.lock().iter().map(Duration::as_millis).collect()
	}
}
impl Sleeper for RecordingSleeper {
	fn sleep(&self, duration: Duration) -> SleepFuture<'_> {
		self.0.lock().push(duration);

		Box::pin(async {})
	}
}

pub fn config(server: &MockServer) -> MarketplaceConfig {
	MarketplaceConfig::builder(ClientCredentials::new(CLIENT_ID, CLIENT_SECRET))
		.auth_endpoint(server.url("/identity/v1/oauth2/token"))
		.search_endpoint(server.url("/buy/browse/v1/item_summary/search"))
		.image_search_endpoint(server.url("/buy/browse/v1/item_summary/search_by_image"))
		.build()
		.expect("Mock server configuration should build.")
}

pub fn client(server: &MockServer, sleeper: Arc<RecordingSleeper>) -> MarketplaceClient {
	MarketplaceClient::with_transport(config(server), Arc::new(ReqwestTransport::default()))
		.with_sleeper(sleeper)
}

pub async fn mock_token<'a>(server: &'a MockServer, token: &str, expires_in: i64) -> Mock<'a> {
	let body = format!(
		"{{\"access_token\":\"{token}\",\"expires_in\":{expires_in},\"token_type\":\"Application Access Token\"}}"
	);

	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/identity/v1/oauth2/token")
				.header("authorization", BASIC_AUTHORIZATION)
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200).header("content-type", "application/json").body(body);
		})
		.await
}
