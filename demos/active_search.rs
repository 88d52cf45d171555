//! Runs a keyword search against a local mock of the marketplace token and Browse endpoints
//! and prints the price summary.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use market_scout::{
	auth::ClientCredentials,
	http::ReqwestTransport,
	marketplace::{MarketplaceClient, MarketplaceConfig, SearchOptions},
	reqwest::Client,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/identity/v1/oauth2/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"Application Access Token\",\"expires_in\":7200}",
			);
		})
		.await;
	let search_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/buy/browse/v1/item_summary/search").query_param("q", "polaroid sx-70");
			then.status(200).header("content-type", "application/json").body(
				"{\"total\":3,\"itemSummaries\":[\
				{\"itemId\":\"v1|1|0\",\"price\":{\"value\":\"120.00\",\"currency\":\"USD\"}},\
				{\"itemId\":\"v1|2|0\",\"price\":{\"value\":\"185.50\",\"currency\":\"USD\"}},\
				{\"itemId\":\"v1|3|0\",\"price\":{\"value\":\"99.99\",\"currency\":\"USD\"}}]}",
			);
		})
		.await;
	let config = MarketplaceConfig::builder(ClientCredentials::new("demo-client", "demo-secret"))
		.auth_endpoint(server.url("/identity/v1/oauth2/token"))
		.search_endpoint(server.url("/buy/browse/v1/item_summary/search"))
		.build()?;
	let transport = ReqwestTransport::with_client(Client::builder().build()?);
	let client = MarketplaceClient::with_transport(config, Arc::new(transport));
	let summary = client.search_active("polaroid sx-70", SearchOptions::new().with_limit(50)).await?;

	println!(
		"{} listings, average {}, range {} to {}.",
		summary.total_count, summary.average_price, summary.lowest_price, summary.highest_price
	);

	token_mock.assert_async().await;
	search_mock.assert_async().await;

	Ok(())
}
