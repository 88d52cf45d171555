//! Listing items and the price summary folded from a search page.
//!
//! Items are kept as the raw JSON objects the marketplace returned; only `price.value`
//! is read. Prices that do not parse as decimals are skipped instead of failing the
//! summary, and a page without any usable price reports zero for every statistic.

// crates.io
use rust_decimal::RoundingStrategy;
use serde_json::Value;
// self
use crate::_prelude::*;

/// Number of decimal places kept for the average price.
pub const AVERAGE_PRICE_SCALE: u32 = 2;

/// One listing returned by the marketplace, passed through unmodified.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchItem(Value);
impl SearchItem {
	/// Wraps a raw JSON listing.
	pub fn from_json(value: Value) -> Self {
		Self(value)
	}

	/// Borrows the raw JSON listing.
	pub fn as_json(&self) -> &Value {
		&self.0
	}

	/// Consumes the item and returns the raw JSON listing.
	pub fn into_json(self) -> Value {
		self.0
	}

	/// Parses `price.value`, accepting either a string or a JSON number.
	pub fn price(&self) -> Option<Decimal> {
		match self.0.get("price")?.get("value")? {
			Value::String(raw) => parse_decimal(raw),
			Value::Number(number) => parse_decimal(&number.to_string()),
			_ => None,
		}
	}

	/// Returns `price.currency` when present.
	pub fn currency(&self) -> Option<&str> {
		self.0.get("price")?.get("currency")?.as_str()
	}

	/// Returns the marketplace item identifier when present.
	pub fn item_id(&self) -> Option<&str> {
		self.0.get("itemId")?.as_str()
	}
}

/// Aggregate statistics over the parseable prices of a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PriceStats {
	/// Mean price rounded to [`AVERAGE_PRICE_SCALE`] places.
	pub average: Decimal,
	/// Highest parseable price.
	pub highest: Decimal,
	/// Lowest parseable price.
	pub lowest: Decimal,
	/// Number of prices that took part in the aggregation.
	pub priced: usize,
}
impl PriceStats {
	/// Folds an iterator of prices; zero everywhere when it is empty.
	pub fn from_prices<I>(prices: I) -> Self
	where
		I: IntoIterator<Item = Decimal>,
	{
		let prices = prices.into_iter().collect::<Vec<_>>();
		let priced = prices.len();
		let mut bounds: Option<(Decimal, Decimal)> = None;

		for &price in &prices {
			bounds = Some(match bounds {
				Some((low, high)) => (low.min(price), high.max(price)),
				None => (price, price),
			});
		}

		let Some((lowest, highest)) = bounds else {
			return Self {
				average: Decimal::ZERO,
				highest: Decimal::ZERO,
				lowest: Decimal::ZERO,
				priced: 0,
			};
		};
		let mut average = mean(&prices)
			.round_dp_with_strategy(AVERAGE_PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);

		average.rescale(AVERAGE_PRICE_SCALE);

		Self { average, highest, lowest, priced }
	}

	/// Folds the parseable prices of `items`.
	pub fn from_items(items: &[SearchItem]) -> Self {
		Self::from_prices(items.iter().filter_map(SearchItem::price))
	}
}

// Exact mean when the sum fits; otherwise a running mean whose intermediates stay within
// the price range. A price that still overflows is left out of the average.
fn mean(prices: &[Decimal]) -> Decimal {
	if let Some(sum) = prices.iter().try_fold(Decimal::ZERO, |sum, price| sum.checked_add(*price)) {
		return sum / Decimal::from(prices.len());
	}

	let mut mean = Decimal::ZERO;

	for (seen, price) in prices.iter().enumerate() {
		let next = Decimal::from(seen + 1);

		mean = (mean / next)
			.checked_mul(Decimal::from(seen))
			.and_then(|kept| kept.checked_add(*price / next))
			.unwrap_or(mean);
	}

	mean
}

/// Aggregated view of one search call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSummary {
	/// Total reported by the marketplace, independent of how many prices parsed.
	pub total_count: u64,
	/// Mean of the parseable prices, two decimal places.
	pub average_price: Decimal,
	/// Highest parseable price.
	pub highest_price: Decimal,
	/// Lowest parseable price.
	pub lowest_price: Decimal,
	/// Raw listings in marketplace order.
	pub items: Vec<SearchItem>,
}
impl SearchSummary {
	/// Builds a summary from the upstream total and the raw listing page.
	pub fn from_page(total_count: u64, items: Vec<SearchItem>) -> Self {
		let stats = PriceStats::from_items(&items);

		Self {
			total_count,
			average_price: stats.average,
			highest_price: stats.highest,
			lowest_price: stats.lowest,
			items,
		}
	}
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
	let trimmed = raw.trim();

	Decimal::from_str(trimmed).ok().or_else(|| Decimal::from_scientific(trimmed).ok())
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn item(price: Value) -> SearchItem {
		SearchItem::from_json(json!({ "itemId": "v1|1|0", "price": { "value": price, "currency": "USD" } }))
	}

	#[test]
	fn mixed_prices_skip_unparseable_values() {
		let items = vec![item(json!("100.00")), item(json!("200.00")), item(json!("bad"))];
		let summary = SearchSummary::from_page(50, items.clone());

		assert_eq!(summary.total_count, 50);
		assert_eq!(summary.average_price.to_string(), "150.00");
		assert_eq!(summary.highest_price.to_string(), "200.00");
		assert_eq!(summary.lowest_price.to_string(), "100.00");
		assert_eq!(summary.items, items);
	}

	#[test]
	fn prices_near_decimal_limit_do_not_overflow() {
		let max = Decimal::MAX.to_string();
		let summary = SearchSummary::from_page(2, vec![item(json!(max)), item(json!(max))]);

		assert_eq!(summary.highest_price, Decimal::MAX);
		assert_eq!(summary.lowest_price, Decimal::MAX);
		assert_eq!(summary.average_price.trunc(), Decimal::MAX);

		let mixed = PriceStats::from_prices([Decimal::MAX, Decimal::ONE, Decimal::MAX]);

		assert_eq!(mixed.priced, 3);
		assert!(mixed.average > Decimal::ONE);
		assert!(mixed.average <= Decimal::MAX);
	}

	#[test]
	fn empty_page_reports_zero_everywhere() {
		let summary = SearchSummary::from_page(0, Vec::new());

		assert_eq!(summary.total_count, 0);
		assert_eq!(summary.average_price, Decimal::ZERO);
		assert_eq!(summary.highest_price, Decimal::ZERO);
		assert_eq!(summary.lowest_price, Decimal::ZERO);
	}

	#[test]
	fn all_unparseable_prices_keep_upstream_total() {
		let items = vec![
			item(json!("n/a")),
			item(Value::Null),
			SearchItem::from_json(json!({ "itemId": "v1|2|0" })),
		];
		let summary = SearchSummary::from_page(12, items);

		assert_eq!(summary.total_count, 12);
		assert_eq!(summary.average_price, Decimal::ZERO);
		assert_eq!(summary.highest_price, Decimal::ZERO);
		assert_eq!(summary.lowest_price, Decimal::ZERO);
		assert_eq!(summary.items.len(), 3);
	}

	#[test]
	fn average_is_rounded_and_bounded() {
		let prices = ["10.00", "10.00", "10.01"].map(|raw| item(json!(raw)));
		let stats = PriceStats::from_items(&prices);

		// 30.01 / 3 = 10.00333...
		assert_eq!(stats.average.to_string(), "10.00");
		assert!(stats.average >= stats.lowest && stats.average <= stats.highest);
		assert_eq!(stats.priced, 3);
	}

	#[test]
	fn numeric_and_padded_prices_are_accepted() {
		let numeric = item(json!(19.5));
		let padded = item(json!(" 42.10 "));

		assert_eq!(numeric.price(), Some(Decimal::new(195, 1)));
		assert_eq!(padded.price(), Some(Decimal::new(4210, 2)));
		assert_eq!(numeric.currency(), Some("USD"));
		assert_eq!(numeric.item_id(), Some("v1|1|0"));
	}

	#[test]
	fn summary_serializes_camel_case_with_string_prices() {
		let summary = SearchSummary::from_page(2, vec![item(json!("5.25")), item(json!("4.75"))]);
		let encoded = serde_json::to_value(&summary).expect("Summary should serialize to JSON.");

		assert_eq!(encoded["totalCount"], json!(2));
		assert_eq!(encoded["averagePrice"], json!("5.00"));
		assert_eq!(encoded["highestPrice"], json!("5.25"));
		assert_eq!(encoded["lowestPrice"], json!("4.75"));
		assert_eq!(encoded["items"][0]["price"]["value"], json!("5.25"));
	}
}
