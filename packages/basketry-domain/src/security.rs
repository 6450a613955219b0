//! Security records as supplied by the upstream extraction layer and as stored in the catalog.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// A catalog security.
///
/// Every numeric metric is optional. An absent metric means "unknown" and is never treated as
/// zero. Metadata keys that have no dedicated field are kept in `extra` so that catalog records
/// round-trip without loss.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Security {
	#[serde(deserialize_with = "deserialize_id")]
	pub id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub ticker: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub country: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sector: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sub_sector: Option<String>,
	#[serde(
		default,
		deserialize_with = "deserialize_metric",
		skip_serializing_if = "Option::is_none"
	)]
	pub volatility_6: Option<f64>,
	#[serde(
		default,
		deserialize_with = "deserialize_metric",
		skip_serializing_if = "Option::is_none"
	)]
	pub volatility_12: Option<f64>,
	#[serde(
		default,
		deserialize_with = "deserialize_metric",
		skip_serializing_if = "Option::is_none"
	)]
	pub implied_volatility_12m: Option<f64>,
	#[serde(
		default,
		deserialize_with = "deserialize_metric",
		skip_serializing_if = "Option::is_none"
	)]
	pub price_52w_hl_ratio: Option<f64>,
	#[serde(
		default,
		deserialize_with = "deserialize_metric",
		skip_serializing_if = "Option::is_none"
	)]
	pub volatility_52w_hl_ratio: Option<f64>,
	#[serde(
		default,
		deserialize_with = "deserialize_metric",
		skip_serializing_if = "Option::is_none"
	)]
	pub perf_3m: Option<f64>,
	#[serde(
		default,
		deserialize_with = "deserialize_metric",
		skip_serializing_if = "Option::is_none"
	)]
	pub market_cap_usd: Option<f64>,
	#[serde(
		default,
		deserialize_with = "deserialize_metric",
		skip_serializing_if = "Option::is_none"
	)]
	pub dividend_yield_12m: Option<f64>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}
impl Security {
	pub fn country(&self) -> Option<&str> {
		non_blank(self.country.as_deref())
	}

	pub fn sector(&self) -> Option<&str> {
		non_blank(self.sector.as_deref())
	}

	pub fn sub_sector(&self) -> Option<&str> {
		non_blank(self.sub_sector.as_deref())
	}

	pub fn metric(&self, field: MetricField) -> Option<f64> {
		let value = match field {
			MetricField::Volatility6 => self.volatility_6,
			MetricField::Volatility12 => self.volatility_12,
			MetricField::ImpliedVolatility12m => self.implied_volatility_12m,
			MetricField::Price52wHlRatio => self.price_52w_hl_ratio,
			MetricField::Volatility52wHlRatio => self.volatility_52w_hl_ratio,
			MetricField::Perf3m => self.perf_3m,
			MetricField::MarketCapUsd => self.market_cap_usd,
			MetricField::DividendYield12m => self.dividend_yield_12m,
		};

		value.filter(|value| value.is_finite())
	}

	pub fn display_name(&self) -> &str {
		non_blank(self.name.as_deref())
			.or_else(|| non_blank(self.ticker.as_deref()))
			.unwrap_or(self.id.as_str())
	}
}

/// Numeric metadata fields known to the engine. `as_str` is the catalog payload key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricField {
	#[serde(rename = "volatility_6")]
	Volatility6,
	#[serde(rename = "volatility_12")]
	Volatility12,
	#[serde(rename = "implied_volatility_12m")]
	ImpliedVolatility12m,
	#[serde(rename = "price_52w_hl_ratio")]
	Price52wHlRatio,
	#[serde(rename = "volatility_52w_hl_ratio")]
	Volatility52wHlRatio,
	#[serde(rename = "perf_3m")]
	Perf3m,
	MarketCapUsd,
	#[serde(rename = "dividend_yield_12m")]
	DividendYield12m,
}
impl MetricField {
	pub const ALL: [Self; 8] = [
		Self::Volatility6,
		Self::Volatility12,
		Self::ImpliedVolatility12m,
		Self::Price52wHlRatio,
		Self::Volatility52wHlRatio,
		Self::Perf3m,
		Self::MarketCapUsd,
		Self::DividendYield12m,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Volatility6 => "volatility_6",
			Self::Volatility12 => "volatility_12",
			Self::ImpliedVolatility12m => "implied_volatility_12m",
			Self::Price52wHlRatio => "price_52w_hl_ratio",
			Self::Volatility52wHlRatio => "volatility_52w_hl_ratio",
			Self::Perf3m => "perf_3m",
			Self::MarketCapUsd => "market_cap_usd",
			Self::DividendYield12m => "dividend_yield_12m",
		}
	}
}
impl fmt::Display for MetricField {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for MetricField {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		Self::ALL.into_iter().find(|field| field.as_str() == s).ok_or_else(|| Error::InvalidInput {
			message: format!("Unknown metric field {s:?}."),
		})
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
	Text(String),
	Signed(i64),
	Unsigned(u64),
	Float(f64),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMetric {
	Number(f64),
	Text(String),
	Other(Value),
}
impl RawMetric {
	fn into_f64(self) -> Option<f64> {
		let value = match self {
			Self::Number(value) => value,
			Self::Text(text) => text.trim().parse::<f64>().ok()?,
			Self::Other(_) => return None,
		};

		value.is_finite().then_some(value)
	}
}

/// Ids arrive as strings or integers; membership checks always compare the string form.
pub fn normalize_id(raw: &Value) -> Option<String> {
	match raw {
		Value::String(text) => Some(text.trim().to_string()).filter(|text| !text.is_empty()),
		Value::Number(number) =>
			if let Some(value) = number.as_u64() {
				Some(value.to_string())
			} else if let Some(value) = number.as_i64() {
				Some(value.to_string())
			} else {
				number.as_f64().map(format_float_id)
			},
		_ => None,
	}
}

fn format_float_id(value: f64) -> String {
	if value.fract() == 0.0 && value.abs() < 9.0e15 {
		(value as i64).to_string()
	} else {
		value.to_string()
	}
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	let id = match RawId::deserialize(deserializer)? {
		RawId::Text(text) => text.trim().to_string(),
		RawId::Signed(value) => value.to_string(),
		RawId::Unsigned(value) => value.to_string(),
		RawId::Float(value) => format_float_id(value),
	};

	if id.is_empty() {
		return Err(serde::de::Error::custom("Security id must be non-empty."));
	}

	Ok(id)
}

fn deserialize_metric<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(Option::<RawMetric>::deserialize(deserializer)?.and_then(RawMetric::into_f64))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
	value.map(str::trim).filter(|value| !value.is_empty())
}
