//! Strategy kinds, structured-product types and the plans that map a basket shape to strategies.

use std::{collections::HashMap, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result, selector::BasketShape};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
	SimilarVolatility,
	Decorrelation,
	LowVolatilityRatio,
	LaggingPerformance,
}
impl StrategyKind {
	pub const ALL: [Self; 4] = [
		Self::SimilarVolatility,
		Self::Decorrelation,
		Self::LowVolatilityRatio,
		Self::LaggingPerformance,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::SimilarVolatility => "similar_volatility",
			Self::Decorrelation => "decorrelation",
			Self::LowVolatilityRatio => "low_volatility_ratio",
			Self::LaggingPerformance => "lagging_performance",
		}
	}

	pub fn section_title(self) -> &'static str {
		match self {
			Self::SimilarVolatility => "Optimal suggestions to improve Level",
			Self::Decorrelation => "Same country, improved decorrelation/volatility",
			Self::LowVolatilityRatio => "Similar underlyings with volatility lower than usual",
			Self::LaggingPerformance => "Similar underlyings with lagging performance",
		}
	}
}
impl fmt::Display for StrategyKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for StrategyKind {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		Self::ALL.into_iter().find(|kind| kind.as_str() == s).ok_or_else(|| Error::InvalidInput {
			message: format!("Unknown strategy {s:?}."),
		})
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
	#[default]
	PhoenixAutocall,
	ReverseConvertible,
}
impl ProductType {
	pub const ALL: [Self; 2] = [Self::PhoenixAutocall, Self::ReverseConvertible];

	/// Numeric identifier used by the product catalog.
	pub fn id(self) -> u32 {
		match self {
			Self::PhoenixAutocall => 2,
			Self::ReverseConvertible => 9,
		}
	}

	pub fn from_id(id: u32) -> Option<Self> {
		Self::ALL.into_iter().find(|product_type| product_type.id() == id)
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::PhoenixAutocall => "phoenix_autocall",
			Self::ReverseConvertible => "reverse_convertible",
		}
	}
}
impl fmt::Display for ProductType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for ProductType {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		let normalized = s.trim().replace('-', "_").to_ascii_lowercase();

		Self::ALL.into_iter().find(|product_type| product_type.as_str() == normalized).ok_or_else(
			|| Error::InvalidInput { message: format!("Unknown product type {s:?}.") },
		)
	}
}

/// Accepts the snake_case name, the CLI spelling or the numeric catalog id.
impl<'de> Deserialize<'de> for ProductType {
	fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum RawProductType {
			Id(u32),
			Name(String),
		}

		match RawProductType::deserialize(deserializer)? {
			RawProductType::Id(id) => Self::from_id(id).ok_or_else(|| {
				serde::de::Error::custom(format!("Unknown product type id {id}."))
			}),
			RawProductType::Name(name) => name.parse().map_err(serde::de::Error::custom),
		}
	}
}

/// Ordered strategies activated for each basket shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyPlan {
	pub same_sub_sector: Vec<StrategyKind>,
	pub different_sub_sector: Vec<StrategyKind>,
}
impl StrategyPlan {
	pub fn strategies_for(&self, shape: BasketShape) -> &[StrategyKind] {
		match shape {
			BasketShape::SameSubSector => &self.same_sub_sector,
			BasketShape::DifferentSubSector => &self.different_sub_sector,
		}
	}
}
impl Default for StrategyPlan {
	fn default() -> Self {
		Self {
			same_sub_sector: vec![StrategyKind::SimilarVolatility],
			different_sub_sector: vec![
				StrategyKind::Decorrelation,
				StrategyKind::LowVolatilityRatio,
			],
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanBook {
	plans: HashMap<ProductType, StrategyPlan>,
}
impl PlanBook {
	/// Only Phoenix Autocall has suggestions out of the box.
	pub fn builtin() -> Self {
		Self::default().with_plan(ProductType::PhoenixAutocall, StrategyPlan::default())
	}

	pub fn with_plan(mut self, product_type: ProductType, plan: StrategyPlan) -> Self {
		self.plans.insert(product_type, plan);

		self
	}

	pub fn get(&self, product_type: ProductType) -> Option<&StrategyPlan> {
		self.plans.get(&product_type)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn product_ids_match_catalog() {
		assert_eq!(ProductType::PhoenixAutocall.id(), 2);
		assert_eq!(ProductType::from_id(9), Some(ProductType::ReverseConvertible));
		assert_eq!(ProductType::from_id(3), None);
	}

	#[test]
	fn product_type_deserializes_from_name_or_catalog_id() {
		let parsed: Vec<ProductType> =
			serde_json::from_value(serde_json::json!(["phoenix_autocall", 9, "reverse-convertible"]))
				.expect("parse failed");

		assert_eq!(
			parsed,
			vec![
				ProductType::PhoenixAutocall,
				ProductType::ReverseConvertible,
				ProductType::ReverseConvertible
			]
		);
		assert!(serde_json::from_value::<ProductType>(serde_json::json!(3)).is_err());
		assert!(serde_json::from_value::<ProductType>(serde_json::json!("warrant")).is_err());
	}

	#[test]
	fn product_type_parses_cli_spelling() {
		assert_eq!("reverse-convertible".parse::<ProductType>(), Ok(ProductType::ReverseConvertible));
		assert!("warrant".parse::<ProductType>().is_err());
	}

	#[test]
	fn builtin_plan_book_covers_phoenix_only() {
		let book = PlanBook::builtin();
		let plan = book.get(ProductType::PhoenixAutocall).expect("phoenix plan missing");

		assert_eq!(plan.strategies_for(BasketShape::SameSubSector), [StrategyKind::SimilarVolatility]);
		assert_eq!(
			plan.strategies_for(BasketShape::DifferentSubSector),
			[StrategyKind::Decorrelation, StrategyKind::LowVolatilityRatio]
		);
		assert!(book.get(ProductType::ReverseConvertible).is_none());
	}

	#[test]
	fn strategy_names_parse() {
		for kind in StrategyKind::ALL {
			assert_eq!(kind.as_str().parse::<StrategyKind>(), Ok(kind));
		}
	}
}
