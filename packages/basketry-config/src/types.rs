use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use serde_json::{Map, Value};

pub const PRODUCT_TYPES: [&str; 2] = ["phoenix_autocall", "reverse_convertible"];
pub const STRATEGIES: [&str; 4] =
	["similar_volatility", "decorrelation", "low_volatility_ratio", "lagging_performance"];

#[derive(Debug, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub service: Service,
	pub catalog: Catalog,
	pub providers: Providers,
	#[serde(default)]
	pub suggestions: Suggestions,
	#[serde(default)]
	pub sectors: Sectors,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Service {
	pub log_level: String,
}
impl Default for Service {
	fn default() -> Self {
		Self { log_level: "info".to_string() }
	}
}

/// Connection to the pre-populated security catalog.
#[derive(Debug, Deserialize)]
pub struct Catalog {
	pub url: String,
	pub collection: String,
	pub vector_dim: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub explanation: LlmProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	#[serde(default = "default_max_tokens")]
	pub max_tokens: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Suggestions {
	pub top_k: u32,
	pub overfetch_factor: u32,
	/// Either "exclude_basket_sectors" or "curated_graph".
	pub decorrelation_mode: String,
	/// Either "zero" or "centroid". Applies to the metric-ranked strategies only.
	pub ranked_query: String,
	pub explain: bool,
	/// Keyed by product type, e.g. "phoenix_autocall". Entries replace the built-in plan for
	/// that product type; product types left out keep theirs.
	pub plans: BTreeMap<String, StrategyPlan>,
}
impl Default for Suggestions {
	fn default() -> Self {
		Self {
			top_k: 10,
			overfetch_factor: 5,
			decorrelation_mode: "exclude_basket_sectors".to_string(),
			ranked_query: "zero".to_string(),
			explain: true,
			plans: BTreeMap::new(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct StrategyPlan {
	pub same_sub_sector: Vec<String>,
	pub different_sub_sector: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Sectors {
	/// Replaces the built-in decorrelation graph when present.
	pub decorrelations: Option<HashMap<String, Vec<String>>>,
}

fn default_max_tokens() -> u32 {
	500
}
