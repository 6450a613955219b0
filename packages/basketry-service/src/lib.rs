pub mod explain;
pub mod retrieval;
pub mod suggest;

mod error;

pub use error::{Error, Result};
pub use retrieval::{DecorrelationMode, RankedQuery, RetrievalSettings};
pub use suggest::{OutcomeStatus, StrategyOutcome, SuggestRequest, SuggestResponse};

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

use basketry_config::{Config, LlmProviderConfig};
use basketry_domain::{
	filter::RetrievalFilter,
	sector_graph::SectorGraph,
	security::Security,
	strategy::{PlanBook, ProductType, StrategyKind, StrategyPlan},
};
use basketry_providers::chat;
use basketry_storage::qdrant::QdrantStore;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Similarity-searchable catalog keyed by security id.
pub trait VectorIndex
where
	Self: Send + Sync,
{
	/// Up to `limit` records matching `filter`, nearest to `vector` first. A zero vector means
	/// metadata-only retrieval.
	fn query<'a>(
		&'a self,
		vector: &'a [f32],
		filter: &'a RetrievalFilter,
		limit: u64,
	) -> BoxFuture<'a, Result<Vec<Security>>>;

	/// Stored embeddings for the given ids. Unknown ids are omitted.
	fn fetch_vectors<'a>(
		&'a self,
		ids: &'a [String],
	) -> BoxFuture<'a, Result<Vec<(String, Vec<f32>)>>>;
}

pub trait ExplanationProvider
where
	Self: Send + Sync,
{
	fn explain<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, basketry_providers::Result<String>>;
}

#[derive(Clone)]
pub struct Providers {
	pub explanation: Arc<dyn ExplanationProvider>,
}
impl Providers {
	pub fn new(explanation: Arc<dyn ExplanationProvider>) -> Self {
		Self { explanation }
	}
}
impl Default for Providers {
	fn default() -> Self {
		Self { explanation: Arc::new(DefaultProviders) }
	}
}

pub struct SuggestionService {
	pub cfg: Config,
	pub index: Arc<dyn VectorIndex>,
	pub providers: Providers,
	pub graph: Arc<SectorGraph>,
	pub plans: PlanBook,
	pub settings: RetrievalSettings,
}
impl SuggestionService {
	pub fn new(cfg: Config, index: Arc<dyn VectorIndex>) -> Result<Self> {
		Self::with_providers(cfg, index, Providers::default())
	}

	pub fn with_providers(
		cfg: Config,
		index: Arc<dyn VectorIndex>,
		providers: Providers,
	) -> Result<Self> {
		let graph = match cfg.sectors.decorrelations.as_ref() {
			Some(edges) => SectorGraph::from_edges(edges.clone()),
			None => SectorGraph::builtin(),
		};
		let plans = plan_book(&cfg)?;
		let settings = RetrievalSettings::from_config(&cfg.suggestions)?;

		Ok(Self { cfg, index, providers, graph: Arc::new(graph), plans, settings })
	}
}

struct DefaultProviders;

impl ExplanationProvider for DefaultProviders {
	fn explain<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, basketry_providers::Result<String>> {
		Box::pin(chat::complete(cfg, messages))
	}
}

impl VectorIndex for QdrantStore {
	fn query<'a>(
		&'a self,
		vector: &'a [f32],
		filter: &'a RetrievalFilter,
		limit: u64,
	) -> BoxFuture<'a, Result<Vec<Security>>> {
		Box::pin(async move { Ok(QdrantStore::query(self, vector, filter, limit).await?) })
	}

	fn fetch_vectors<'a>(
		&'a self,
		ids: &'a [String],
	) -> BoxFuture<'a, Result<Vec<(String, Vec<f32>)>>> {
		Box::pin(async move { Ok(QdrantStore::fetch_vectors(self, ids).await?) })
	}
}

fn plan_book(cfg: &Config) -> Result<PlanBook> {
	let mut book = PlanBook::builtin();

	for (product_type, plan) in &cfg.suggestions.plans {
		let product_type = product_type.parse::<ProductType>()?;
		let plan = StrategyPlan {
			same_sub_sector: parse_strategies(&plan.same_sub_sector)?,
			different_sub_sector: parse_strategies(&plan.different_sub_sector)?,
		};

		book = book.with_plan(product_type, plan);
	}

	Ok(book)
}

fn parse_strategies(names: &[String]) -> Result<Vec<StrategyKind>> {
	names.iter().map(|name| name.parse::<StrategyKind>().map_err(Error::from)).collect()
}
