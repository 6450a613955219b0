use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use basketry_domain::{
	ranking::Candidate,
	security::Security,
	selector::{BasketShape, select_shape},
	strategy::{ProductType, StrategyKind},
};

use crate::{
	Error, Result, SuggestionService,
	explain::{
		self, EXPLANATIONS_DISABLED_TEXT, FALLBACK_TEXT, NO_CANDIDATES_TEXT, RETRIEVAL_FAILED_TEXT,
	},
	retrieval::Retriever,
};

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestRequest {
	#[serde(default)]
	pub product_type: ProductType,
	pub selected_stocks: Vec<Security>,
	/// Overrides `suggestions.top_k` for this request.
	#[serde(default)]
	pub top_k: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestResponse {
	pub product_type: ProductType,
	pub shape: BasketShape,
	pub outcomes: Vec<StrategyOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OutcomeStatus {
	Ok,
	/// Nothing matched, or the basket had no usable metric for this strategy.
	Empty,
	/// Retrieval failed, or the explanation did and the candidates are kept with the fallback text.
	Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct StrategyOutcome {
	pub strategy: StrategyKind,
	pub section_title: String,
	pub candidates: Vec<Candidate>,
	pub explanation: String,
	pub status: OutcomeStatus,
}
impl StrategyOutcome {
	fn new(
		strategy: StrategyKind,
		candidates: Vec<Candidate>,
		explanation: impl Into<String>,
		status: OutcomeStatus,
	) -> Self {
		Self {
			strategy,
			section_title: strategy.section_title().to_string(),
			candidates,
			explanation: explanation.into(),
			status,
		}
	}
}

impl SuggestionService {
	/// Runs every strategy activated for the basket concurrently and returns their outcomes in
	/// activation order. Only an invalid basket fails the whole request.
	pub async fn build_suggestions(&self, req: &SuggestRequest) -> Result<SuggestResponse> {
		let basket = req.selected_stocks.as_slice();
		let shape = select_shape(basket)?;

		if req.top_k == Some(0) {
			return Err(Error::InvalidInput { message: "top_k must be greater than zero.".to_string() });
		}

		let Some(plan) = self.plans.get(req.product_type) else {
			warn!(
				product_type = req.product_type.as_str(),
				"No strategy plan is configured for this product type. Returning no suggestions."
			);

			return Ok(SuggestResponse {
				product_type: req.product_type,
				shape,
				outcomes: Vec::new(),
			});
		};
		let strategies = plan.strategies_for(shape);
		let top_k = req.top_k.unwrap_or(self.settings.top_k) as usize;

		info!(
			product_type = req.product_type.as_str(),
			shape = shape.as_str(),
			basket_len = basket.len(),
			strategies = ?strategies,
			top_k,
			"Building suggestions."
		);

		let outcomes = futures::future::join_all(
			strategies.iter().map(|strategy| self.run_strategy(*strategy, basket, top_k)),
		)
		.await;

		Ok(SuggestResponse { product_type: req.product_type, shape, outcomes })
	}

	/// Like [`Self::build_suggestions`], abandoning every in-flight query and explanation call
	/// once `cancel` fires.
	pub async fn build_suggestions_with_cancel(
		&self,
		req: &SuggestRequest,
		cancel: &CancellationToken,
	) -> Result<SuggestResponse> {
		tokio::select! {
			biased;
			_ = cancel.cancelled() => {
				warn!("Suggestion request cancelled.");

				Err(Error::Cancelled)
			},
			res = self.build_suggestions(req) => res,
		}
	}

	async fn run_strategy(
		&self,
		strategy: StrategyKind,
		basket: &[Security],
		top_k: usize,
	) -> StrategyOutcome {
		let retriever = Retriever {
			index: self.index.as_ref(),
			graph: self.graph.as_ref(),
			settings: &self.settings,
		};
		let vector_dimension = self.cfg.catalog.vector_dim as usize;

		match retriever.retrieve(strategy, basket, vector_dimension, top_k).await {
			Ok(candidates) if candidates.is_empty() =>
				StrategyOutcome::new(strategy, candidates, NO_CANDIDATES_TEXT, OutcomeStatus::Empty),
			Ok(candidates) => match self.explain(strategy, basket, &candidates).await {
				Ok(explanation) =>
					StrategyOutcome::new(strategy, candidates, explanation, OutcomeStatus::Ok),
				Err(err) => {
					warn!(
						strategy = strategy.as_str(),
						error = %err,
						"Explanation generation failed. Using fallback text."
					);

					StrategyOutcome::new(
						strategy,
						candidates,
						FALLBACK_TEXT,
						OutcomeStatus::Failed { error: err.to_string() },
					)
				},
			},
			Err(err @ Error::NoValidMetric { .. }) => {
				warn!(
					strategy = strategy.as_str(),
					error = %err,
					"Strategy has no usable basket metric."
				);

				StrategyOutcome::new(strategy, Vec::new(), NO_CANDIDATES_TEXT, OutcomeStatus::Empty)
			},
			Err(err) => {
				warn!(strategy = strategy.as_str(), error = %err, "Strategy retrieval failed.");

				StrategyOutcome::new(
					strategy,
					Vec::new(),
					RETRIEVAL_FAILED_TEXT,
					OutcomeStatus::Failed { error: err.to_string() },
				)
			},
		}
	}

	async fn explain(
		&self,
		strategy: StrategyKind,
		basket: &[Security],
		candidates: &[Candidate],
	) -> Result<String> {
		if !self.cfg.suggestions.explain {
			return Ok(EXPLANATIONS_DISABLED_TEXT.to_string());
		}

		let messages = explain::build_messages(strategy, basket, candidates)?;

		Ok(self.providers.explanation.explain(&self.cfg.providers.explanation, &messages).await?)
	}
}
