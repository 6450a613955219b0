//! Candidate retrieval: one shared skeleton, one filter/query/ranking plan per strategy.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use basketry_domain::{
	band::{BandStrategy, compute_band},
	basket::BasketContext,
	filter::{MetricRange, RetrievalFilter, SectorClause},
	ranking::{Candidate, RankOrder, rank_by_metric},
	sector_graph::SectorGraph,
	security::{MetricField, Security},
	strategy::StrategyKind,
	vector,
};

use crate::{Error, Result, VectorIndex};

/// Metric the basket's band is computed from.
pub const BAND_SOURCE_FIELD: MetricField = MetricField::Volatility6;
/// Metric the band is applied to in the catalog.
pub const BAND_TARGET_FIELD: MetricField = MetricField::ImpliedVolatility12m;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecorrelationMode {
	ExcludeBasketSectors,
	CuratedGraph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankedQuery {
	Zero,
	Centroid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalSettings {
	pub top_k: u32,
	pub overfetch_factor: u32,
	pub decorrelation_mode: DecorrelationMode,
	pub ranked_query: RankedQuery,
}
impl RetrievalSettings {
	pub fn from_config(cfg: &basketry_config::Suggestions) -> Result<Self> {
		let decorrelation_mode = match cfg.decorrelation_mode.as_str() {
			"exclude_basket_sectors" => DecorrelationMode::ExcludeBasketSectors,
			"curated_graph" => DecorrelationMode::CuratedGraph,
			other =>
				return Err(Error::InvalidInput {
					message: format!("Unknown decorrelation mode {other:?}."),
				}),
		};
		let ranked_query = match cfg.ranked_query.as_str() {
			"zero" => RankedQuery::Zero,
			"centroid" => RankedQuery::Centroid,
			other =>
				return Err(Error::InvalidInput {
					message: format!("Unknown ranked query mode {other:?}."),
				}),
		};

		Ok(Self {
			top_k: cfg.top_k,
			overfetch_factor: cfg.overfetch_factor.max(1),
			decorrelation_mode,
			ranked_query,
		})
	}

	/// Index request size: enough head-room to drop every basket member and still fill `top_k`.
	pub fn overfetch(&self, top_k: usize, basket_len: usize) -> usize {
		top_k.saturating_mul(self.overfetch_factor as usize).saturating_add(basket_len)
	}
}
impl Default for RetrievalSettings {
	fn default() -> Self {
		Self {
			top_k: 10,
			overfetch_factor: 5,
			decorrelation_mode: DecorrelationMode::ExcludeBasketSectors,
			ranked_query: RankedQuery::Zero,
		}
	}
}

/// Read-only collaborators shared by every retrieval of one request.
pub struct Retriever<'a> {
	pub index: &'a dyn VectorIndex,
	pub graph: &'a SectorGraph,
	pub settings: &'a RetrievalSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalPlan {
	pub filter: RetrievalFilter,
	pub query: RankedQuery,
	pub ranking: Option<(MetricField, RankOrder)>,
}

impl Retriever<'_> {
	pub async fn retrieve(
		&self,
		strategy: StrategyKind,
		basket: &[Security],
		vector_dimension: usize,
		top_k: usize,
	) -> Result<Vec<Candidate>> {
		if basket.is_empty() {
			return Err(Error::InvalidInput { message: "Basket must not be empty.".to_string() });
		}
		if vector_dimension == 0 {
			return Err(Error::InvalidInput {
				message: "Vector dimension must be greater than zero.".to_string(),
			});
		}

		let ctx = BasketContext::new(basket)?;
		let Some(plan) = plan_for(strategy, &ctx, basket, self.graph, self.settings)? else {
			return Ok(Vec::new());
		};

		if top_k == 0 {
			return Ok(Vec::new());
		}

		let query_vector = match plan.query {
			RankedQuery::Zero => vec![0.0; vector_dimension],
			RankedQuery::Centroid => self.centroid(strategy, basket, vector_dimension).await?,
		};
		let limit = self.settings.overfetch(top_k, basket.len());
		let matches = self.index.query(&query_vector, &plan.filter, limit as u64).await?;
		let fetched = matches.len();
		let mut seen = HashSet::new();
		let mut candidates = matches
			.into_iter()
			.filter(|security| !ctx.contains_id(&security.id))
			.filter(|security| seen.insert(security.id.clone()))
			.map(Candidate::new)
			.collect::<Vec<_>>();

		if let Some((field, order)) = plan.ranking {
			rank_by_metric(&mut candidates, field, order);
		}

		candidates.truncate(top_k);

		info!(
			strategy = strategy.as_str(),
			requested = limit,
			fetched,
			returned = candidates.len(),
			"Candidate retrieval finished."
		);

		Ok(candidates)
	}

	async fn centroid(
		&self,
		strategy: StrategyKind,
		basket: &[Security],
		vector_dimension: usize,
	) -> Result<Vec<f32>> {
		let ids = basket.iter().map(|security| security.id.clone()).collect::<Vec<_>>();
		let stored = self.index.fetch_vectors(&ids).await?;

		if stored.is_empty() {
			warn!(
				strategy = strategy.as_str(),
				"No basket embeddings found in the catalog. Falling back to a metadata-only query."
			);

			return Ok(vec![0.0; vector_dimension]);
		}

		let vectors = stored.into_iter().map(|(_, vector)| vector).collect::<Vec<_>>();
		let centroid = vector::mean(&vectors)?;

		if centroid.len() != vector_dimension {
			return Err(Error::DimensionMismatch {
				expected: vector_dimension,
				found: centroid.len(),
			});
		}

		Ok(centroid)
	}
}

/// Builds the filter, query mode and ranking for `strategy`.
///
/// Returns `Ok(None)` when the reference member lacks a field the strategy filters on.
pub fn plan_for(
	strategy: StrategyKind,
	ctx: &BasketContext,
	basket: &[Security],
	graph: &SectorGraph,
	settings: &RetrievalSettings,
) -> Result<Option<RetrievalPlan>> {
	let reference = ctx.reference();
	let (Some(country), Some(sector)) = (reference.country(), reference.sector()) else {
		warn!(
			strategy = strategy.as_str(),
			security_id = reference.id.as_str(),
			"Reference security is missing country or sector. Returning no candidates."
		);

		return Ok(None);
	};

	debug!(strategy = strategy.as_str(), country, sector, "Planning retrieval.");

	let plan = match strategy {
		StrategyKind::Decorrelation => {
			let band = compute_band(basket, BAND_SOURCE_FIELD, BandStrategy::Decorrelation)?;
			let clause = match settings.decorrelation_mode {
				DecorrelationMode::ExcludeBasketSectors => SectorClause::Exclude(ctx.sectors().to_vec()),
				DecorrelationMode::CuratedGraph => {
					let sectors = graph.decorrelated_sectors(ctx.sectors().iter().map(String::as_str));

					if sectors.is_empty() {
						warn!(
							strategy = strategy.as_str(),
							sectors = ?ctx.sectors(),
							"No decorrelated sectors are known for the basket. Returning no candidates."
						);

						return Ok(None);
					}

					SectorClause::Include(sectors.into_iter().collect())
				},
			};

			if band.clamped {
				warn!(
					strategy = strategy.as_str(),
					lower = band.lower,
					upper = band.upper,
					"Volatility band was inverted and has been clamped."
				);
			}

			RetrievalPlan {
				filter: RetrievalFilter::for_country(country)
					.with_sectors(clause)
					.with_range(MetricRange::from_band(BAND_TARGET_FIELD, band)),
				query: RankedQuery::Zero,
				ranking: None,
			}
		},
		StrategyKind::SimilarVolatility => {
			let Some(sub_sector) = reference.sub_sector() else {
				warn!(
					strategy = strategy.as_str(),
					security_id = reference.id.as_str(),
					"Reference security is missing sub_sector. Returning no candidates."
				);

				return Ok(None);
			};

			if ctx.sub_sectors().len() > 1 {
				warn!(
					strategy = strategy.as_str(),
					sub_sectors = ?ctx.sub_sectors(),
					"Basket spans several sub-sectors. Filtering on the first member's sub-sector."
				);
			}

			let band = compute_band(basket, BAND_SOURCE_FIELD, BandStrategy::SimilarVolatility)?;

			if band.clamped {
				warn!(
					strategy = strategy.as_str(),
					lower = band.lower,
					upper = band.upper,
					"Volatility band was inverted and has been clamped."
				);
			}

			RetrievalPlan {
				filter: RetrievalFilter::for_country(country)
					.with_sub_sector(sub_sector)
					.with_range(MetricRange::from_band(BAND_TARGET_FIELD, band)),
				query: RankedQuery::Zero,
				ranking: None,
			}
		},
		StrategyKind::LowVolatilityRatio => RetrievalPlan {
			filter: RetrievalFilter::for_country(country)
				.with_sectors(SectorClause::Include(ctx.sectors().to_vec())),
			query: settings.ranked_query,
			ranking: Some((MetricField::Volatility52wHlRatio, RankOrder::Ascending)),
		},
		StrategyKind::LaggingPerformance => RetrievalPlan {
			filter: RetrievalFilter::for_country(country)
				.with_sectors(SectorClause::Include(ctx.sectors().to_vec())),
			query: settings.ranked_query,
			ranking: Some((MetricField::Price52wHlRatio, RankOrder::Ascending)),
		},
	};

	Ok(Some(plan))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn oil(id: &str, volatility_6: f64) -> Security {
		Security {
			id: id.to_string(),
			country: Some("US".to_string()),
			sector: Some("Energy".to_string()),
			sub_sector: Some("Oil".to_string()),
			volatility_6: Some(volatility_6),
			..Default::default()
		}
	}

	fn plan(
		strategy: StrategyKind,
		basket: &[Security],
		settings: &RetrievalSettings,
	) -> Option<RetrievalPlan> {
		let ctx = BasketContext::new(basket).expect("context failed");

		plan_for(strategy, &ctx, basket, &SectorGraph::builtin(), settings).expect("plan failed")
	}

	#[test]
	fn overfetch_adds_basket_size() {
		let settings = RetrievalSettings::default();

		assert_eq!(settings.overfetch(10, 3), 53);
		assert_eq!(settings.overfetch(1, 0), 5);
	}

	#[test]
	fn decorrelation_plan_excludes_basket_sectors_by_default() {
		let basket = [oil("1", 20.0), oil("2", 30.0)];
		let plan = plan(StrategyKind::Decorrelation, &basket, &RetrievalSettings::default())
			.expect("plan missing");
		let range = plan.filter.range().expect("range missing");

		assert_eq!(plan.filter.country(), "US");
		assert_eq!(plan.filter.sectors(), Some(&SectorClause::Exclude(vec!["Energy".to_string()])));
		assert_eq!(range.field, MetricField::ImpliedVolatility12m);
		assert_eq!((range.lower, range.upper), (24.0, 40.0));
		assert_eq!(plan.query, RankedQuery::Zero);
		assert!(plan.ranking.is_none());
	}

	#[test]
	fn curated_mode_uses_the_graph() {
		let basket = [oil("1", 20.0)];
		let settings = RetrievalSettings {
			decorrelation_mode: DecorrelationMode::CuratedGraph,
			..Default::default()
		};
		let plan = plan(StrategyKind::Decorrelation, &basket, &settings).expect("plan missing");
		let Some(SectorClause::Include(sectors)) = plan.filter.sectors() else {
			panic!("Expected an inclusion clause.");
		};

		assert!(sectors.contains(&"Health Care".to_string()));
		assert!(!sectors.contains(&"Energy".to_string()));
	}

	#[test]
	fn similar_volatility_plan_pins_sub_sector() {
		let basket = [oil("1", 20.0), oil("2", 30.0)];
		let plan = plan(StrategyKind::SimilarVolatility, &basket, &RetrievalSettings::default())
			.expect("plan missing");
		let range = plan.filter.range().expect("range missing");

		assert_eq!(plan.filter.sub_sector(), Some("Oil"));
		assert_eq!((range.lower, range.upper), (20.0, 40.0));
	}

	#[test]
	fn ranked_plans_follow_the_configured_query() {
		let basket = [oil("1", 20.0)];
		let settings = RetrievalSettings { ranked_query: RankedQuery::Centroid, ..Default::default() };
		let low = plan(StrategyKind::LowVolatilityRatio, &basket, &settings).expect("plan missing");
		let lagging = plan(StrategyKind::LaggingPerformance, &basket, &settings).expect("plan missing");

		assert_eq!(low.query, RankedQuery::Centroid);
		assert_eq!(low.ranking, Some((MetricField::Volatility52wHlRatio, RankOrder::Ascending)));
		assert_eq!(lagging.ranking, Some((MetricField::Price52wHlRatio, RankOrder::Ascending)));
		assert_eq!(low.filter.sectors(), Some(&SectorClause::Include(vec!["Energy".to_string()])));
	}

	#[test]
	fn missing_reference_country_yields_no_plan() {
		let mut first = oil("1", 20.0);

		first.country = None;

		let basket = [first, oil("2", 25.0)];

		assert!(plan(StrategyKind::LowVolatilityRatio, &basket, &RetrievalSettings::default()).is_none());
	}

	#[test]
	fn band_strategies_need_a_metric() {
		let mut member = oil("1", 20.0);

		member.volatility_6 = None;

		let ctx = BasketContext::new(std::slice::from_ref(&member)).expect("context failed");
		let err = plan_for(
			StrategyKind::Decorrelation,
			&ctx,
			std::slice::from_ref(&member),
			&SectorGraph::builtin(),
			&RetrievalSettings::default(),
		)
		.expect_err("expected NoValidMetric");

		assert_eq!(err, Error::NoValidMetric { field: "volatility_6" });
	}
}
