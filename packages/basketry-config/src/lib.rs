mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Catalog, Config, LlmProviderConfig, PRODUCT_TYPES, Providers, STRATEGIES, Sectors, Service,
	StrategyPlan, Suggestions,
};

use std::{collections::HashSet, fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let cfg = parse(path)?;

	validate(&cfg)?;

	Ok(cfg)
}

/// Reads and normalizes `path` without validating, so callers can apply overrides first.
pub fn parse(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.catalog.url.trim().is_empty() {
		return Err(Error::Validation { message: "catalog.url must be non-empty.".to_string() });
	}
	if cfg.catalog.collection.trim().is_empty() {
		return Err(Error::Validation {
			message: "catalog.collection must be non-empty.".to_string(),
		});
	}
	if cfg.catalog.vector_dim == 0 {
		return Err(Error::Validation {
			message: "catalog.vector_dim must be greater than zero.".to_string(),
		});
	}

	validate_suggestions(cfg)?;
	validate_explanation(cfg)?;
	validate_sectors(cfg)?;

	Ok(())
}

fn validate_suggestions(cfg: &Config) -> Result<()> {
	let suggestions = &cfg.suggestions;

	if suggestions.top_k == 0 {
		return Err(Error::Validation {
			message: "suggestions.top_k must be greater than zero.".to_string(),
		});
	}
	if suggestions.overfetch_factor == 0 {
		return Err(Error::Validation {
			message: "suggestions.overfetch_factor must be at least 1.".to_string(),
		});
	}
	if !matches!(suggestions.decorrelation_mode.as_str(), "exclude_basket_sectors" | "curated_graph")
	{
		return Err(Error::Validation {
			message:
				"suggestions.decorrelation_mode must be one of exclude_basket_sectors or curated_graph."
					.to_string(),
		});
	}
	if !matches!(suggestions.ranked_query.as_str(), "zero" | "centroid") {
		return Err(Error::Validation {
			message: "suggestions.ranked_query must be one of zero or centroid.".to_string(),
		});
	}

	for (product_type, plan) in &suggestions.plans {
		if !PRODUCT_TYPES.contains(&product_type.as_str()) {
			return Err(Error::UnknownProductType { product_type: product_type.clone() });
		}

		for (shape, strategies) in [
			("same_sub_sector", &plan.same_sub_sector),
			("different_sub_sector", &plan.different_sub_sector),
		] {
			if strategies.is_empty() {
				return Err(Error::Validation {
					message: format!("suggestions.plans.{product_type}.{shape} must be non-empty."),
				});
			}

			let mut seen = HashSet::new();

			for strategy in strategies {
				if !STRATEGIES.contains(&strategy.as_str()) {
					return Err(Error::UnknownStrategy {
						product_type: product_type.clone(),
						strategy: strategy.clone(),
					});
				}
				if !seen.insert(strategy.as_str()) {
					return Err(Error::Validation {
						message: format!(
							"suggestions.plans.{product_type}.{shape} lists {strategy} more than once."
						),
					});
				}
			}
		}
	}

	Ok(())
}

fn validate_explanation(cfg: &Config) -> Result<()> {
	let explanation = &cfg.providers.explanation;

	if cfg.suggestions.explain && explanation.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.explanation.api_key must be non-empty when suggestions.explain is true."
				.to_string(),
		});
	}
	if !explanation.temperature.is_finite() {
		return Err(Error::Validation {
			message: "providers.explanation.temperature must be a finite number.".to_string(),
		});
	}
	if !(0.0..=2.0).contains(&explanation.temperature) {
		return Err(Error::Validation {
			message: "providers.explanation.temperature must be in the range 0.0-2.0.".to_string(),
		});
	}
	if explanation.max_tokens == 0 {
		return Err(Error::Validation {
			message: "providers.explanation.max_tokens must be greater than zero.".to_string(),
		});
	}
	if explanation.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.explanation.timeout_ms must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn validate_sectors(cfg: &Config) -> Result<()> {
	let Some(graph) = cfg.sectors.decorrelations.as_ref() else {
		return Ok(());
	};

	if graph.is_empty() {
		return Err(Error::Validation {
			message: "sectors.decorrelations must be non-empty when present.".to_string(),
		});
	}

	for (sector, neighbors) in graph {
		if sector.trim().is_empty() {
			return Err(Error::Validation {
				message: "sectors.decorrelations keys must be non-empty.".to_string(),
			});
		}
		if neighbors.iter().any(|neighbor| neighbor.trim().is_empty()) {
			return Err(Error::Validation {
				message: format!("sectors.decorrelations.{sector} has an empty sector name."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.service.log_level.trim().is_empty() {
		cfg.service.log_level = "info".to_string();
	}
	if let Some(graph) = cfg.sectors.decorrelations.as_mut() {
		graph.retain(|_, neighbors| !neighbors.is_empty());
	}
}
