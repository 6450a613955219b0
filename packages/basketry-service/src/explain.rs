//! Prompts for the explanation generator and the fixed texts used when it is not called.

use serde_json::Value;

use basketry_domain::{
	basket::BasketContext, ranking::Candidate, security::Security, strategy::StrategyKind,
};

use crate::{Error, Result};

pub const NO_CANDIDATES_TEXT: &str = "No suitable underlyings were found matching the criteria.";
pub const EXPLANATIONS_DISABLED_TEXT: &str = "Explanations are disabled for this request.";
pub const FALLBACK_TEXT: &str = "An explanation could not be generated for these suggestions.";
pub const RETRIEVAL_FAILED_TEXT: &str = "Suggestions for this section are temporarily unavailable.";

const SHARED_RULES: &str = "You are a structured products analyst. Answer in markdown. \
Mention every candidate by name in bold, in the order given, with one or two sentences each. \
Only use the figures present in the candidate records. Do not invent data.";

fn strategy_brief(strategy: StrategyKind) -> &'static str {
	match strategy {
		StrategyKind::SimilarVolatility =>
			"The candidates share the sub-sector of the selected basket and sit in a similar implied volatility range. \
Explain how each one could replace a basket member to improve the product level.",
		StrategyKind::Decorrelation =>
			"The candidates come from the same country as the basket but from other sectors, with implied volatility \
slightly above the basket. Explain the diversification each one brings.",
		StrategyKind::LowVolatilityRatio =>
			"The candidates come from the basket's sectors and are ordered by how low their current volatility is \
relative to their 52-week range. Explain why a calmer underlying may suit the basket.",
		StrategyKind::LaggingPerformance =>
			"The candidates come from the basket's sectors and are ordered by how far their price trails its 52-week \
range. Explain the potential catch-up each one offers.",
	}
}

/// Chat messages for one strategy outcome. Candidates are passed verbatim as JSON.
pub fn build_messages(
	strategy: StrategyKind,
	basket: &[Security],
	candidates: &[Candidate],
) -> Result<Vec<Value>> {
	let ctx = BasketContext::new(basket)?;
	let names = basket.iter().map(Security::display_name).collect::<Vec<_>>();
	let records = serde_json::to_string_pretty(candidates).map_err(|err| Error::Explanation {
		message: format!("Failed to encode candidates: {err}."),
	})?;
	let system = format!("{SHARED_RULES}\n\n{}", strategy_brief(strategy));
	let user = format!(
		"Section: {title}\nSelected underlyings: {names}\nSectors: {sectors}\nSub-sectors: {sub_sectors}\n\nCandidates:\n{records}",
		title = strategy.section_title(),
		names = names.join(", "),
		sectors = ctx.sectors().join(", "),
		sub_sectors = ctx.sub_sectors().join(", "),
	);

	Ok(vec![
		serde_json::json!({ "role": "system", "content": system }),
		serde_json::json!({ "role": "user", "content": user }),
	])
}

#[cfg(test)]
mod tests {
	use super::*;

	fn security(id: &str, name: &str, sector: &str) -> Security {
		Security {
			id: id.to_string(),
			name: Some(name.to_string()),
			sector: Some(sector.to_string()),
			sub_sector: Some("Oil".to_string()),
			..Default::default()
		}
	}

	#[test]
	fn user_message_lists_basket_and_candidates() {
		let basket = [security("1", "Shell", "Energy"), security("2", "BP", "Energy")];
		let candidates = [Candidate::new(security("3", "Pfizer", "Health Care"))];
		let messages = build_messages(StrategyKind::Decorrelation, &basket, &candidates)
			.expect("messages failed");
		let user = messages[1]["content"].as_str().expect("user content missing");

		assert_eq!(messages.len(), 2);
		assert_eq!(messages[0]["role"], "system");
		assert!(user.contains("Section: Same country, improved decorrelation/volatility"));
		assert!(user.contains("Selected underlyings: Shell, BP"));
		assert!(user.contains("Sectors: Energy\n"));
		assert!(user.contains("\"name\": \"Pfizer\""));
	}

	#[test]
	fn system_prompt_depends_on_strategy() {
		let basket = [security("1", "Shell", "Energy")];
		let low =
			build_messages(StrategyKind::LowVolatilityRatio, &basket, &[]).expect("messages failed");
		let lagging =
			build_messages(StrategyKind::LaggingPerformance, &basket, &[]).expect("messages failed");

		assert_ne!(low[0]["content"], lagging[0]["content"]);
	}
}
