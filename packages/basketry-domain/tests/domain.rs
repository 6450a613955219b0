use basketry_domain::{
	Error,
	band::{Band, BandStrategy, compute_band},
	basket::BasketContext,
	ranking::{Candidate, RankOrder, rank_by_metric},
	sector_graph::SectorGraph,
	security::{MetricField, Security},
	selector::{BasketShape, select_shape},
};

fn oil_member(id: &str, volatility_6: f64) -> Security {
	serde_json::from_value(serde_json::json!({
		"id": id,
		"country": "US",
		"sector": "Energy",
		"sub_sector": "Oil",
		"volatility_6": volatility_6,
	}))
	.expect("Failed to parse basket member.")
}

fn with_sub_sector(id: &str, sub_sector: &str) -> Security {
	Security { id: id.to_string(), sub_sector: Some(sub_sector.to_string()), ..Default::default() }
}

#[test]
fn two_oil_members_give_expected_bands() {
	let basket = [oil_member("1", 20.0), oil_member("2", 30.0)];
	let decorrelation =
		compute_band(&basket, MetricField::Volatility6, BandStrategy::Decorrelation)
			.expect("Decorrelation band must compute.");
	let similar = compute_band(&basket, MetricField::Volatility6, BandStrategy::SimilarVolatility)
		.expect("Similar band must compute.");

	assert_eq!((decorrelation.lower, decorrelation.upper), (24.0, 40.0));
	assert_eq!((similar.lower, similar.upper), (20.0, 40.0));
	assert!(!decorrelation.clamped && !similar.clamped);
}

#[test]
fn inverted_extremes_clamp_to_six_below_upper() {
	for strategy in [BandStrategy::Decorrelation, BandStrategy::SimilarVolatility] {
		let band = Band::from_extremes(50.0, 10.0, strategy);

		assert!(band.clamped);
		assert_eq!(band.upper, 20.0);
		assert_eq!(band.lower, band.upper - 6.0);
	}
}

#[test]
fn successful_bands_are_ordered() {
	let samples = [(0.0, 0.0), (5.0, 7.0), (35.0, 36.0), (-3.0, 90.0), (60.0, 12.0), (100.0, 1.0)];

	for (min, max) in samples {
		for strategy in [BandStrategy::Decorrelation, BandStrategy::SimilarVolatility] {
			let band = Band::from_extremes(min, max, strategy);

			assert!(band.lower <= band.upper, "{min} {max} {strategy:?} gave {band:?}");
		}
	}
}

#[test]
fn band_needs_at_least_one_metric() {
	let basket = [with_sub_sector("1", "Oil")];
	let err = compute_band(&basket, MetricField::ImpliedVolatility12m, BandStrategy::Decorrelation)
		.expect_err("Expected NoValidMetric.");

	assert!(matches!(err, Error::NoValidMetric { field: "implied_volatility_12m" }));
}

#[test]
fn selector_classifies_sub_sector_diversity() {
	assert_eq!(select_shape(&[with_sub_sector("1", "Tech")]), Ok(BasketShape::SameSubSector));
	assert_eq!(
		select_shape(&[with_sub_sector("1", "Tech"), with_sub_sector("2", "Pharma")]),
		Ok(BasketShape::DifferentSubSector)
	);
	assert!(matches!(select_shape(&[]), Err(Error::InvalidInput { .. })));

	let missing = Security { id: "2".to_string(), ..Default::default() };

	assert!(matches!(
		select_shape(&[with_sub_sector("1", "Tech"), missing]),
		Err(Error::InvalidInput { .. })
	));
}

#[test]
fn decorrelated_sectors_is_idempotent() {
	let graph = SectorGraph::builtin();
	let first = graph.decorrelated_sectors(["Energy", "Financials"]);
	let second = graph.decorrelated_sectors(["Energy", "Financials"]);

	assert_eq!(first, second);
	assert!(first.contains("Health Care"));
	assert!(!graph.decorrelated_sectors(["Unknown"]).iter().any(|_| true));
}

#[test]
fn numeric_basket_ids_compare_as_strings() {
	let basket: Vec<Security> = serde_json::from_value(serde_json::json!([
		{ "id": 101, "sub_sector": "Oil" },
		{ "id": "102", "sub_sector": "Oil" },
	]))
	.expect("Failed to parse basket.");
	let ctx = BasketContext::new(&basket).expect("Basket context must build.");

	assert!(ctx.contains_id("101"));
	assert!(ctx.contains_id("102"));
}

#[test]
fn ranking_puts_missing_metric_after_present_ones() {
	let mut candidates: Vec<Candidate> = [
		("a", None),
		("b", Some(0.95)),
		("c", Some(0.41)),
		("d", None),
		("e", Some(0.41)),
	]
	.into_iter()
	.map(|(id, ratio)| {
		Candidate::new(Security {
			id: id.to_string(),
			price_52w_hl_ratio: ratio,
			..Default::default()
		})
	})
	.collect();

	rank_by_metric(&mut candidates, MetricField::Price52wHlRatio, RankOrder::Ascending);

	let order: Vec<&str> = candidates.iter().map(Candidate::id).collect();

	assert_eq!(order, vec!["c", "e", "b", "a", "d"]);

	let values: Vec<f64> =
		candidates.iter().filter_map(|c| c.security.metric(MetricField::Price52wHlRatio)).collect();

	assert!(values.windows(2).all(|pair| pair[0] <= pair[1]));
}
