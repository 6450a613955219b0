//! Volatility bands derived from the basket's metric extremes.

use crate::{
	Error, Result,
	security::{MetricField, Security},
};

/// Offset added to the basket minimum for the decorrelation band.
pub const DECORRELATION_LOWER_OFFSET: f64 = 4.0;
/// Offset added to the basket maximum for both bands.
pub const UPPER_OFFSET: f64 = 10.0;
/// Band width used when the lower bound would exceed the upper bound.
pub const CLAMP_WIDTH: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandStrategy {
	Decorrelation,
	SimilarVolatility,
}

/// An inclusive numeric range. `clamped` records that the raw bounds were inverted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
	pub lower: f64,
	pub upper: f64,
	pub clamped: bool,
}
impl Band {
	pub fn from_extremes(min: f64, max: f64, strategy: BandStrategy) -> Self {
		let upper = max + UPPER_OFFSET;
		let lower = match strategy {
			BandStrategy::Decorrelation => min + DECORRELATION_LOWER_OFFSET,
			BandStrategy::SimilarVolatility => min,
		};

		if lower > upper {
			return Self { lower: upper - CLAMP_WIDTH, upper, clamped: true };
		}

		Self { lower, upper, clamped: false }
	}

	pub fn contains(&self, value: f64) -> bool {
		value >= self.lower && value <= self.upper
	}
}

/// Builds the band for `field` over every basket member that carries it.
pub fn compute_band(
	basket: &[Security],
	field: MetricField,
	strategy: BandStrategy,
) -> Result<Band> {
	let mut extremes: Option<(f64, f64)> = None;

	for value in basket.iter().filter_map(|security| security.metric(field)) {
		extremes = Some(match extremes {
			Some((min, max)) => (min.min(value), max.max(value)),
			None => (value, value),
		});
	}

	let (min, max) = extremes.ok_or(Error::NoValidMetric { field: field.as_str() })?;

	Ok(Band::from_extremes(min, max, strategy))
}
