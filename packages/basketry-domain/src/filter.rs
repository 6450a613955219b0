//! Metadata filter handed to the vector index.
//!
//! A filter is a conjunction. It is assembled once per retrieval with the consuming `with_*`
//! builders and is read-only afterwards; index adapters translate it through the getters.

use serde::Serialize;

use crate::{
	band::Band,
	security::{MetricField, Security},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "op", content = "sectors")]
pub enum SectorClause {
	Include(Vec<String>),
	Exclude(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricRange {
	pub field: MetricField,
	pub lower: f64,
	pub upper: f64,
}
impl MetricRange {
	pub fn from_band(field: MetricField, band: Band) -> Self {
		Self { field, lower: band.lower, upper: band.upper }
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalFilter {
	country: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	sectors: Option<SectorClause>,
	#[serde(skip_serializing_if = "Option::is_none")]
	sub_sector: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	range: Option<MetricRange>,
}
impl RetrievalFilter {
	pub fn for_country(country: impl Into<String>) -> Self {
		Self { country: country.into(), sectors: None, sub_sector: None, range: None }
	}

	pub fn with_sectors(mut self, clause: SectorClause) -> Self {
		self.sectors = Some(clause);

		self
	}

	pub fn with_sub_sector(mut self, sub_sector: impl Into<String>) -> Self {
		self.sub_sector = Some(sub_sector.into());

		self
	}

	pub fn with_range(mut self, range: MetricRange) -> Self {
		self.range = Some(range);

		self
	}

	pub fn country(&self) -> &str {
		&self.country
	}

	pub fn sectors(&self) -> Option<&SectorClause> {
		self.sectors.as_ref()
	}

	pub fn sub_sector(&self) -> Option<&str> {
		self.sub_sector.as_deref()
	}

	pub fn range(&self) -> Option<&MetricRange> {
		self.range.as_ref()
	}

	/// Evaluates the filter against a record the way the catalog does.
	///
	/// A record without a sector never satisfies an inclusion clause and always satisfies an
	/// exclusion clause. A record without the ranged metric never matches.
	pub fn matches(&self, security: &Security) -> bool {
		if security.country() != Some(self.country.as_str()) {
			return false;
		}

		let sector_ok = match (&self.sectors, security.sector()) {
			(None, _) => true,
			(Some(SectorClause::Include(sectors)), Some(sector)) =>
				sectors.iter().any(|candidate| candidate == sector),
			(Some(SectorClause::Include(_)), None) => false,
			(Some(SectorClause::Exclude(sectors)), Some(sector)) =>
				!sectors.iter().any(|candidate| candidate == sector),
			(Some(SectorClause::Exclude(_)), None) => true,
		};

		if !sector_ok {
			return false;
		}
		if let Some(sub_sector) = self.sub_sector.as_deref()
			&& security.sub_sector() != Some(sub_sector)
		{
			return false;
		}
		if let Some(range) = self.range.as_ref() {
			return security
				.metric(range.field)
				.is_some_and(|value| value >= range.lower && value <= range.upper);
		}

		true
	}
}
