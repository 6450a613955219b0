//! Translation of [`RetrievalFilter`] into Qdrant payload conditions.

use qdrant_client::qdrant::{Condition, Filter, Range};

use basketry_domain::filter::{RetrievalFilter, SectorClause};

pub const COUNTRY_KEY: &str = "country";
pub const SECTOR_KEY: &str = "sector";
pub const SUB_SECTOR_KEY: &str = "sub_sector";

pub fn to_qdrant_filter(filter: &RetrievalFilter) -> Filter {
	let mut must = vec![Condition::matches(COUNTRY_KEY, filter.country().to_string())];
	let mut must_not = Vec::new();

	match filter.sectors() {
		Some(SectorClause::Include(sectors)) =>
			must.push(Condition::matches(SECTOR_KEY, sectors.clone())),
		Some(SectorClause::Exclude(sectors)) if !sectors.is_empty() =>
			must_not.push(Condition::matches(SECTOR_KEY, sectors.clone())),
		Some(SectorClause::Exclude(_)) | None => {},
	}

	if let Some(sub_sector) = filter.sub_sector() {
		must.push(Condition::matches(SUB_SECTOR_KEY, sub_sector.to_string()));
	}
	if let Some(range) = filter.range() {
		must.push(Condition::range(
			range.field.as_str(),
			Range { gte: Some(range.lower), lte: Some(range.upper), ..Default::default() },
		));
	}

	Filter { must, should: Vec::new(), must_not, min_should: None }
}
