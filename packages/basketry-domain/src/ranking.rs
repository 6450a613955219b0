use std::cmp::Ordering;

use serde::Serialize;

use crate::security::{MetricField, Security};

/// A catalog record returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
	#[serde(flatten)]
	pub security: Security,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ranked_by: Option<RankedBy>,
}
impl Candidate {
	pub fn new(security: Security) -> Self {
		Self { security, ranked_by: None }
	}

	pub fn id(&self) -> &str {
		&self.security.id
	}
}

/// The metric a ranked candidate was ordered by. `value` is absent when the record lacks it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedBy {
	pub field: MetricField,
	pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOrder {
	Ascending,
	Descending,
}

/// Sorts by `field` in `order`; records without the metric go last, ties break on id.
pub fn rank_by_metric(candidates: &mut [Candidate], field: MetricField, order: RankOrder) {
	for candidate in candidates.iter_mut() {
		candidate.ranked_by = Some(RankedBy { field, value: candidate.security.metric(field) });
	}

	candidates.sort_by(|left, right| {
		let by_metric = match (left.security.metric(field), right.security.metric(field)) {
			(Some(a), Some(b)) => match order {
				RankOrder::Ascending => a.total_cmp(&b),
				RankOrder::Descending => b.total_cmp(&a),
			},
			(Some(_), None) => Ordering::Less,
			(None, Some(_)) => Ordering::Greater,
			(None, None) => Ordering::Equal,
		};

		by_metric.then_with(|| left.id().cmp(right.id()))
	});
}
