//! Curated sector decorrelation graph.

use std::collections::{BTreeSet, HashMap};

const BUILTIN: [(&str, &[&str]); 11] = [
	(
		"Communication Services",
		&[
			"Utilities",
			"Consumer Staples",
			"Health Care",
			"Energy",
			"Materials",
			"Real Estate",
			"Financials",
		],
	),
	(
		"Consumer Discretionary",
		&[
			"Utilities",
			"Consumer Staples",
			"Health Care",
			"Energy",
			"Materials",
			"Real Estate",
			"Information Technology",
		],
	),
	(
		"Consumer Staples",
		&[
			"Information Technology",
			"Consumer Discretionary",
			"Financials",
			"Energy",
			"Industrials",
			"Materials",
		],
	),
	(
		"Energy",
		&[
			"Information Technology",
			"Health Care",
			"Consumer Staples",
			"Utilities",
			"Financials",
			"Communication Services",
		],
	),
	(
		"Financials",
		&[
			"Utilities",
			"Consumer Staples",
			"Health Care",
			"Energy",
			"Materials",
			"Information Technology",
			"Real Estate",
		],
	),
	(
		"Health Care",
		&[
			"Information Technology",
			"Financials",
			"Energy",
			"Materials",
			"Consumer Discretionary",
			"Industrials",
			"Communication Services",
		],
	),
	(
		"Industrials",
		&[
			"Utilities",
			"Consumer Staples",
			"Health Care",
			"Information Technology",
			"Communication Services",
			"Real Estate",
		],
	),
	(
		"Information Technology",
		&[
			"Utilities",
			"Consumer Staples",
			"Health Care",
			"Energy",
			"Materials",
			"Real Estate",
			"Financials",
		],
	),
	(
		"Materials",
		&[
			"Information Technology",
			"Health Care",
			"Financials",
			"Consumer Discretionary",
			"Communication Services",
			"Utilities",
		],
	),
	(
		"Real Estate",
		&[
			"Information Technology",
			"Energy",
			"Materials",
			"Industrials",
			"Health Care",
			"Consumer Staples",
			"Utilities",
		],
	),
	(
		"Utilities",
		&[
			"Information Technology",
			"Consumer Discretionary",
			"Financials",
			"Industrials",
			"Energy",
			"Materials",
			"Communication Services",
		],
	),
];

/// Directed, hand-authored mapping from a sector to the sectors considered decorrelated from it.
///
/// The relation is not symmetric. The graph is immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectorGraph {
	edges: HashMap<String, BTreeSet<String>>,
}
impl SectorGraph {
	/// The eleven-sector GICS graph used when no override is configured.
	pub fn builtin() -> Self {
		Self::from_edges(BUILTIN.iter().map(|(sector, neighbors)| {
			(sector.to_string(), neighbors.iter().map(|neighbor| neighbor.to_string()).collect())
		}))
	}

	pub fn from_edges<I>(edges: I) -> Self
	where
		I: IntoIterator<Item = (String, Vec<String>)>,
	{
		let mut out: HashMap<String, BTreeSet<String>> = HashMap::new();

		for (sector, neighbors) in edges {
			out.entry(sector).or_default().extend(neighbors);
		}

		Self { edges: out }
	}

	pub fn len(&self) -> usize {
		self.edges.len()
	}

	pub fn is_empty(&self) -> bool {
		self.edges.is_empty()
	}

	pub fn neighbors(&self, sector: &str) -> Option<&BTreeSet<String>> {
		self.edges.get(sector)
	}

	/// Union of the neighbor sets of every input sector. Unknown sectors contribute nothing.
	pub fn decorrelated_sectors<'a, I>(&self, sectors: I) -> BTreeSet<String>
	where
		I: IntoIterator<Item = &'a str>,
	{
		sectors
			.into_iter()
			.filter_map(|sector| self.edges.get(sector))
			.flat_map(|neighbors| neighbors.iter().cloned())
			.collect()
	}
}
impl Default for SectorGraph {
	fn default() -> Self {
		Self::builtin()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builtin_covers_eleven_sectors() {
		let graph = SectorGraph::builtin();

		assert_eq!(graph.len(), 11);

		for (_, neighbors) in BUILTIN {
			for neighbor in neighbors {
				assert!(graph.neighbors(neighbor).is_some(), "{neighbor} has no entry.");
			}
		}
	}

	#[test]
	fn graph_is_asymmetric() {
		let graph = SectorGraph::builtin();
		let financials = graph.neighbors("Financials").expect("Financials must exist.");
		let real_estate = graph.neighbors("Real Estate").expect("Real Estate must exist.");

		assert!(financials.contains("Real Estate"));
		assert!(!real_estate.contains("Financials"));
		assert!(graph.decorrelated_sectors(["Financials"]).contains("Real Estate"));
		assert!(!graph.decorrelated_sectors(["Real Estate"]).contains("Financials"));
	}

	#[test]
	fn unknown_sectors_contribute_nothing() {
		let graph = SectorGraph::builtin();

		assert!(graph.decorrelated_sectors(["Crypto"]).is_empty());
		assert_eq!(
			graph.decorrelated_sectors(["Crypto", "Energy"]),
			graph.decorrelated_sectors(["Energy"])
		);
	}

	#[test]
	fn union_removes_duplicates() {
		let graph = SectorGraph::from_edges([
			("A".to_string(), vec!["B".to_string(), "C".to_string()]),
			("D".to_string(), vec!["C".to_string(), "E".to_string()]),
		]);
		let out = graph.decorrelated_sectors(["A", "D"]);

		assert_eq!(out.into_iter().collect::<Vec<_>>(), vec!["B", "C", "E"]);
	}
}
