use std::collections::HashSet;

use crate::{Error, Result, security::Security};

/// Request-scoped view of the selected basket.
///
/// The reference element is the first member. Distinct sectors and sub-sectors keep their
/// first-seen order.
#[derive(Debug, Clone)]
pub struct BasketContext {
	reference: Security,
	sectors: Vec<String>,
	sub_sectors: Vec<String>,
	ids: HashSet<String>,
	len: usize,
}
impl BasketContext {
	pub fn new(basket: &[Security]) -> Result<Self> {
		let Some(reference) = basket.first() else {
			return Err(Error::InvalidInput { message: "Basket must not be empty.".to_string() });
		};
		let mut sectors = Vec::new();
		let mut sub_sectors = Vec::new();

		for security in basket {
			push_distinct(&mut sectors, security.sector());
			push_distinct(&mut sub_sectors, security.sub_sector());
		}

		Ok(Self {
			reference: reference.clone(),
			sectors,
			sub_sectors,
			ids: basket.iter().map(|security| security.id.clone()).collect(),
			len: basket.len(),
		})
	}

	pub fn reference(&self) -> &Security {
		&self.reference
	}

	pub fn sectors(&self) -> &[String] {
		&self.sectors
	}

	pub fn sub_sectors(&self) -> &[String] {
		&self.sub_sectors
	}

	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	pub fn contains_id(&self, id: &str) -> bool {
		self.ids.contains(id)
	}
}

fn push_distinct(values: &mut Vec<String>, value: Option<&str>) {
	if let Some(value) = value
		&& !values.iter().any(|existing| existing == value)
	{
		values.push(value.to_string());
	}
}
