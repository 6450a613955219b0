use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, security::Security};

/// Sub-sector diversity of a basket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasketShape {
	SameSubSector,
	DifferentSubSector,
}
impl BasketShape {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::SameSubSector => "same_sub_sector",
			Self::DifferentSubSector => "different_sub_sector",
		}
	}
}

/// Classifies the basket. Every member must carry a sub-sector.
pub fn select_shape(basket: &[Security]) -> Result<BasketShape> {
	if basket.is_empty() {
		return Err(Error::InvalidInput { message: "Basket must not be empty.".to_string() });
	}

	let mut distinct = HashSet::new();

	for security in basket {
		let Some(sub_sector) = security.sub_sector() else {
			return Err(Error::InvalidInput {
				message: format!("Security {} has no sub_sector.", security.id),
			});
		};

		distinct.insert(sub_sector);
	}

	if distinct.len() == 1 {
		Ok(BasketShape::SameSubSector)
	} else {
		Ok(BasketShape::DifferentSubSector)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn member(id: &str, sub_sector: Option<&str>) -> Security {
		Security {
			id: id.to_string(),
			sub_sector: sub_sector.map(str::to_string),
			..Default::default()
		}
	}

	#[test]
	fn repeated_sub_sector_is_same() {
		let basket = [member("1", Some("Oil")), member("2", Some("Oil"))];

		assert_eq!(select_shape(&basket), Ok(BasketShape::SameSubSector));
	}

	#[test]
	fn missing_sub_sector_names_the_member() {
		let basket = [member("1", Some("Oil")), member("2", Some("  "))];
		let err = select_shape(&basket).expect_err("expected InvalidInput");

		assert_eq!(err, Error::InvalidInput { message: "Security 2 has no sub_sector.".to_string() });
	}
}
