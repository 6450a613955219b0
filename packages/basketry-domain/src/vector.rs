use crate::{Error, Result};

/// Element-wise mean of equally sized vectors.
pub fn mean(vectors: &[Vec<f32>]) -> Result<Vec<f32>> {
	let Some(first) = vectors.first() else {
		return Err(Error::InvalidInput {
			message: "Cannot average an empty set of vectors.".to_string(),
		});
	};
	let mut sums = vec![0.0_f64; first.len()];

	for vector in vectors {
		if vector.len() != sums.len() {
			return Err(Error::DimensionMismatch { expected: sums.len(), found: vector.len() });
		}

		for (sum, value) in sums.iter_mut().zip(vector) {
			*sum += f64::from(*value);
		}
	}

	let count = vectors.len() as f64;

	Ok(sums.into_iter().map(|sum| (sum / count) as f32).collect())
}
