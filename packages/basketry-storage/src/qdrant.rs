pub const DENSE_VECTOR_NAME: &str = "dense";

use qdrant_client::qdrant::{
	GetPointsBuilder, Query, QueryPointsBuilder, VectorOutput, VectorsOutput,
	vectors_output::VectorsOptions,
};
use tracing::warn;

use basketry_domain::{filter::RetrievalFilter, security::Security};

use crate::{
	Error, Result,
	filter::to_qdrant_filter,
	payload::{decode_security, point_id_for},
};

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &basketry_config::Catalog) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}

	/// Filtered catalog query returning up to `limit` decoded securities.
	///
	/// An all-zero vector carries no direction, so it is sent as a filter-only query.
	pub async fn query(
		&self,
		vector: &[f32],
		filter: &RetrievalFilter,
		limit: u64,
	) -> Result<Vec<Security>> {
		if vector.len() != self.vector_dim as usize {
			return Err(Error::InvalidArgument(format!(
				"Query vector has {} dimensions; the catalog expects {}.",
				vector.len(),
				self.vector_dim
			)));
		}

		let mut search = QueryPointsBuilder::new(self.collection.clone())
			.filter(to_qdrant_filter(filter))
			.with_payload(true)
			.limit(limit);

		if vector.iter().any(|value| *value != 0.0) {
			search = search.query(Query::new_nearest(vector.to_vec())).using(DENSE_VECTOR_NAME);
		}

		let response = self.client.query(search).await?;
		let mut out = Vec::with_capacity(response.result.len());

		for point in response.result {
			match decode_security(point.id.as_ref(), &point.payload) {
				Ok(security) => out.push(security),
				Err(err) => warn!(error = %err, "Skipping undecodable catalog point."),
			}
		}

		Ok(out)
	}

	/// Stored dense vectors for the given security ids. Unknown ids are omitted.
	pub async fn fetch_vectors(&self, ids: &[String]) -> Result<Vec<(String, Vec<f32>)>> {
		if ids.is_empty() {
			return Ok(Vec::new());
		}

		let point_ids = ids.iter().map(|id| point_id_for(id)).collect::<Vec<_>>();
		let response = self
			.client
			.get_points(
				GetPointsBuilder::new(self.collection.clone(), point_ids)
					.with_payload(true)
					.with_vectors(true),
			)
			.await?;
		let mut out = Vec::with_capacity(response.result.len());

		for point in response.result {
			let security = match decode_security(point.id.as_ref(), &point.payload) {
				Ok(security) => security,
				Err(err) => {
					warn!(error = %err, "Skipping undecodable catalog point.");

					continue;
				},
			};

			if let Some(vector) = point.vectors.and_then(dense_vector) {
				out.push((security.id, vector));
			}
		}

		Ok(out)
	}
}

fn dense_vector(vectors: VectorsOutput) -> Option<Vec<f32>> {
	let output = match vectors.vectors_options? {
		VectorsOptions::Vector(output) => output,
		VectorsOptions::Vectors(mut named) => named.vectors.remove(DENSE_VECTOR_NAME)?,
	};

	dense_data(output)
}

#[allow(deprecated)]
fn dense_data(output: VectorOutput) -> Option<Vec<f32>> {
	Some(output.data).filter(|data| !data.is_empty())
}
