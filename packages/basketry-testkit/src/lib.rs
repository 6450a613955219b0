mod error;

pub use error::{Error, Result};

use std::{collections::HashMap, env, thread, time::Duration};

use qdrant_client::{
	Qdrant,
	client::Payload,
	qdrant::{
		CreateCollectionBuilder, Distance, PointId, PointStruct, UpsertPointsBuilder, Vector,
		VectorParamsBuilder, VectorsConfigBuilder,
	},
};
use serde_json::{Map, Value};
use tokio::{runtime::Builder, time};
use uuid::Uuid;

pub const DENSE_VECTOR_NAME: &str = "dense";

/// One catalog point to seed: point id, dense vector and JSON payload.
pub struct SeedPoint {
	pub id: PointId,
	pub vector: Vec<f32>,
	pub payload: Map<String, Value>,
}

/// A uniquely named Qdrant collection that is deleted on cleanup or drop.
pub struct TestCollection {
	url: String,
	name: String,
	client: Qdrant,
	cleaned: bool,
}
impl TestCollection {
	pub async fn create(url: &str, vector_dim: u32) -> Result<Self> {
		let client = Qdrant::from_url(url)
			.build()
			.map_err(|err| Error::Message(format!("Failed to build Qdrant client: {err}.")))?;
		let name = format!("basketry_test_{}", Uuid::new_v4().simple());
		let mut vectors_config = VectorsConfigBuilder::default();

		vectors_config.add_named_vector_params(
			DENSE_VECTOR_NAME,
			VectorParamsBuilder::new(vector_dim.into(), Distance::Cosine),
		);

		time::timeout(
			Duration::from_secs(10),
			client.create_collection(
				CreateCollectionBuilder::new(name.clone()).vectors_config(vectors_config),
			),
		)
		.await
		.map_err(|_| Error::Message("Qdrant create_collection timed out.".to_string()))??;

		Ok(Self { url: url.to_string(), name, client, cleaned: false })
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub async fn seed(&self, points: Vec<SeedPoint>) -> Result<()> {
		let points = points
			.into_iter()
			.map(|point| {
				let mut vectors = HashMap::new();
				let mut payload = Payload::new();

				vectors.insert(DENSE_VECTOR_NAME.to_string(), Vector::from(point.vector));

				for (key, value) in point.payload {
					payload.insert(key, value);
				}

				PointStruct::new(point.id, vectors, payload)
			})
			.collect::<Vec<_>>();

		self.client.upsert_points(UpsertPointsBuilder::new(self.name.clone(), points).wait(true)).await?;

		Ok(())
	}

	pub async fn cleanup(mut self) -> Result<()> {
		self.client.delete_collection(self.name.clone()).await?;

		self.cleaned = true;

		Ok(())
	}
}
impl Drop for TestCollection {
	fn drop(&mut self) {
		if self.cleaned {
			return;
		}

		let url = self.url.clone();
		let name = self.name.clone();
		let cleanup_thread = thread::spawn(move || {
			let runtime = match Builder::new_current_thread().enable_all().build() {
				Ok(runtime) => runtime,
				Err(err) => {
					eprintln!("Test collection cleanup failed: {err}.");

					return;
				},
			};
			let result = runtime.block_on(async {
				let client = Qdrant::from_url(&url).build()?;

				client.delete_collection(name.clone()).await?;

				Ok::<_, Error>(())
			});

			if let Err(err) = result {
				eprintln!("Test collection cleanup failed for {name:?}: {err}.");
			}
		});
		let _ = cleanup_thread.join();
	}
}

pub fn env_qdrant_url() -> Option<String> {
	env::var("BASKETRY_QDRANT_URL").ok()
}
