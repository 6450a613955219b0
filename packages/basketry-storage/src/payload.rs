//! Catalog payload decoding and security id to point id mapping.

use std::collections::HashMap;

use qdrant_client::qdrant::{PointId, Value, point_id::PointIdOptions, value::Kind};
use serde_json::{Map, Number};
use uuid::Uuid;

use basketry_domain::security::{Security, normalize_id};

use crate::{Error, Result};

/// Payload key holding the original security id. It wins over the point id when decoding.
pub const SECURITY_ID_KEY: &str = "security_id";

/// Numeric ids map to numeric point ids, UUIDs to themselves, anything else to a stable UUIDv5.
pub fn point_id_for(security_id: &str) -> PointId {
	if let Ok(num) = security_id.parse::<u64>() {
		return PointId::from(num);
	}
	if let Ok(uuid) = Uuid::parse_str(security_id) {
		return PointId::from(uuid.to_string());
	}

	PointId::from(Uuid::new_v5(&Uuid::NAMESPACE_OID, security_id.as_bytes()).to_string())
}

pub fn point_id_to_string(point_id: &PointId) -> Option<String> {
	match &point_id.point_id_options {
		Some(PointIdOptions::Num(num)) => Some(num.to_string()),
		Some(PointIdOptions::Uuid(uuid)) => Some(uuid.clone()),
		None => None,
	}
}

pub fn payload_to_json(payload: &HashMap<String, Value>) -> Map<String, serde_json::Value> {
	payload.iter().map(|(key, value)| (key.clone(), value_to_json(value))).collect()
}

pub fn value_to_json(value: &Value) -> serde_json::Value {
	match &value.kind {
		None | Some(Kind::NullValue(_)) => serde_json::Value::Null,
		Some(Kind::BoolValue(flag)) => serde_json::Value::Bool(*flag),
		Some(Kind::IntegerValue(num)) => serde_json::Value::from(*num),
		Some(Kind::DoubleValue(num)) =>
			Number::from_f64(*num).map(serde_json::Value::Number).unwrap_or(serde_json::Value::Null),
		Some(Kind::StringValue(text)) => serde_json::Value::String(text.clone()),
		Some(Kind::ListValue(list)) =>
			serde_json::Value::Array(list.values.iter().map(value_to_json).collect()),
		Some(Kind::StructValue(object)) => serde_json::Value::Object(payload_to_json(&object.fields)),
	}
}

/// Builds a [`Security`] from a stored point.
///
/// The id comes from the `security_id` payload field when present, then from the point id.
pub fn decode_security(
	point_id: Option<&PointId>,
	payload: &HashMap<String, Value>,
) -> Result<Security> {
	let mut fields = payload_to_json(payload);
	let id = fields
		.remove(SECURITY_ID_KEY)
		.as_ref()
		.and_then(normalize_id)
		.or_else(|| point_id.and_then(point_id_to_string))
		.ok_or_else(|| {
			Error::InvalidArgument("Catalog point has neither security_id nor point id.".to_string())
		})?;

	fields.insert("id".to_string(), serde_json::Value::String(id));

	serde_json::from_value(serde_json::Value::Object(fields))
		.map_err(|err| Error::InvalidArgument(format!("Catalog payload is not a security: {err}.")))
}

#[cfg(test)]
mod tests {
	use super::*;

	use basketry_domain::security::MetricField;

	fn payload(entries: serde_json::Value) -> HashMap<String, Value> {
		let serde_json::Value::Object(map) = entries else {
			panic!("Test payload must be an object.");
		};

		map.into_iter().map(|(key, value)| (key, Value::from(value))).collect()
	}

	#[test]
	fn numeric_ids_use_numeric_points() {
		assert_eq!(point_id_for("1234").point_id_options, Some(PointIdOptions::Num(1234)));
	}

	#[test]
	fn uuid_ids_are_kept() {
		let id = "4a1c3f0e-8a55-4f2b-9a39-2d6f4d1e7b10";

		assert_eq!(point_id_for(id).point_id_options, Some(PointIdOptions::Uuid(id.to_string())));
	}

	#[test]
	fn other_ids_hash_deterministically() {
		let first = point_id_for("XOM-US");
		let second = point_id_for("XOM-US");

		assert_eq!(first, second);
		assert!(matches!(first.point_id_options, Some(PointIdOptions::Uuid(_))));
		assert_ne!(first, point_id_for("XOM-FR"));
	}

	#[test]
	fn security_id_payload_wins_over_point_id() {
		let stored = payload(serde_json::json!({
			"security_id": "XOM-US",
			"country": "US",
			"implied_volatility_12m": 31,
			"perf_3m": "4.2",
			"currency": "USD",
		}));
		let security =
			decode_security(Some(&point_id_for("XOM-US")), &stored).expect("decode failed");

		assert_eq!(security.id, "XOM-US");
		assert_eq!(security.metric(MetricField::ImpliedVolatility12m), Some(31.0));
		assert_eq!(security.metric(MetricField::Perf3m), Some(4.2));
		assert_eq!(security.extra.get("currency"), Some(&serde_json::json!("USD")));
		assert!(!security.extra.contains_key(SECURITY_ID_KEY));
	}

	#[test]
	fn numeric_point_id_is_the_fallback() {
		let stored = payload(serde_json::json!({ "ticker": "SHEL" }));
		let security = decode_security(Some(&PointId::from(77_u64)), &stored).expect("decode failed");

		assert_eq!(security.id, "77");
		assert_eq!(security.ticker.as_deref(), Some("SHEL"));
	}

	#[test]
	fn missing_ids_are_rejected() {
		let stored = payload(serde_json::json!({ "ticker": "SHEL" }));

		assert!(matches!(decode_security(None, &stored), Err(Error::InvalidArgument(_))));
	}
}
