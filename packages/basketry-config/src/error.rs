pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read config file at {path:?}.")]
	ReadConfig { path: std::path::PathBuf, source: std::io::Error },
	#[error("Failed to parse config file at {path:?}.")]
	ParseConfig { path: std::path::PathBuf, source: toml::de::Error },
	#[error("suggestions.plans has an unknown product type {product_type:?}.")]
	UnknownProductType { product_type: String },
	#[error("suggestions.plans.{product_type} has an unknown strategy {strategy:?}.")]
	UnknownStrategy { product_type: String, strategy: String },
	#[error("{message}")]
	Validation { message: String },
}
