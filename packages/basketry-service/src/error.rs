pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
	#[error("Invalid input: {message}")]
	InvalidInput { message: String },
	#[error("No basket member has a valid {field} value.")]
	NoValidMetric { field: &'static str },
	#[error("Vector dimension mismatch: expected {expected}, found {found}.")]
	DimensionMismatch { expected: usize, found: usize },
	#[error("Index query failed: {message}")]
	IndexQuery { message: String },
	#[error("Explanation failed: {message}")]
	Explanation { message: String },
	#[error("Request was cancelled.")]
	Cancelled,
}
impl From<basketry_domain::Error> for Error {
	fn from(err: basketry_domain::Error) -> Self {
		match err {
			basketry_domain::Error::InvalidInput { message } => Self::InvalidInput { message },
			basketry_domain::Error::NoValidMetric { field } => Self::NoValidMetric { field },
			basketry_domain::Error::DimensionMismatch { expected, found } =>
				Self::DimensionMismatch { expected, found },
		}
	}
}

impl From<basketry_storage::Error> for Error {
	fn from(err: basketry_storage::Error) -> Self {
		Self::IndexQuery { message: err.to_string() }
	}
}

impl From<basketry_providers::Error> for Error {
	fn from(err: basketry_providers::Error) -> Self {
		Self::Explanation { message: err.to_string() }
	}
}
