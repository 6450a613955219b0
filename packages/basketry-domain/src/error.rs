pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
	#[error("Invalid input: {message}")]
	InvalidInput { message: String },
	#[error("No basket member has a valid {field} value.")]
	NoValidMetric { field: &'static str },
	#[error("Vector dimension mismatch: expected {expected}, found {found}.")]
	DimensionMismatch { expected: usize, found: usize },
}
