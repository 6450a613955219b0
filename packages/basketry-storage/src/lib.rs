pub mod filter;
pub mod payload;
pub mod qdrant;

mod error;

pub use error::{Error, Result};
