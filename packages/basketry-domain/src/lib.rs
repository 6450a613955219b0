pub mod band;
pub mod basket;
pub mod filter;
pub mod ranking;
pub mod sector_graph;
pub mod security;
pub mod selector;
pub mod strategy;
pub mod vector;

mod error;

pub use error::{Error, Result};
