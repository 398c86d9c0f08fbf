//! Question understanding: classification into a [`QueryType`](crate::model::QueryType)
//! and expansion into search-friendly variants.

pub mod classifier;
pub mod expander;

pub use classifier::classify;
pub use expander::expand;
