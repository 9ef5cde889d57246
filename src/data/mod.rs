//! Data module - CSV loading and the immutable dataset

mod dataset;
mod loader;

pub use dataset::{ColumnKind, Dataset, Record};
pub use loader::{DataLoader, LoaderError};
