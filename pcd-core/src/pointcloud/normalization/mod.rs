pub mod normalizer;

pub use normalizer::{ColumnNormalizer, NormalizationPolicy, OverflowPolicy};
