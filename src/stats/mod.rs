//! Statistics and metric trait implementations

pub mod degree;

pub use degree::{DegreeDistribution, DegreeStatistics};
