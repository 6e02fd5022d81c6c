//! Services for normalization, aggregation and recommendations

pub mod aggregator;
pub mod normalizer;
pub mod recommender;
pub mod report;

pub use aggregator::{AggregateViews, Aggregator};
pub use normalizer::{normalize, Normalized};
pub use recommender::recommend;
pub use report::{analyze, Analysis, Report};
