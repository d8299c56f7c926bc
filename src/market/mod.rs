// Market evaluation core: deviation, classification, aggregation, stats.

pub mod aggregate;
pub mod evaluator;
pub mod history;
pub mod listing;
pub mod stats;
