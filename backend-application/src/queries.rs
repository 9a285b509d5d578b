pub mod anomaly_queries;

pub use anomaly_queries::*;
