// Backend Application Layer

pub mod commands;
pub mod error;
pub mod metrics;
pub mod ops;
pub mod queries;
pub mod state;
pub mod sync;

#[cfg(test)]
pub(crate) mod testkit;

pub use error::AppError;
pub use metrics::Metrics;
pub use state::AppState;
