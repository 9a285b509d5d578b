pub mod anomaly;
pub mod assessment;
pub mod config;
pub mod query;
pub mod transaction;

pub use anomaly::*;
pub use assessment::*;
pub use config::*;
pub use query::*;
pub use transaction::*;
