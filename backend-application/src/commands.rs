pub mod anomaly_commands;
pub mod assess_commands;

pub use anomaly_commands::*;
pub use assess_commands::*;
