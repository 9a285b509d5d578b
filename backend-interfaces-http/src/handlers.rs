pub mod anomaly_handlers;
pub mod check_handlers;
pub mod ops_handlers;
pub mod stream_handlers;

pub use anomaly_handlers::*;
pub use check_handlers::*;
pub use ops_handlers::*;
pub use stream_handlers::*;
