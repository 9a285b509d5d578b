// Port traits
// The seams infrastructure plugs into: stores, scorer, publisher

pub mod repositories;
pub mod services;

pub use repositories::*;
pub use services::*;
