pub mod scorer_service;

pub use scorer_service::*;
