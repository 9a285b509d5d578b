pub mod attribution;
pub mod fallback;

pub use attribution::*;
pub use fallback::*;
