pub mod logger;
pub mod query;
pub mod utils;

pub use query::*;
pub use utils::*;
