mod catalog;
mod models;

pub use catalog::Catalog;
pub use models::*;
