#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod model;
pub mod time;

pub use catalog::{CatalogError, QuizCatalog, QuizSummary};
pub use error::Error;
pub use time::Clock;
