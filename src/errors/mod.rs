pub mod types;
pub mod classification;

pub use types::AutobumpError;
pub use classification::{ErrorClassification, FailureScope};
