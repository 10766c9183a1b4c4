pub mod dependency;
pub mod finding;
pub mod outcome;

pub use dependency::*;
pub use finding::*;
pub use outcome::*;
