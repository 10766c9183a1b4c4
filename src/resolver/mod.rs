pub mod engine;
pub mod report;
pub mod tracer;

pub use engine::RemediationResolver;
pub use report::{UnresolvedFinding, UnresolvedReport};
pub use tracer::{Candidate, CandidateSource, ChainTracer};
