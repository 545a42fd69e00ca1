mod cache;
mod candidate;

pub use cache::Cache;
pub use candidate::Candidate;
