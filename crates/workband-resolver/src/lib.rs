mod context;
mod error;
mod resolve;
mod types;

pub use context::{ResolverContext, ResolverScope};
pub use error::ResolutionError;
pub use resolve::WorkloadResolver;
pub use types::{PackSet, ResolvedPack};
