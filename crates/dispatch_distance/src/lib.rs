pub mod cache;
pub mod resolver;
pub mod retry;
pub mod source;

pub use cache::{CacheStats, DistanceCache};
pub use resolver::{DistanceError, DistanceResolver, DistanceResult, ResolverParams};
pub use retry::RetryPolicy;
pub use source::{
    DistanceMode, ExecutionContext, ExternalDistanceSource, NoExternalSource, SourceError,
};
