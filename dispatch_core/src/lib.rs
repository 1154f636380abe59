pub mod conflict;
pub mod error;
pub mod model;
pub mod optimality;

pub use conflict::{ConflictDecision, ConflictResolver};
pub use error::ValidationError;
pub use optimality::OptimalityValidator;
