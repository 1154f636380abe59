mod override_check;
mod validator;

pub use override_check::{OVERRIDE_VOCABULARY, OverrideResult, validate_override_reason};
pub use validator::{
    DistanceComparison, Finding, FindingKind, OptimalityParams, OptimalityResult,
    OptimalityValidator,
};
