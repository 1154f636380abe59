use dispatch_distance::DistanceError;
use dispatch_geo::GeometryError;
use thiserror::Error;

/// Hard failures only. Suboptimal assignments, capacity conflicts and
/// missing overrides are successful results carrying findings, not errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Distance(#[from] DistanceError),
}
