use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("coordinate is not finite: latitude {latitude}, longitude {longitude}")]
    NotFinite { latitude: f64, longitude: f64 },

    #[error(
        "coordinate out of range: latitude {latitude} must be in [-90, 90], longitude {longitude} must be in [-180, 180]"
    )]
    OutOfRange { latitude: f64, longitude: f64 },

    #[error("polygon has no vertices")]
    EmptyPolygon,

    #[error("radius must be strictly positive, got {0} km")]
    InvalidRadius(f64),
}
