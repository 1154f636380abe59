mod bbox;
mod coordinate;
mod error;
mod generate;
mod polygon;

pub use bbox::BoundingBox;
pub use coordinate::{Coordinate, EARTH_RADIUS_KM, haversine_distance_km};
pub use error::GeometryError;
pub use generate::generate_within_radius;
pub use polygon::Polygon;
