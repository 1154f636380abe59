use serde::{Deserialize, Serialize};

use crate::{
    coordinate::{Coordinate, EARTH_RADIUS_KM},
    error::GeometryError,
};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    north_east: Coordinate,
    south_west: Coordinate,
}

impl BoundingBox {
    /// Axis-aligned box covering a circle of `radius_km` around `center`.
    /// Latitudes are clamped at the poles; longitudes are clamped at the
    /// antimeridian rather than wrapped.
    pub fn around(center: &Coordinate, radius_km: f64) -> Result<Self, GeometryError> {
        center.validate()?;

        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(GeometryError::InvalidRadius(radius_km));
        }

        let delta_lat = (radius_km / EARTH_RADIUS_KM).to_degrees();

        // Longitude degrees shrink with latitude. Near the poles the cosine
        // vanishes; cap the span at the full longitude range instead.
        let cos_lat = center.latitude().to_radians().cos();
        let delta_lon = if cos_lat > 1e-9 {
            (delta_lat / cos_lat).min(360.0)
        } else {
            360.0
        };

        let north = (center.latitude() + delta_lat).min(90.0);
        let south = (center.latitude() - delta_lat).max(-90.0);
        let east = (center.longitude() + delta_lon).min(180.0);
        let west = (center.longitude() - delta_lon).max(-180.0);

        Ok(BoundingBox {
            north_east: Coordinate::new(north, east),
            south_west: Coordinate::new(south, west),
        })
    }

    pub fn north_east(&self) -> &Coordinate {
        &self.north_east
    }

    pub fn south_west(&self) -> &Coordinate {
        &self.south_west
    }

    pub fn contains(&self, point: &Coordinate) -> bool {
        point.is_valid()
            && point.latitude() <= self.north_east.latitude()
            && point.latitude() >= self.south_west.latitude()
            && point.longitude() <= self.north_east.longitude()
            && point.longitude() >= self.south_west.longitude()
    }
}
