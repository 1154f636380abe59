use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Coordinate {
            latitude,
            longitude,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(GeometryError::NotFinite {
                latitude: self.latitude,
                longitude: self.longitude,
            });
        }

        if !(-90.0..=90.0).contains(&self.latitude) || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(GeometryError::OutOfRange {
                latitude: self.latitude,
                longitude: self.longitude,
            });
        }

        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn haversine_distance_km(&self, to: &Coordinate) -> Result<f64, GeometryError> {
        haversine_distance_km(self, to)
    }
}

impl From<&Coordinate> for geo_types::Point {
    fn from(coordinate: &Coordinate) -> Self {
        geo_types::Point::new(coordinate.longitude, coordinate.latitude)
    }
}

/// Great-circle distance in kilometers between two validated coordinates.
pub fn haversine_distance_km(from: &Coordinate, to: &Coordinate) -> Result<f64, GeometryError> {
    from.validate()?;
    to.validate()?;

    let lat1_rad = from.latitude.to_radians();
    let lat2_rad = to.latitude.to_radians();

    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    Ok(EARTH_RADIUS_KM * c)
}
