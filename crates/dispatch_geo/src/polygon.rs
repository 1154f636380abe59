use serde::{Deserialize, Serialize};

use crate::{coordinate::Coordinate, error::GeometryError};

/// A service-area boundary. The ring should be closed (first vertex equal to
/// the last); `is_closed` lets callers warn about open rings without being
/// blocked by them.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Coordinate>,
}

impl Polygon {
    pub fn new(vertices: Vec<Coordinate>) -> Self {
        Polygon { vertices }
    }

    pub fn vertices(&self) -> &[Coordinate] {
        &self.vertices
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        match (self.vertices.first(), self.vertices.last()) {
            (Some(first), Some(last)) => first == last,
            _ => false,
        }
    }

    /// Ray casting over the polygon edges. Degenerate polygons (fewer than 3
    /// vertices) and invalid points are outside, not errors.
    pub fn contains(&self, point: &Coordinate) -> bool {
        if self.vertices.len() < 3 || !point.is_valid() {
            return false;
        }

        let px = point.longitude();
        let py = point.latitude();

        let mut inside = false;
        let mut j = self.vertices.len() - 1;

        for i in 0..self.vertices.len() {
            let xi = self.vertices[i].longitude();
            let yi = self.vertices[i].latitude();
            let xj = self.vertices[j].longitude();
            let yj = self.vertices[j].latitude();

            let crosses = (yi > py) != (yj > py);
            if crosses && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
                inside = !inside;
            }

            j = i;
        }

        inside
    }

    /// Arithmetic mean of the vertices. An approximation of the true
    /// geometric centroid, kept deliberately: route distances are measured
    /// against this point.
    pub fn centroid(&self) -> Result<Coordinate, GeometryError> {
        if self.vertices.is_empty() {
            return Err(GeometryError::EmptyPolygon);
        }

        let count = self.vertices.len() as f64;
        let lat_sum: f64 = self.vertices.iter().map(|v| v.latitude()).sum();
        let lon_sum: f64 = self.vertices.iter().map(|v| v.longitude()).sum();

        Ok(Coordinate::new(lat_sum / count, lon_sum / count))
    }
}
