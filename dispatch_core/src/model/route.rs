use dispatch_geo::Polygon;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::schedule::RouteSchedule;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("route capacity must be at least 1")]
    ZeroCapacity,
}

/// A candidate service route. `current_load` may exceed `capacity`; an
/// over-capacity route is a detectable state, not a constructor error. The
/// core never mutates a route, it only reports load facts to the caller.
///
/// `capacity` is always at least 1: the builder clamps it and
/// deserialization rejects zero, so `utilization` never divides by zero.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(try_from = "RawRoute")]
pub struct Route {
    id: String,
    name: String,
    service_area: Polygon,
    capacity: u32,
    current_load: u32,
    schedule: RouteSchedule,
    technician_id: String,
}

impl Route {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn service_area(&self) -> &Polygon {
        &self.service_area
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn current_load(&self) -> u32 {
        self.current_load
    }

    pub fn schedule(&self) -> &RouteSchedule {
        &self.schedule
    }

    pub fn technician_id(&self) -> &str {
        &self.technician_id
    }

    pub fn utilization(&self) -> f64 {
        f64::from(self.current_load) / f64::from(self.capacity)
    }

    /// `capacity - current_load`; negative when over capacity.
    pub fn spare_capacity(&self) -> i64 {
        i64::from(self.capacity) - i64::from(self.current_load)
    }

    pub fn has_spare_capacity(&self) -> bool {
        self.current_load < self.capacity
    }
}

#[derive(Deserialize)]
struct RawRoute {
    id: String,
    name: String,
    service_area: Polygon,
    capacity: u32,
    current_load: u32,
    schedule: RouteSchedule,
    technician_id: String,
}

impl TryFrom<RawRoute> for Route {
    type Error = RouteError;

    fn try_from(raw: RawRoute) -> Result<Self, Self::Error> {
        if raw.capacity == 0 {
            return Err(RouteError::ZeroCapacity);
        }

        Ok(Route {
            id: raw.id,
            name: raw.name,
            service_area: raw.service_area,
            capacity: raw.capacity,
            current_load: raw.current_load,
            schedule: raw.schedule,
            technician_id: raw.technician_id,
        })
    }
}

#[derive(Default)]
pub struct RouteBuilder {
    id: String,
    name: String,
    service_area: Option<Polygon>,
    capacity: Option<u32>,
    current_load: u32,
    schedule: Option<RouteSchedule>,
    technician_id: String,
}

impl RouteBuilder {
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_service_area(&mut self, service_area: Polygon) {
        self.service_area = Some(service_area);
    }

    pub fn set_capacity(&mut self, capacity: u32) {
        self.capacity = Some(capacity);
    }

    pub fn set_current_load(&mut self, current_load: u32) {
        self.current_load = current_load;
    }

    pub fn set_schedule(&mut self, schedule: RouteSchedule) {
        self.schedule = Some(schedule);
    }

    pub fn set_technician_id(&mut self, technician_id: impl Into<String>) {
        self.technician_id = technician_id.into();
    }

    pub fn build(self) -> Route {
        Route {
            id: self.id,
            name: self.name,
            service_area: self.service_area.unwrap_or(Polygon::new(vec![])),
            capacity: self.capacity.unwrap_or(1).max(1),
            current_load: self.current_load,
            schedule: self.schedule.unwrap_or_default(),
            technician_id: self.technician_id,
        }
    }
}
