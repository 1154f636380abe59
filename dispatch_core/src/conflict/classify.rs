use serde::Serialize;

use crate::model::Route;

#[derive(Debug, Clone, Copy)]
pub struct CapacityThresholds {
    pub near_capacity_percent: f64,
    pub critical_capacity_percent: f64,
}

impl Default for CapacityThresholds {
    fn default() -> Self {
        CapacityThresholds {
            near_capacity_percent: 85.0,
            critical_capacity_percent: 95.0,
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CapacityState {
    NearCapacity,
    AtCapacity,
    OverCapacity,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct CapacityConflict {
    pub state: CapacityState,
    pub utilization: f64,
    /// Tickets beyond capacity; zero unless over capacity.
    pub overload: i64,
}

pub fn classify_capacity(
    route: &Route,
    thresholds: &CapacityThresholds,
) -> Option<CapacityConflict> {
    let utilization = route.utilization();

    let state = if route.current_load() > route.capacity() {
        CapacityState::OverCapacity
    } else if route.current_load() == route.capacity() {
        CapacityState::AtCapacity
    } else if utilization * 100.0 >= thresholds.near_capacity_percent {
        CapacityState::NearCapacity
    } else {
        return None;
    };

    Some(CapacityConflict {
        state,
        utilization,
        overload: (-route.spare_capacity()).max(0),
    })
}
