use serde::Serialize;

use crate::model::Route;

/// Hard cap on suggested alternatives, whatever the caller asks for.
pub const MAX_ALTERNATIVES: usize = 5;

#[derive(Debug, Clone)]
pub struct AlternativeParams {
    /// Maximum distance increase relative to the excluded route, in percent.
    pub max_extra_percent: Option<f64>,
    /// Maximum absolute distance increase in kilometers.
    pub max_extra_km: Option<f64>,
    pub include_near_capacity: bool,
    /// Sort by distance when true, by spare-capacity fraction otherwise.
    pub prioritize_by_distance: bool,
    pub max_results: usize,
}

impl Default for AlternativeParams {
    fn default() -> Self {
        AlternativeParams {
            max_extra_percent: Some(25.0),
            max_extra_km: None,
            include_near_capacity: false,
            prioritize_by_distance: true,
            max_results: MAX_ALTERNATIVES,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AlternativeRoute {
    pub route_id: String,
    pub name: String,
    pub distance_km: f64,
    pub spare_capacity: i64,
    pub utilization: f64,
}

pub(crate) struct CandidateDistance<'a> {
    pub route: &'a Route,
    pub distance_km: f64,
}

/// Filters and ranks candidates against the excluded route's distance.
pub(crate) fn rank_alternatives(
    baseline_km: f64,
    excluded_route_id: &str,
    candidates: Vec<CandidateDistance<'_>>,
    near_capacity_percent: f64,
    params: &AlternativeParams,
) -> Vec<AlternativeRoute> {
    let mut ranked: Vec<AlternativeRoute> = candidates
        .into_iter()
        .filter(|candidate| candidate.route.id() != excluded_route_id)
        .filter(|candidate| candidate.route.has_spare_capacity())
        .filter(|candidate| {
            params.include_near_capacity
                || candidate.route.utilization() * 100.0 < near_capacity_percent
        })
        .filter(|candidate| within_distance_window(baseline_km, candidate.distance_km, params))
        .map(|candidate| AlternativeRoute {
            route_id: candidate.route.id().to_string(),
            name: candidate.route.name().to_string(),
            distance_km: candidate.distance_km,
            spare_capacity: candidate.route.spare_capacity(),
            utilization: candidate.route.utilization(),
        })
        .collect();

    if params.prioritize_by_distance {
        ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    } else {
        ranked.sort_by(|a, b| spare_fraction(b).total_cmp(&spare_fraction(a)));
    }

    ranked.truncate(params.max_results.min(MAX_ALTERNATIVES));
    ranked
}

fn spare_fraction(alternative: &AlternativeRoute) -> f64 {
    1.0 - alternative.utilization
}

fn within_distance_window(baseline_km: f64, distance_km: f64, params: &AlternativeParams) -> bool {
    if let Some(percent) = params.max_extra_percent {
        if baseline_km > 0.0 && distance_km > baseline_km * (1.0 + percent / 100.0) {
            return false;
        }
    }

    if let Some(extra_km) = params.max_extra_km {
        if distance_km - baseline_km > extra_km {
            return false;
        }
    }

    true
}
