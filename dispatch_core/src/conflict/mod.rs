mod alternatives;
mod classify;
mod fleet;

pub use alternatives::{AlternativeParams, AlternativeRoute, MAX_ALTERNATIVES};
pub use classify::{CapacityConflict, CapacityState, CapacityThresholds, classify_capacity};
pub use fleet::{ConflictReport, RouteConflictSummary, TicketResolution};

use std::sync::Arc;

use dispatch_distance::{DistanceMode, DistanceResolver, ExecutionContext, ExternalDistanceSource};
use jiff::SignedDuration;
use serde::Serialize;
use tracing::debug;

use crate::{
    error::ValidationError,
    model::{Route, Ticket},
};

use alternatives::{CandidateDistance, rank_alternatives};

const ADVISORY_ALTERNATIVES: usize = 2;

/// Resolution of a capacity conflict. Always carries a reason; missing
/// alternatives are a `Rejected` decision, not an error.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case", tag = "decision")]
pub enum ConflictDecision {
    Accepted {
        advisory: Vec<AlternativeRoute>,
        reason: String,
    },
    Alternatives {
        routes: Vec<AlternativeRoute>,
        reason: String,
    },
    Rescheduled {
        estimated_delay: SignedDuration,
        reason: String,
    },
    Rejected {
        reason: String,
    },
}

impl ConflictDecision {
    pub fn reason(&self) -> &str {
        match self {
            ConflictDecision::Accepted { reason, .. }
            | ConflictDecision::Alternatives { reason, .. }
            | ConflictDecision::Rescheduled { reason, .. }
            | ConflictDecision::Rejected { reason } => reason,
        }
    }
}

/// `4h + 8h × (utilization − 1)`, rounded up to whole hours.
pub fn estimate_reschedule_delay(utilization: f64) -> SignedDuration {
    let hours = (4.0 + 8.0 * (utilization - 1.0).max(0.0)).ceil();
    SignedDuration::from_hours(hours as i64)
}

pub struct ConflictResolver<S> {
    resolver: Arc<DistanceResolver<S>>,
    thresholds: CapacityThresholds,
    context: ExecutionContext,
    distance_mode: DistanceMode,
}

impl<S: ExternalDistanceSource> ConflictResolver<S> {
    pub fn new(
        resolver: Arc<DistanceResolver<S>>,
        thresholds: CapacityThresholds,
        context: ExecutionContext,
    ) -> Self {
        ConflictResolver {
            resolver,
            thresholds,
            context,
            distance_mode: DistanceMode::Geometric,
        }
    }

    pub fn with_distance_mode(mut self, distance_mode: DistanceMode) -> Self {
        self.distance_mode = distance_mode;
        self
    }

    pub fn thresholds(&self) -> &CapacityThresholds {
        &self.thresholds
    }

    /// Classifies the route's capacity state and picks a resolution
    /// strategy, ranking alternatives from `candidates`.
    pub async fn resolve(
        &self,
        ticket: &Ticket,
        route: &Route,
        candidates: &[Route],
    ) -> Result<ConflictDecision, ValidationError> {
        let Some(conflict) = classify_capacity(route, &self.thresholds) else {
            return Ok(ConflictDecision::Accepted {
                advisory: Vec::new(),
                reason: format!(
                    "route {} has available capacity ({}/{})",
                    route.id(),
                    route.current_load(),
                    route.capacity()
                ),
            });
        };

        debug!(
            ticket = ticket.id(),
            route = route.id(),
            state = ?conflict.state,
            utilization = conflict.utilization,
            "resolving capacity conflict"
        );

        let widening = ticket.priority().search_widening();

        match conflict.state {
            CapacityState::OverCapacity => {
                let params = AlternativeParams {
                    max_extra_percent: Some(if ticket.priority().is_elevated() {
                        30.0
                    } else {
                        25.0
                    }),
                    include_near_capacity: false,
                    ..AlternativeParams::default()
                };
                let routes = self
                    .suggest_alternatives(ticket, route, candidates, &params)
                    .await?;

                if routes.is_empty() {
                    Ok(ConflictDecision::Rejected {
                        reason: format!(
                            "route {} is over capacity by {} and no alternative routes are in range",
                            route.id(),
                            conflict.overload
                        ),
                    })
                } else {
                    Ok(ConflictDecision::Alternatives {
                        reason: format!(
                            "route {} is over capacity ({}/{}); {} alternatives in range",
                            route.id(),
                            route.current_load(),
                            route.capacity(),
                            routes.len()
                        ),
                        routes,
                    })
                }
            }
            CapacityState::AtCapacity => {
                let params = AlternativeParams {
                    max_extra_percent: Some(widening.max_extra_percent),
                    include_near_capacity: widening.include_near_capacity,
                    ..AlternativeParams::default()
                };
                let routes = self
                    .suggest_alternatives(ticket, route, candidates, &params)
                    .await?;

                if routes.is_empty() {
                    Ok(ConflictDecision::Rescheduled {
                        estimated_delay: estimate_reschedule_delay(conflict.utilization),
                        reason: format!(
                            "route {} is at capacity and no alternative routes are in range",
                            route.id()
                        ),
                    })
                } else {
                    Ok(ConflictDecision::Alternatives {
                        reason: format!(
                            "route {} is at capacity; {} alternatives in range",
                            route.id(),
                            routes.len()
                        ),
                        routes,
                    })
                }
            }
            CapacityState::NearCapacity => {
                let params = AlternativeParams {
                    max_extra_percent: Some(widening.max_extra_percent),
                    include_near_capacity: widening.include_near_capacity,
                    ..AlternativeParams::default()
                };
                let routes = self
                    .suggest_alternatives(ticket, route, candidates, &params)
                    .await?;

                if conflict.utilization * 100.0 >= self.thresholds.critical_capacity_percent {
                    if routes.is_empty() {
                        Ok(ConflictDecision::Rejected {
                            reason: format!(
                                "route {} is critically near capacity ({:.0}%) and no alternative routes are in range",
                                route.id(),
                                conflict.utilization * 100.0
                            ),
                        })
                    } else {
                        Ok(ConflictDecision::Alternatives {
                            reason: format!(
                                "route {} is critically near capacity ({:.0}%)",
                                route.id(),
                                conflict.utilization * 100.0
                            ),
                            routes,
                        })
                    }
                } else {
                    let mut advisory = routes;
                    advisory.truncate(ADVISORY_ALTERNATIVES);
                    Ok(ConflictDecision::Accepted {
                        reason: format!(
                            "route {} is near capacity ({:.0}%); assignment allowed",
                            route.id(),
                            conflict.utilization * 100.0
                        ),
                        advisory,
                    })
                }
            }
        }
    }

    /// Ranked alternatives for a ticket, never including the excluded route
    /// and never more than five.
    pub async fn suggest_alternatives(
        &self,
        ticket: &Ticket,
        excluded: &Route,
        candidates: &[Route],
        params: &AlternativeParams,
    ) -> Result<Vec<AlternativeRoute>, ValidationError> {
        let baseline_km = self.route_distance_km(ticket, excluded).await?;

        let mut with_distances = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if candidate.id() == excluded.id() {
                continue;
            }
            with_distances.push(CandidateDistance {
                route: candidate,
                distance_km: self.route_distance_km(ticket, candidate).await?,
            });
        }

        Ok(rank_alternatives(
            baseline_km,
            excluded.id(),
            with_distances,
            self.thresholds.near_capacity_percent,
            params,
        ))
    }

    async fn route_distance_km(
        &self,
        ticket: &Ticket,
        route: &Route,
    ) -> Result<f64, ValidationError> {
        let centroid = route.service_area().centroid()?;
        let result = self
            .resolver
            .resolve(ticket.location(), centroid, self.distance_mode, self.context)
            .await?;

        Ok(result.distance_km)
    }
}
