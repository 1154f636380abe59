use std::sync::Arc;

use dispatch_distance::{DistanceMode, DistanceResolver, ExecutionContext, ExternalDistanceSource};
use jiff::Zoned;
use serde::Serialize;
use tracing::debug;

use crate::{
    error::ValidationError,
    model::{Assignment, Priority, Route, Ticket},
    optimality::override_check::validate_override_reason,
};

#[derive(Debug, Clone)]
pub struct OptimalityParams {
    pub tolerance_percent: f64,
    pub max_diff_km: f64,
    pub require_override: bool,
    /// How far outside its service-area centroid a ticket may sit and still
    /// count as "reasonably near" the route.
    pub membership_slack_km: f64,
    pub distance_mode: DistanceMode,
}

impl Default for OptimalityParams {
    fn default() -> Self {
        OptimalityParams {
            tolerance_percent: 10.0,
            max_diff_km: 5.0,
            require_override: true,
            membership_slack_km: 5.0,
            distance_mode: DistanceMode::Geometric,
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct DistanceComparison {
    pub proposed_km: f64,
    pub optimal_km: f64,
    pub diff_km: f64,
    pub diff_percent: f64,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    Suboptimal,
    OverrideRequired,
    OverrideIssue,
    CapacityExceeded,
    OutsideServiceArea,
    ScheduleIssue,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub kind: FindingKind,
    pub message: String,
}

impl Finding {
    fn new(kind: FindingKind, message: impl Into<String>) -> Self {
        Finding {
            kind,
            message: message.into(),
        }
    }
}

/// A suboptimal proposal is a normal, representable outcome. The result is
/// `Err` only for malformed input or an unavailable distance source.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OptimalityResult {
    pub is_optimal: bool,
    pub proposed_route_id: String,
    pub optimal_route_id: String,
    pub comparison: DistanceComparison,
    pub findings: Vec<Finding>,
}

impl OptimalityResult {
    pub fn has_finding(&self, kind: FindingKind) -> bool {
        self.findings.iter().any(|finding| finding.kind == kind)
    }
}

pub struct OptimalityValidator<S> {
    resolver: Arc<DistanceResolver<S>>,
    params: OptimalityParams,
    context: ExecutionContext,
}

impl<S: ExternalDistanceSource> OptimalityValidator<S> {
    pub fn new(
        resolver: Arc<DistanceResolver<S>>,
        params: OptimalityParams,
        context: ExecutionContext,
    ) -> Self {
        OptimalityValidator {
            resolver,
            params,
            context,
        }
    }

    pub fn params(&self) -> &OptimalityParams {
        &self.params
    }

    /// Decides whether `proposed` is good enough for `ticket` against the
    /// full candidate set, and validates the stated justification otherwise.
    pub async fn validate_optimal(
        &self,
        ticket: &Ticket,
        proposed: &Route,
        candidates: &[Route],
        assignments: &[Assignment],
        now: &Zoned,
    ) -> Result<OptimalityResult, ValidationError> {
        let mut entries: Vec<(&Route, f64)> = Vec::with_capacity(candidates.len() + 1);
        for candidate in candidates {
            entries.push((candidate, self.route_distance_km(ticket, candidate).await?));
        }

        let proposed_km = match entries.iter().find(|(route, _)| route.id() == proposed.id()) {
            Some((_, distance_km)) => *distance_km,
            None => {
                let distance_km = self.route_distance_km(ticket, proposed).await?;
                entries.push((proposed, distance_km));
                distance_km
            }
        };

        let (optimal, optimal_km) = select_optimal(&entries);

        let diff_km = (proposed_km - optimal_km).abs();
        let diff_percent = if optimal_km > 0.0 {
            diff_km / optimal_km * 100.0
        } else {
            0.0
        };

        let is_optimal = optimal.id() == proposed.id()
            || (diff_percent <= self.params.tolerance_percent
                && diff_km <= self.params.max_diff_km);

        let mut findings = Vec::new();

        if !is_optimal {
            findings.push(Finding::new(
                FindingKind::Suboptimal,
                format!(
                    "route {} is {diff_km:.2} km ({diff_percent:.1}%) farther than optimal route {}",
                    proposed.id(),
                    optimal.id()
                ),
            ));

            self.check_override(ticket, proposed, assignments, now, &mut findings);
        }

        self.check_hard_constraints(ticket, proposed, proposed_km, now, &mut findings);

        debug!(
            ticket = ticket.id(),
            proposed = proposed.id(),
            optimal = optimal.id(),
            is_optimal,
            findings = findings.len(),
            "optimality validated"
        );

        Ok(OptimalityResult {
            is_optimal,
            proposed_route_id: proposed.id().to_string(),
            optimal_route_id: optimal.id().to_string(),
            comparison: DistanceComparison {
                proposed_km,
                optimal_km,
                diff_km,
                diff_percent,
            },
            findings,
        })
    }

    /// Ticket-to-route distance, measured against the service-area centroid.
    /// A deliberate simplification carried over from the original system;
    /// not a routing distance.
    async fn route_distance_km(
        &self,
        ticket: &Ticket,
        route: &Route,
    ) -> Result<f64, ValidationError> {
        let centroid = route.service_area().centroid()?;
        let result = self
            .resolver
            .resolve(
                ticket.location(),
                centroid,
                self.params.distance_mode,
                self.context,
            )
            .await?;

        Ok(result.distance_km)
    }

    fn check_override(
        &self,
        ticket: &Ticket,
        proposed: &Route,
        assignments: &[Assignment],
        now: &Zoned,
        findings: &mut Vec<Finding>,
    ) {
        let existing = assignments.iter().find(|assignment| {
            assignment.ticket_id() == ticket.id() && assignment.route_id() == proposed.id()
        });

        match existing {
            Some(assignment) if assignment.override_reason().is_some() => {
                let result = validate_override_reason(assignment, self.context, now.timestamp());
                for issue in result.issues {
                    findings.push(Finding::new(FindingKind::OverrideIssue, issue));
                }
            }
            _ if self.params.require_override => {
                findings.push(Finding::new(
                    FindingKind::OverrideRequired,
                    format!(
                        "suboptimal assignment of ticket {} to route {} has no override justification",
                        ticket.id(),
                        proposed.id()
                    ),
                ));
            }
            _ => {}
        }
    }

    fn check_hard_constraints(
        &self,
        ticket: &Ticket,
        proposed: &Route,
        proposed_km: f64,
        now: &Zoned,
        findings: &mut Vec<Finding>,
    ) {
        if !proposed.has_spare_capacity() {
            findings.push(Finding::new(
                FindingKind::CapacityExceeded,
                format!(
                    "route {} is at or over capacity ({}/{})",
                    proposed.id(),
                    proposed.current_load(),
                    proposed.capacity()
                ),
            ));
        }

        if !proposed.service_area().contains(&ticket.location())
            && proposed_km > self.params.membership_slack_km
        {
            findings.push(Finding::new(
                FindingKind::OutsideServiceArea,
                format!(
                    "ticket {} is {proposed_km:.2} km outside the service area of route {}",
                    ticket.id(),
                    proposed.id()
                ),
            ));
        }

        for issue in proposed.schedule().issues() {
            findings.push(Finding::new(FindingKind::ScheduleIssue, issue));
        }

        if ticket.priority() == Priority::Urgent && !proposed.schedule().operates_on(now.weekday())
        {
            findings.push(Finding::new(
                FindingKind::ScheduleIssue,
                format!(
                    "urgent ticket {} but route {} does not operate on {:?}",
                    ticket.id(),
                    proposed.id(),
                    now.weekday()
                ),
            ));
        }
    }
}

/// Minimum distance among routes with spare capacity; least-overloaded route
/// when nothing has spare capacity. Ties keep the earlier entry.
fn select_optimal<'a>(entries: &[(&'a Route, f64)]) -> (&'a Route, f64) {
    let with_spare = entries
        .iter()
        .filter(|(route, _)| route.has_spare_capacity())
        .min_by(|a, b| a.1.total_cmp(&b.1));

    let chosen = with_spare.unwrap_or_else(|| {
        entries
            .iter()
            .min_by(|a, b| b.0.spare_capacity().cmp(&a.0.spare_capacity()))
            .expect("candidate set is never empty here")
    });

    (chosen.0, chosen.1)
}
