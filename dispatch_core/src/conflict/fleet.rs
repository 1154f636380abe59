use fxhash::FxHashMap;
use serde::Serialize;
use tracing::debug;

use crate::{
    error::ValidationError,
    model::{Assignment, Route, Ticket},
};

use super::{
    ConflictDecision, ConflictResolver,
    classify::{CapacityConflict, classify_capacity},
};
use dispatch_distance::ExternalDistanceSource;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RouteConflictSummary {
    pub route_id: String,
    pub conflict: CapacityConflict,
    pub assigned_tickets: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TicketResolution {
    pub ticket_id: String,
    pub route_id: String,
    pub decision: ConflictDecision,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ConflictReport {
    pub conflicts: Vec<RouteConflictSummary>,
    pub resolutions: Vec<TicketResolution>,
    pub affected_routes: usize,
    pub affected_tickets: usize,
}

impl<S: ExternalDistanceSource> ConflictResolver<S> {
    /// Classifies every route and resolves each ticket assigned to a
    /// conflicted route. Tickets without an assignment are skipped.
    pub async fn analyze_fleet(
        &self,
        tickets: &[Ticket],
        routes: &[Route],
        assignments: &[Assignment],
    ) -> Result<ConflictReport, ValidationError> {
        let mut conflicts = Vec::new();
        let mut conflict_index: FxHashMap<&str, usize> = FxHashMap::default();

        for route in routes {
            if let Some(conflict) = classify_capacity(route, self.thresholds()) {
                conflict_index.insert(route.id(), conflicts.len());
                conflicts.push(RouteConflictSummary {
                    route_id: route.id().to_string(),
                    conflict,
                    assigned_tickets: 0,
                });
            }
        }

        let mut resolutions = Vec::new();

        for assignment in assignments {
            let Some(&summary_index) = conflict_index.get(assignment.route_id()) else {
                continue;
            };

            let ticket = tickets.iter().find(|t| t.id() == assignment.ticket_id());
            let route = routes.iter().find(|r| r.id() == assignment.route_id());

            if let (Some(ticket), Some(route)) = (ticket, route) {
                conflicts[summary_index].assigned_tickets += 1;

                let decision = self.resolve(ticket, route, routes).await?;
                resolutions.push(TicketResolution {
                    ticket_id: ticket.id().to_string(),
                    route_id: route.id().to_string(),
                    decision,
                });
            }
        }

        let report = ConflictReport {
            affected_routes: conflicts.len(),
            affected_tickets: resolutions.len(),
            conflicts,
            resolutions,
        };

        debug!(
            affected_routes = report.affected_routes,
            affected_tickets = report.affected_tickets,
            "fleet analyzed"
        );

        Ok(report)
    }
}
