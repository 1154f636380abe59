use std::sync::Arc;

use dispatch_core::{
    ConflictDecision, ConflictResolver, OptimalityValidator,
    conflict::CapacityThresholds,
    model::{Assignment, Priority, Route, RouteBuilder, Ticket, TicketBuilder},
    optimality::{FindingKind, OptimalityParams},
};
use dispatch_distance::{DistanceResolver, ExecutionContext, ResolverParams};
use dispatch_geo::{Coordinate, Polygon};
use jiff::{SignedDuration, Zoned};

const DEG_PER_KM: f64 = 1.0 / 111.195;

fn ticket_location() -> Coordinate {
    Coordinate::new(42.5, -92.5)
}

/// Square service area whose vertex-mean centroid sits `km_north` km north
/// of the ticket location.
fn area_at_km(km_north: f64) -> Polygon {
    let center = Coordinate::new(
        ticket_location().latitude() + km_north * DEG_PER_KM,
        ticket_location().longitude(),
    );
    let d = 0.002;
    Polygon::new(vec![
        Coordinate::new(center.latitude() - d, center.longitude() - d),
        Coordinate::new(center.latitude() - d, center.longitude() + d),
        Coordinate::new(center.latitude() + d, center.longitude() + d),
        Coordinate::new(center.latitude() + d, center.longitude() - d),
    ])
}

fn route(id: &str, km_north: f64, capacity: u32, load: u32) -> Route {
    let mut builder = RouteBuilder::default();
    builder.set_id(id);
    builder.set_name(format!("Route {id}"));
    builder.set_service_area(area_at_km(km_north));
    builder.set_capacity(capacity);
    builder.set_current_load(load);
    builder.set_technician_id(format!("tech-{id}"));
    builder.build()
}

fn ticket(priority: Priority) -> Ticket {
    let mut builder = TicketBuilder::default();
    builder.set_id("ticket-1");
    builder.set_customer_id("customer-9");
    builder.set_location(ticket_location());
    builder.set_priority(priority);
    builder.set_service_type("repair");
    builder.set_created_at("2026-08-26T08:00:00Z".parse().unwrap());
    builder.build()
}

fn now() -> Zoned {
    // A Wednesday, inside the default weekday schedule.
    "2026-08-26T10:00:00[UTC]".parse().unwrap()
}

fn validator() -> OptimalityValidator<dispatch_distance::NoExternalSource> {
    OptimalityValidator::new(
        Arc::new(DistanceResolver::geometric(ResolverParams::default())),
        OptimalityParams::default(),
        ExecutionContext::Controlled,
    )
}

fn conflict_resolver() -> ConflictResolver<dispatch_distance::NoExternalSource> {
    ConflictResolver::new(
        Arc::new(DistanceResolver::geometric(ResolverParams::default())),
        CapacityThresholds::default(),
        ExecutionContext::Controlled,
    )
}

#[tokio::test]
async fn far_proposal_is_flagged_suboptimal() {
    let candidates = vec![
        route("route-2km", 2.0, 10, 10),
        route("route-5km", 5.0, 10, 4),
        route("route-8km", 8.0, 10, 4),
    ];
    let proposed = candidates[2].clone();

    let result = validator()
        .validate_optimal(&ticket(Priority::Medium), &proposed, &candidates, &[], &now())
        .await
        .unwrap();

    // The 2 km route is full, so the 5 km route is optimal; the 8 km
    // proposal is 3 km / 60% off, which fails the percent arm of the
    // tolerance even though 3 km is under the 5 km cap.
    assert_eq!(result.optimal_route_id, "route-5km");
    assert!(!result.is_optimal);
    assert!((result.comparison.diff_km - 3.0).abs() < 0.05);
    assert!((result.comparison.diff_percent - 60.0).abs() < 1.5);
    assert!(result.has_finding(FindingKind::Suboptimal));
    assert!(result.has_finding(FindingKind::OverrideRequired));
}

#[tokio::test]
async fn close_proposal_is_within_tolerance() {
    let candidates = vec![
        route("route-5km", 5.0, 10, 4),
        route("route-5.2km", 5.2, 10, 4),
    ];
    let proposed = candidates[1].clone();

    let result = validator()
        .validate_optimal(&ticket(Priority::Medium), &proposed, &candidates, &[], &now())
        .await
        .unwrap();

    // 0.2 km and 4% are inside both tolerance arms.
    assert!(result.is_optimal);
    assert!(!result.has_finding(FindingKind::Suboptimal));
}

#[tokio::test]
async fn valid_override_silences_the_override_finding() {
    let candidates = vec![
        route("route-5km", 5.0, 10, 4),
        route("route-8km", 8.0, 10, 4),
    ];
    let proposed = candidates[1].clone();

    let assignment = Assignment::new(
        "assignment-1",
        "ticket-1",
        "route-8km",
        now().timestamp() - SignedDuration::from_hours(1),
        "dispatcher-7",
    )
    .with_override_reason("customer request: technician knows the site");

    let result = validator()
        .validate_optimal(
            &ticket(Priority::Medium),
            &proposed,
            &candidates,
            &[assignment],
            &now(),
        )
        .await
        .unwrap();

    assert!(!result.is_optimal);
    assert!(!result.has_finding(FindingKind::OverrideRequired));
    assert!(!result.has_finding(FindingKind::OverrideIssue));
}

#[tokio::test]
async fn full_proposed_route_gets_capacity_finding() {
    let candidates = vec![
        route("route-5km", 5.0, 10, 4),
        route("route-full", 5.2, 10, 10),
    ];
    let proposed = candidates[1].clone();

    let result = validator()
        .validate_optimal(&ticket(Priority::Medium), &proposed, &candidates, &[], &now())
        .await
        .unwrap();

    assert!(result.has_finding(FindingKind::CapacityExceeded));
}

#[tokio::test]
async fn urgent_ticket_needs_route_operating_today() {
    let mut builder = RouteBuilder::default();
    builder.set_id("route-weekend");
    builder.set_name("Weekend route");
    builder.set_service_area(area_at_km(5.0));
    builder.set_capacity(10);
    builder.set_current_load(4);
    builder.set_schedule(
        dispatch_core::model::RouteSchedule::parse("sat,sun", "08:00", "18:00").unwrap(),
    );
    let weekend = builder.build();

    let candidates = vec![weekend.clone()];

    let result = validator()
        .validate_optimal(&ticket(Priority::Urgent), &weekend, &candidates, &[], &now())
        .await
        .unwrap();

    // 2026-08-26 is a Wednesday.
    assert!(result.has_finding(FindingKind::ScheduleIssue));
}

#[tokio::test]
async fn over_capacity_route_gets_alternatives() {
    let overloaded = route("route-over", 5.0, 10, 12);
    let candidates = vec![
        overloaded.clone(),
        route("route-nearby", 5.5, 10, 3),
        route("route-far", 12.0, 10, 3),
    ];

    let decision = conflict_resolver()
        .resolve(&ticket(Priority::Medium), &overloaded, &candidates)
        .await
        .unwrap();

    match decision {
        ConflictDecision::Alternatives { routes, .. } => {
            assert!(!routes.is_empty());
            assert!(routes.iter().all(|r| r.route_id != "route-over"));
            // 12 km is far outside the 25% window around 5 km.
            assert!(routes.iter().all(|r| r.route_id != "route-far"));
        }
        other => panic!("expected alternatives, got {other:?}"),
    }
}

#[tokio::test]
async fn over_capacity_without_alternatives_is_rejected() {
    let overloaded = route("route-over", 5.0, 10, 12);
    let candidates = vec![overloaded.clone(), route("route-far", 12.0, 10, 3)];

    let decision = conflict_resolver()
        .resolve(&ticket(Priority::Medium), &overloaded, &candidates)
        .await
        .unwrap();

    assert!(matches!(decision, ConflictDecision::Rejected { .. }));
}

#[tokio::test]
async fn at_capacity_without_alternatives_reschedules() {
    let full = route("route-full", 5.0, 10, 10);
    let candidates = vec![full.clone()];

    let decision = conflict_resolver()
        .resolve(&ticket(Priority::Medium), &full, &candidates)
        .await
        .unwrap();

    match decision {
        ConflictDecision::Rescheduled {
            estimated_delay, ..
        } => {
            // Utilization exactly 1.0: base delay only.
            assert_eq!(estimated_delay, SignedDuration::from_hours(4));
        }
        other => panic!("expected reschedule, got {other:?}"),
    }
}

#[tokio::test]
async fn urgent_at_capacity_accepts_near_capacity_alternatives() {
    let full = route("route-full", 5.0, 10, 10);
    // 90% utilized: filtered for normal priorities, allowed for urgent.
    let near = route("route-near", 5.5, 10, 9);
    let candidates = vec![full.clone(), near];

    let urgent = conflict_resolver()
        .resolve(&ticket(Priority::Urgent), &full, &candidates)
        .await
        .unwrap();
    assert!(matches!(urgent, ConflictDecision::Alternatives { .. }));

    let normal = conflict_resolver()
        .resolve(&ticket(Priority::Medium), &full, &candidates)
        .await
        .unwrap();
    assert!(matches!(normal, ConflictDecision::Rescheduled { .. }));
}

#[tokio::test]
async fn near_capacity_accepts_with_advisory_alternatives() {
    let near = route("route-near", 5.0, 10, 9);
    let candidates = vec![
        near.clone(),
        route("alt-1", 5.2, 10, 2),
        route("alt-2", 5.4, 10, 2),
        route("alt-3", 5.6, 10, 2),
    ];

    let decision = conflict_resolver()
        .resolve(&ticket(Priority::Medium), &near, &candidates)
        .await
        .unwrap();

    match decision {
        ConflictDecision::Accepted { advisory, .. } => {
            assert!(advisory.len() <= 2);
            assert!(!advisory.is_empty());
        }
        other => panic!("expected accept with advisory, got {other:?}"),
    }
}

#[tokio::test]
async fn fleet_report_counts_affected_routes_and_tickets() {
    let healthy = route("route-healthy", 5.0, 10, 3);
    let overloaded = route("route-over", 5.5, 10, 12);
    let routes = vec![healthy.clone(), overloaded.clone()];

    let mut first = TicketBuilder::default();
    first.set_id("ticket-1");
    first.set_location(ticket_location());
    first.set_priority(Priority::Medium);
    let first = first.build();

    let mut second = TicketBuilder::default();
    second.set_id("ticket-2");
    second.set_location(ticket_location());
    second.set_priority(Priority::High);
    let second = second.build();

    let assigned_at = now().timestamp();
    let assignments = vec![
        Assignment::new("a-1", "ticket-1", "route-healthy", assigned_at, "dispatcher"),
        Assignment::new("a-2", "ticket-2", "route-over", assigned_at, "dispatcher"),
    ];

    let report = conflict_resolver()
        .analyze_fleet(&[first, second], &routes, &assignments)
        .await
        .unwrap();

    assert_eq!(report.affected_routes, 1);
    assert_eq!(report.affected_tickets, 1);
    assert_eq!(report.conflicts[0].route_id, "route-over");
    assert_eq!(report.conflicts[0].assigned_tickets, 1);
    assert_eq!(report.resolutions[0].ticket_id, "ticket-2");
}
