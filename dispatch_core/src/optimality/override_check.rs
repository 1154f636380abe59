use dispatch_distance::ExecutionContext;
use jiff::{SignedDuration, Timestamp};

use crate::model::Assignment;

/// Recognized override categories, matched case-insensitively as substrings.
pub const OVERRIDE_VOCABULARY: [&str; 8] = [
    "customer request",
    "emergency",
    "technician expertise",
    "equipment availability",
    "schedule conflict",
    "route optimization",
    "capacity management",
    "geographic constraint",
];

const MIN_FREEFORM_REASON_LEN: usize = 10;
const MAX_ASSIGNMENT_AGE: SignedDuration = SignedDuration::from_hours(24);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideResult {
    pub valid: bool,
    pub issues: Vec<String>,
}

/// Checks an override justification. All checks run and every violation is
/// reported; nothing short-circuits.
pub fn validate_override_reason(
    assignment: &Assignment,
    context: ExecutionContext,
    now: Timestamp,
) -> OverrideResult {
    let mut issues = Vec::new();

    match assignment.override_reason() {
        None => issues.push(String::from("override reason is missing")),
        Some(reason) if reason.trim().is_empty() => {
            issues.push(String::from("override reason is missing"));
        }
        Some(reason) => {
            let lower = reason.to_lowercase();

            let in_vocabulary = OVERRIDE_VOCABULARY.iter().any(|term| lower.contains(term));
            if !in_vocabulary && reason.trim().len() < MIN_FREEFORM_REASON_LEN {
                issues.push(format!(
                    "override reason {reason:?} is neither a recognized category nor descriptive (at least {MIN_FREEFORM_REASON_LEN} characters)"
                ));
            }

            if !context.is_controlled() && !lower.contains("test") && !lower.contains("demo") {
                issues.push(String::from(
                    "override reason must reference a test or demo context",
                ));
            }
        }
    }

    if assignment.assigned_by().trim().is_empty() {
        issues.push(String::from("assigned_by is missing"));
    }

    let age = now.duration_since(assignment.assigned_at());
    if age > MAX_ASSIGNMENT_AGE {
        issues.push(format!(
            "assignment is {:.1} hours old, exceeding the 24 hour window",
            age.as_secs_f64() / 3600.0
        ));
    }

    OverrideResult {
        valid: issues.is_empty(),
        issues,
    }
}
