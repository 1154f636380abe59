use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A proposed or historical ticket→route binding. Input to the validators;
/// never persisted by this core.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Assignment {
    id: String,
    ticket_id: String,
    route_id: String,
    assigned_at: Timestamp,
    assigned_by: String,
    override_reason: Option<String>,
}

impl Assignment {
    pub fn new(
        id: impl Into<String>,
        ticket_id: impl Into<String>,
        route_id: impl Into<String>,
        assigned_at: Timestamp,
        assigned_by: impl Into<String>,
    ) -> Self {
        Assignment {
            id: id.into(),
            ticket_id: ticket_id.into(),
            route_id: route_id.into(),
            assigned_at,
            assigned_by: assigned_by.into(),
            override_reason: None,
        }
    }

    pub fn with_override_reason(mut self, reason: impl Into<String>) -> Self {
        self.override_reason = Some(reason.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn ticket_id(&self) -> &str {
        &self.ticket_id
    }

    pub fn route_id(&self) -> &str {
        &self.route_id
    }

    pub fn assigned_at(&self) -> Timestamp {
        self.assigned_at
    }

    pub fn assigned_by(&self) -> &str {
        &self.assigned_by
    }

    pub fn override_reason(&self) -> Option<&str> {
        self.override_reason.as_deref()
    }
}
