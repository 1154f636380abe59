use dispatch_geo::Coordinate;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

/// How far the alternative-route search widens for a given priority.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchWidening {
    pub max_extra_percent: f64,
    pub include_near_capacity: bool,
}

impl Priority {
    pub fn is_elevated(&self) -> bool {
        matches!(self, Priority::High | Priority::Urgent)
    }

    /// Explicit priority → search-widening table. Elevated priorities accept
    /// near-capacity routes and a wider distance window.
    pub fn search_widening(&self) -> SearchWidening {
        match self {
            Priority::High | Priority::Urgent => SearchWidening {
                max_extra_percent: 25.0,
                include_near_capacity: true,
            },
            Priority::Low | Priority::Medium => SearchWidening {
                max_extra_percent: 15.0,
                include_near_capacity: false,
            },
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Ticket {
    id: String,
    customer_id: String,
    location: Coordinate,
    priority: Priority,
    service_type: String,
    created_at: Timestamp,
}

impl Ticket {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn location(&self) -> Coordinate {
        self.location
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

#[derive(Default)]
pub struct TicketBuilder {
    id: String,
    customer_id: String,
    location: Option<Coordinate>,
    priority: Option<Priority>,
    service_type: String,
    created_at: Option<Timestamp>,
}

impl TicketBuilder {
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn set_customer_id(&mut self, customer_id: impl Into<String>) {
        self.customer_id = customer_id.into();
    }

    pub fn set_location(&mut self, location: Coordinate) {
        self.location = Some(location);
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = Some(priority);
    }

    pub fn set_service_type(&mut self, service_type: impl Into<String>) {
        self.service_type = service_type.into();
    }

    pub fn set_created_at(&mut self, created_at: Timestamp) {
        self.created_at = Some(created_at);
    }

    pub fn build(self) -> Ticket {
        Ticket {
            id: self.id,
            customer_id: self.customer_id,
            location: self.location.unwrap_or(Coordinate::new(0.0, 0.0)),
            priority: self.priority.unwrap_or(Priority::Medium),
            service_type: self.service_type,
            created_at: self.created_at.unwrap_or(Timestamp::UNIX_EPOCH),
        }
    }
}
