use std::{future::Future, time::Duration};

use dispatch_geo::Coordinate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMode {
    Geometric,
    External,
}

/// Controlled contexts (validation scenarios, test harnesses) never reach out
/// to the external source; production-like contexts do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionContext {
    Controlled,
    Production,
}

impl ExecutionContext {
    pub fn is_controlled(&self) -> bool {
        matches!(self, ExecutionContext::Controlled)
    }
}

#[derive(Debug, Error, Clone)]
#[error("{message}")]
pub struct SourceError {
    message: String,
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        SourceError {
            message: message.into(),
        }
    }
}

/// Pluggable distance capability supplied by the host application, standing
/// in for a real routing provider. The resolver enforces `timeout` on its
/// side as well; sources may use it to bound their own work.
pub trait ExternalDistanceSource: Send + Sync {
    fn lookup(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        timeout: Duration,
    ) -> impl Future<Output = Result<f64, SourceError>> + Send;
}

/// Source for resolvers that only ever compute geometric distances.
pub struct NoExternalSource;

impl ExternalDistanceSource for NoExternalSource {
    async fn lookup(
        &self,
        _origin: Coordinate,
        _destination: Coordinate,
        _timeout: Duration,
    ) -> Result<f64, SourceError> {
        Err(SourceError::new("no external distance source configured"))
    }
}
