use std::time::Duration;

use dispatch_geo::{Coordinate, GeometryError, haversine_distance_km};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    cache::{CacheKey, DistanceCache},
    retry::{RetryPolicy, run_with_retry},
    source::{DistanceMode, ExecutionContext, ExternalDistanceSource, NoExternalSource},
};

#[derive(Debug, Clone)]
pub struct ResolverParams {
    pub cache_capacity: usize,
    pub cache_ttl: Option<Duration>,
    pub retry: RetryPolicy,
    pub fallback_to_geometric: bool,
    pub batch_group_size: usize,
}

impl Default for ResolverParams {
    fn default() -> Self {
        ResolverParams {
            cache_capacity: 1000,
            cache_ttl: None,
            retry: RetryPolicy::default(),
            fallback_to_geometric: true,
            batch_group_size: 10,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DistanceResult {
    pub distance_km: f64,
    pub mode: DistanceMode,
    pub fallback_used: bool,
    pub error: Option<String>,
}

#[derive(Debug, Error)]
pub enum DistanceError {
    /// Malformed input. Never retried, never cached.
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(#[from] GeometryError),

    /// External source exhausted its retries and fallback is disabled.
    #[error("external distance source unavailable after {attempts} attempts: {last_error}")]
    Unavailable { attempts: u32, last_error: String },

    /// A pair in a batch failed; pairs after it were not attempted. Results
    /// for earlier groups stay cached.
    #[error("batch aborted at pair {index} ({completed} results completed): {source}")]
    BatchAborted {
        index: usize,
        completed: usize,
        #[source]
        source: Box<DistanceError>,
    },
}

/// Resolves (origin, destination) pairs to distances, preferring the external
/// source when asked for it and falling back to the geometric computation
/// when the source stays unavailable.
pub struct DistanceResolver<S> {
    source: S,
    cache: DistanceCache,
    params: ResolverParams,
}

impl DistanceResolver<NoExternalSource> {
    /// Resolver without an external source; external lookups fall back to
    /// the geometric distance (or fail if fallback is disabled).
    pub fn geometric(params: ResolverParams) -> Self {
        DistanceResolver::new(NoExternalSource, params)
    }
}

impl<S: ExternalDistanceSource> DistanceResolver<S> {
    pub fn new(source: S, params: ResolverParams) -> Self {
        DistanceResolver {
            cache: DistanceCache::new(params.cache_capacity, params.cache_ttl),
            source,
            params,
        }
    }

    pub fn cache(&self) -> &DistanceCache {
        &self.cache
    }

    pub fn params(&self) -> &ResolverParams {
        &self.params
    }

    pub async fn resolve(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: DistanceMode,
        context: ExecutionContext,
    ) -> Result<DistanceResult, DistanceError> {
        origin.validate()?;
        destination.validate()?;

        let key = CacheKey::new(&origin, &destination, mode);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let result = match mode {
            // Controlled contexts never call out, whatever mode was asked.
            DistanceMode::External if !context.is_controlled() => {
                self.resolve_external(origin, destination).await?
            }
            _ => DistanceResult {
                distance_km: haversine_distance_km(&origin, &destination)?,
                mode: DistanceMode::Geometric,
                fallback_used: false,
                error: None,
            },
        };

        self.cache.insert(key, result.clone());
        Ok(result)
    }

    async fn resolve_external(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<DistanceResult, DistanceError> {
        let attempt = run_with_retry(&self.params.retry, |timeout| {
            self.source.lookup(origin, destination, timeout)
        })
        .await;

        match attempt {
            Ok(distance_km) => Ok(DistanceResult {
                distance_km,
                mode: DistanceMode::External,
                fallback_used: false,
                error: None,
            }),
            Err(exhausted) if self.params.fallback_to_geometric => {
                warn!(
                    attempts = exhausted.attempts,
                    last_error = %exhausted.last_error,
                    "external source unavailable, falling back to geometric distance"
                );
                Ok(DistanceResult {
                    distance_km: haversine_distance_km(&origin, &destination)?,
                    mode: DistanceMode::Geometric,
                    fallback_used: true,
                    error: Some(exhausted.last_error),
                })
            }
            Err(exhausted) => Err(DistanceError::Unavailable {
                attempts: exhausted.attempts,
                last_error: exhausted.last_error,
            }),
        }
    }

    /// Resolves pairs in groups of `batch_group_size`: groups run
    /// sequentially, pairs within a group concurrently, so a large batch
    /// cannot saturate the external source.
    pub async fn resolve_batch(
        &self,
        pairs: &[(Coordinate, Coordinate)],
        mode: DistanceMode,
        context: ExecutionContext,
    ) -> Result<Vec<DistanceResult>, DistanceError> {
        let group_size = self.params.batch_group_size.max(1);
        let mut results = Vec::with_capacity(pairs.len());

        for (group_index, group) in pairs.chunks(group_size).enumerate() {
            let lookups = group
                .iter()
                .map(|(origin, destination)| self.resolve(*origin, *destination, mode, context));

            for (offset, outcome) in join_all(lookups).await.into_iter().enumerate() {
                match outcome {
                    Ok(result) => results.push(result),
                    Err(error) => {
                        let index = group_index * group_size + offset;
                        debug!(index, "batch aborted");
                        return Err(DistanceError::BatchAborted {
                            index,
                            completed: results.len(),
                            source: Box::new(error),
                        });
                    }
                }
            }
        }

        Ok(results)
    }
}
