//! Health reporting
//!
//! The cache is an accelerator, so an unreachable cache only degrades the
//! service. An unreachable durable store takes it down.

use chrono::{DateTime, Utc};
use libris_domain::ports::providers::CacheProvider;
use libris_providers::database::DatabasePool;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Health status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Degraded,
    Down,
}

impl HealthStatus {
    /// Check if the service is operational (healthy or degraded)
    pub fn is_operational(&self) -> bool {
        matches!(self, Self::Up | Self::Degraded)
    }
}

/// Individual dependency check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl HealthCheck {
    fn new(name: &str, status: HealthStatus, elapsed: Duration) -> Self {
        Self {
            name: name.to_string(),
            status,
            response_time_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            error: None,
            details: None,
        }
    }

    fn with_error(mut self, error: String) -> Self {
        self.error = Some(error);
        self
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Overall health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub checks: Vec<HealthCheck>,
}

/// Checks the cache and (when configured) the database
#[derive(Clone)]
pub struct HealthChecker {
    cache: Arc<dyn CacheProvider>,
    database: Option<DatabasePool>,
    timeout: Duration,
}

impl HealthChecker {
    /// Create a checker; each check is bounded by `timeout`
    pub fn new(
        cache: Arc<dyn CacheProvider>,
        database: Option<DatabasePool>,
        timeout: Duration,
    ) -> Self {
        Self {
            cache,
            database,
            timeout,
        }
    }

    /// Run every check
    pub async fn check(&self) -> HealthResponse {
        let mut checks = vec![self.check_cache().await];
        if let Some(database) = &self.database {
            checks.push(self.check_database(database).await);
        }

        let status = if checks.iter().any(|c| c.name == "database" && c.status == HealthStatus::Down) {
            HealthStatus::Down
        } else if checks.iter().any(|c| c.status != HealthStatus::Up) {
            HealthStatus::Degraded
        } else {
            HealthStatus::Up
        };

        HealthResponse {
            status,
            timestamp: Utc::now(),
            checks,
        }
    }

    async fn check_cache(&self) -> HealthCheck {
        let started = Instant::now();
        let outcome = tokio::time::timeout(self.timeout, self.cache.stats()).await;
        let check = |status| HealthCheck::new("cache", status, started.elapsed());
        match outcome {
            Ok(Ok(stats)) => check(HealthStatus::Up).with_details(serde_json::json!({
                "provider": self.cache.provider_name(),
                "hit_rate": stats.hit_rate(),
                "entries": stats.entries,
            })),
            Ok(Err(e)) => check(HealthStatus::Degraded).with_error(e.to_string()),
            Err(_) => check(HealthStatus::Degraded).with_error("timed out".to_string()),
        }
    }

    async fn check_database(&self, database: &DatabasePool) -> HealthCheck {
        let started = Instant::now();
        let outcome = tokio::time::timeout(self.timeout, database.health_check()).await;
        let check = |status| HealthCheck::new("database", status, started.elapsed());
        match outcome {
            Ok(Ok(())) => {
                let pool = serde_json::to_value(database.stats()).unwrap_or_default();
                check(HealthStatus::Up).with_details(pool)
            }
            Ok(Err(e)) => check(HealthStatus::Down).with_error(e.to_string()),
            Err(_) => check(HealthStatus::Down).with_error("timed out".to_string()),
        }
    }
}

impl std::fmt::Debug for HealthChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthChecker")
            .field("cache", &self.cache.provider_name())
            .field("database", &self.database.is_some())
            .finish()
    }
}
