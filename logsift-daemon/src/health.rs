//! Health reporting.
//!
//! The daemon is healthy when the rule store answers. The report also carries
//! the number of active services and decoders seen in that fetch.

use std::time::Instant;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use logsift_engine::RuleStore;

/// Reason reported to clients when the rule store cannot be read.
pub const UNHEALTHY_REASON: &str = "rule store unavailable";

/// Daemon health status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum HealthStatus {
    Healthy,
    /// Rule store fetch failed (reason).
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// Active rule counts from the last fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleCounts {
    pub services: usize,
    pub decoders: usize,
}

/// Health report returned by `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct DaemonHealth {
    pub status: HealthStatus,
    /// Daemon uptime in seconds since start.
    pub uptime_secs: u64,
    pub version: &'static str,
    pub rules: RuleCounts,
}

impl IntoResponse for DaemonHealth {
    fn into_response(self) -> Response {
        let status = if self.status.is_healthy() {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };
        (status, Json(self)).into_response()
    }
}

/// Probe the rule store and build a health report.
pub async fn check<S: RuleStore>(store: &S, started_at: Instant) -> DaemonHealth {
    let (status, rules) = match store.fetch_snapshot().await {
        Ok(snapshot) => (
            HealthStatus::Healthy,
            RuleCounts {
                services: snapshot.services.len(),
                decoders: snapshot.decoders.len(),
            },
        ),
        Err(e) => {
            // the store error names file paths, keep it in the log only
            tracing::warn!(error = %e, "health check: rule store unavailable");
            (
                HealthStatus::Unhealthy(UNHEALTHY_REASON.to_owned()),
                RuleCounts::default(),
            )
        }
    };

    DaemonHealth {
        status,
        uptime_secs: started_at.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION"),
        rules,
    }
}

#[cfg(test)]
mod tests {
    use logsift_engine::{MemoryRuleStore, YamlRuleStore};

    use super::*;

    #[tokio::test]
    async fn test_healthy_when_store_answers() {
        let store = MemoryRuleStore::from_yaml(
            r#"
services:
  - id: ssh
    name: SSH
    prefilter_keyword: sshd
    decoders:
      - { id: a, name: A, pattern: "a" }
      - { id: b, name: B, pattern: "b", active: false }
"#,
        )
        .expect("valid rules");

        let health = check(&store, Instant::now()).await;
        assert!(health.status.is_healthy());
        assert_eq!(
            health.rules,
            RuleCounts {
                services: 1,
                decoders: 1
            },
            "inactive decoder excluded"
        );
    }

    #[tokio::test]
    async fn test_unhealthy_when_store_fails() {
        let store = YamlRuleStore::new("/nonexistent/rules.yml");
        let health = check(&store, Instant::now()).await;
        assert!(matches!(health.status, HealthStatus::Unhealthy(_)));
        assert_eq!(health.rules, RuleCounts::default());
    }

    #[tokio::test]
    async fn test_unhealthy_reason_hides_store_detail() {
        let store = YamlRuleStore::new("/nonexistent/secret-dir/rules.yml");
        let health = check(&store, Instant::now()).await;
        assert_eq!(health.status, HealthStatus::Unhealthy(UNHEALTHY_REASON.to_owned()));

        let body = serde_json::to_string(&health).expect("serialize");
        assert!(!body.contains("secret-dir"), "store detail leaked: {body}");
        assert!(!body.contains("No such file"), "io reason leaked: {body}");
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_value(HealthStatus::Unhealthy("down".to_owned()))
            .expect("serialize");
        assert_eq!(json["Unhealthy"].as_str(), Some("down"));
        assert_eq!(
            serde_json::to_value(HealthStatus::Healthy).expect("serialize"),
            serde_json::json!("Healthy")
        );
    }
}
