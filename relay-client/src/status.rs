//! Status probing against the relay's unauthenticated health endpoint.
//!
//! The probe is dashboard-facing and never returns an error: whatever goes
//! wrong - unreachable hosts, non-2xx answers, bodies that parse to nothing -
//! collapses into an offline report carrying the reason.

use std::fmt;

use relay_types::ServerStatus;

use crate::client::{endpoint_url, RelayConfig, STATUS_PATH};
use crate::transport::Transport;

/// Coarse service availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    /// A relay answered and reports the file server reachable.
    Online,
    /// No relay produced a usable answer, or one reported itself down.
    Offline,
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceStatus::Online => write!(f, "online"),
            ServiceStatus::Offline => write!(f, "offline"),
        }
    }
}

/// Outcome of a status probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    /// Availability verdict.
    pub status: ServiceStatus,
    /// Human-readable detail for the dashboard.
    pub message: String,
}

impl StatusReport {
    /// Whether the verdict is online.
    pub fn is_online(&self) -> bool {
        self.status == ServiceStatus::Online
    }

    fn offline(message: impl Into<String>) -> Self {
        Self {
            status: ServiceStatus::Offline,
            message: message.into(),
        }
    }
}

/// Probe each configured relay URL in order; the first parseable body wins.
pub(crate) async fn check<T: Transport>(transport: &T, config: &RelayConfig) -> StatusReport {
    let mut last_failure = String::from("no relay urls configured");

    for base in &config.base_urls {
        let url = endpoint_url(base, STATUS_PATH);
        match transport.fetch_status(&url, config.status_timeout).await {
            Ok(body) => match ServerStatus::from_body(&body) {
                Some(status) => return report_from(status),
                None => {
                    tracing::debug!(url = %url, "unrecognized status body, trying next relay");
                    last_failure = format!("unrecognized status body from {url}");
                }
            },
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "status probe failed, trying next relay");
                last_failure = e.to_string();
            }
        }
    }

    StatusReport::offline(last_failure)
}

fn report_from(status: ServerStatus) -> StatusReport {
    let verdict = if status.online {
        ServiceStatus::Online
    } else {
        ServiceStatus::Offline
    };

    let message = match (status.message, status.queue_size) {
        (Some(m), Some(q)) => format!("{m} ({q} queued)"),
        (Some(m), None) => m,
        (None, Some(q)) => format!("{q} request(s) queued"),
        (None, None) => match verdict {
            ServiceStatus::Online => "relay reachable".to_string(),
            ServiceStatus::Offline => "relay reports offline".to_string(),
        },
    };

    StatusReport {
        status: verdict,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::EnvelopeKey;
    use crate::transport::MockTransport;
    use serde_json::json;
    use std::time::Duration;

    fn config(urls: &[&str]) -> RelayConfig {
        RelayConfig::new(
            EnvelopeKey::random(),
            urls.iter().map(|u| u.to_string()).collect(),
        )
        .with_status_timeout(Duration::from_secs(10))
    }

    #[tokio::test]
    async fn nested_online_body_with_queue_size() {
        let transport = MockTransport::new();
        transport.queue_status_body(json!({"status": {"online": true, "queue_size": 3}}));

        let report = check(&transport, &config(&["https://relay.test"])).await;

        assert_eq!(report.status, ServiceStatus::Online);
        assert!(report.message.contains('3'));
    }

    #[tokio::test]
    async fn flat_offline_body() {
        let transport = MockTransport::new();
        transport.queue_status_body(json!({"online": false}));

        let report = check(&transport, &config(&["https://relay.test"])).await;

        assert_eq!(report.status, ServiceStatus::Offline);
        assert!(!report.is_online());
    }

    #[tokio::test]
    async fn failed_primary_falls_back() {
        let transport = MockTransport::new();
        transport.fail_status_matching("primary.test", "connect timeout");
        transport.queue_status_body(json!({"online": true, "message": "all good"}));

        let report = check(
            &transport,
            &config(&["https://primary.test", "https://fallback.test"]),
        )
        .await;

        assert!(report.is_online());
        assert_eq!(report.message, "all good");
        assert_eq!(transport.status_urls().len(), 2);
    }

    #[tokio::test]
    async fn every_failure_path_reads_offline() {
        let transport = MockTransport::new();
        transport.fail_status_matching("relay.test", "tunnel closed");

        let report = check(&transport, &config(&["https://relay.test"])).await;

        assert_eq!(report.status, ServiceStatus::Offline);
        assert!(report.message.contains("tunnel closed"));
    }

    #[tokio::test]
    async fn unrecognized_body_tries_next_then_reads_offline() {
        let transport = MockTransport::new();
        transport.queue_status_body(json!({"unexpected": "shape"}));
        transport.queue_status_body(json!("still wrong"));

        let report = check(
            &transport,
            &config(&["https://primary.test", "https://fallback.test"]),
        )
        .await;

        assert_eq!(report.status, ServiceStatus::Offline);
        assert!(report.message.contains("unrecognized status body"));
    }

    #[test]
    fn message_synthesis() {
        let report = report_from(ServerStatus {
            online: true,
            queue_size: None,
            message: None,
        });
        assert_eq!(report.message, "relay reachable");

        let report = report_from(ServerStatus {
            online: true,
            queue_size: Some(7),
            message: Some("draining".into()),
        });
        assert_eq!(report.message, "draining (7 queued)");

        let report = report_from(ServerStatus {
            online: false,
            queue_size: None,
            message: None,
        });
        assert_eq!(report.message, "relay reports offline");
    }

    #[test]
    fn service_status_display() {
        assert_eq!(ServiceStatus::Online.to_string(), "online");
        assert_eq!(ServiceStatus::Offline.to_string(), "offline");
    }
}
