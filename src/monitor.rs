//! Monitoring data source
//!
//! The monitoring screen reads metrics, recent events and tracked entities
//! from a local JSON API. The API is optional: when it cannot be reached the
//! screen still renders, from synthetic data tagged with the reason.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use rand::Rng;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::{HostpilotError, Result};

const CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    pub value: f64,
    #[serde(default)]
    pub unit: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorEvent {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub status: String,
}

/// Where a snapshot came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataOrigin {
    Live,
    Synthetic { reason: String },
}

impl DataOrigin {
    pub fn is_live(&self) -> bool {
        matches!(self, DataOrigin::Live)
    }
}

#[derive(Debug, Clone)]
pub struct MonitorSnapshot {
    pub metrics: Vec<Metric>,
    pub events: Vec<MonitorEvent>,
    pub entities: Vec<Entity>,
    pub origin: DataOrigin,
    pub fetched_at: DateTime<Local>,
}

#[async_trait]
pub trait MetricsSource: Send + Sync {
    async fn fetch(&self) -> Result<MonitorSnapshot>;
}

// ═══════════════════════════════════════════════════════════════
// LIVE
// ═══════════════════════════════════════════════════════════════

/// Reads `GET {base}/api/metrics`, `/api/events` and `/api/entities`
#[derive(Debug, Clone)]
pub struct HttpMetricsSource {
    base: Url,
    client: Client,
}

impl HttpMetricsSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = parse_base(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .user_agent(concat!("hostpilot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HostpilotError::MonitoringUnavailable {
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self { base, client })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = self
            .base
            .join(endpoint)
            .map_err(|e| HostpilotError::InvalidMonitoringUrl {
                url: self.base.to_string(),
                reason: e.to_string(),
            })?;
        debug!(%url, "monitoring request");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| unavailable(&url, e))?;

        if !response.status().is_success() {
            return Err(HostpilotError::MonitoringUnavailable {
                reason: format!("{} returned {}", url, response.status()),
            });
        }

        let body = response.bytes().await.map_err(|e| unavailable(&url, e))?;
        decode(&url, &body)
    }
}

/// Decode one endpoint body; malformed JSON makes the API unavailable
fn decode<T: DeserializeOwned>(url: &Url, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| HostpilotError::MonitoringUnavailable {
        reason: format!(
            "{} returned malformed JSON (line {}, column {}): {}",
            url,
            e.line(),
            e.column(),
            e
        ),
    })
}

#[async_trait]
impl MetricsSource for HttpMetricsSource {
    async fn fetch(&self) -> Result<MonitorSnapshot> {
        let (metrics, events, entities) = tokio::try_join!(
            self.get::<Vec<Metric>>("api/metrics"),
            self.get::<Vec<MonitorEvent>>("api/events"),
            self.get::<Vec<Entity>>("api/entities"),
        )?;

        Ok(MonitorSnapshot {
            metrics,
            events,
            entities,
            origin: DataOrigin::Live,
            fetched_at: Local::now(),
        })
    }
}

/// Validate a base URL and make it joinable (trailing slash)
pub fn parse_base(raw: &str) -> Result<Url> {
    let invalid = |reason: String| HostpilotError::InvalidMonitoringUrl {
        url: raw.to_string(),
        reason,
    };

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn unavailable(url: &Url, e: reqwest::Error) -> HostpilotError {
    let reason = if e.is_timeout() {
        format!("{} timed out", url)
    } else if e.is_connect() {
        format!("cannot connect to {}", url)
    } else {
        format!("{}: {}", url, e)
    };
    HostpilotError::MonitoringUnavailable { reason }
}

// ═══════════════════════════════════════════════════════════════
// SYNTHETIC
// ═══════════════════════════════════════════════════════════════

/// Plausible host metrics, for when no monitoring API runs
#[derive(Debug, Clone, Default)]
pub struct SyntheticMetricsSource;

impl SyntheticMetricsSource {
    pub fn generate(&self, reason: impl Into<String>) -> MonitorSnapshot {
        let mut rng = rand::thread_rng();
        let now = Local::now();

        let cpu: f64 = rng.gen_range(2.0..85.0);
        let mem: f64 = rng.gen_range(20.0..90.0);
        let disk: f64 = rng.gen_range(10.0..95.0);
        let load: f64 = rng.gen_range(0.05..4.0);

        let metrics = vec![
            metric("cpu", cpu, "%"),
            metric("memory", mem, "%"),
            metric("disk", disk, "%"),
            metric("load1", load, ""),
        ];

        let mut events = vec![MonitorEvent {
            timestamp: now.format("%H:%M:%S").to_string(),
            severity: Severity::Info,
            message: "synthetic data: monitoring API not reachable".to_string(),
        }];
        if disk > 85.0 {
            events.push(MonitorEvent {
                timestamp: now.format("%H:%M:%S").to_string(),
                severity: Severity::Warning,
                message: format!("disk usage at {:.0}%", disk),
            });
        }
        if cpu > 80.0 {
            events.push(MonitorEvent {
                timestamp: now.format("%H:%M:%S").to_string(),
                severity: Severity::Critical,
                message: format!("cpu usage at {:.0}%", cpu),
            });
        }

        let entities = ["sshd", "cron", "journald"]
            .iter()
            .map(|id| Entity {
                id: id.to_string(),
                kind: "service".to_string(),
                status: "running".to_string(),
            })
            .collect();

        MonitorSnapshot {
            metrics,
            events,
            entities,
            origin: DataOrigin::Synthetic {
                reason: reason.into(),
            },
            fetched_at: now,
        }
    }
}

#[async_trait]
impl MetricsSource for SyntheticMetricsSource {
    async fn fetch(&self) -> Result<MonitorSnapshot> {
        Ok(self.generate("no monitoring API configured"))
    }
}

fn metric(name: &str, value: f64, unit: &str) -> Metric {
    Metric {
        name: name.to_string(),
        value: (value * 10.0).round() / 10.0,
        unit: unit.to_string(),
    }
}

// ═══════════════════════════════════════════════════════════════
// FALLBACK
// ═══════════════════════════════════════════════════════════════

/// Live source first, synthetic data on any error. Never fails.
pub struct FallbackMetricsSource {
    primary: Box<dyn MetricsSource>,
    synthetic: SyntheticMetricsSource,
}

impl FallbackMetricsSource {
    pub fn new(primary: Box<dyn MetricsSource>) -> Self {
        Self {
            primary,
            synthetic: SyntheticMetricsSource,
        }
    }

    /// HTTP source for `url`; an invalid URL degrades to synthetic-only
    pub fn from_url(url: &str, timeout: Duration) -> Self {
        match HttpMetricsSource::new(url, timeout) {
            Ok(http) => Self::new(Box::new(http)),
            Err(e) => {
                warn!("monitoring disabled: {}", e);
                Self::new(Box::new(Unavailable(e.to_string())))
            }
        }
    }
}

#[async_trait]
impl MetricsSource for FallbackMetricsSource {
    async fn fetch(&self) -> Result<MonitorSnapshot> {
        match self.primary.fetch().await {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                warn!(code = e.code(), "monitoring fetch failed, using synthetic data: {}", e);
                Ok(self.synthetic.generate(e.to_string()))
            }
        }
    }
}

/// A source that always fails with a fixed reason
struct Unavailable(String);

#[async_trait]
impl MetricsSource for Unavailable {
    async fn fetch(&self) -> Result<MonitorSnapshot> {
        Err(HostpilotError::MonitoringUnavailable {
            reason: self.0.clone(),
        })
    }
}
