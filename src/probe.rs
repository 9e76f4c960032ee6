//! The probe primitive: one bounded request against one relay.
//!
//! A probe never fails as a Rust error. Every way a request can go wrong is
//! folded into the [`Outcome`] classification so retry policy can live
//! entirely in the state machine layer.

use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use reqwest::StatusCode;

use crate::registry::Target;
use crate::settings::Settings;

/// Classification of a single probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The relay answered with HTTP 200.
    Success,
    /// No response within the timeout bound.
    Timeout,
    /// A definitive non-timeout error: any other HTTP status, or a
    /// transport-level failure. Carries a short classification code
    /// ("403", "connect", ...).
    Failure(String),
}

/// Result of one probe: elapsed wall-clock time plus the outcome.
///
/// Latency is recorded regardless of outcome.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub latency: Duration,
    pub outcome: Outcome,
}

impl ProbeReport {
    pub fn latency_ms(&self) -> u64 {
        self.latency.as_millis() as u64
    }
}

/// A source of probe results.
///
/// The orchestration and state machine layers only see this trait, so tests
/// can drive them with scripted probers.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, target: &Target) -> ProbeReport;
}

/// Probes relays over HTTP with a hard per-request timeout.
pub struct HttpProber {
    client: reqwest::Client,
    base_url: String,
    credential: String,
    timeout: Duration,
}

impl HttpProber {
    pub fn new(settings: &Settings, credential: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("pulseboard/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            credential: credential.to_string(),
            timeout: settings.probe_timeout(),
        })
    }

    fn ping_url(&self, target: &Target) -> String {
        format!("{}/v1/relays/{}/ping", self.base_url, target.id)
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, target: &Target) -> ProbeReport {
        let started = Instant::now();
        let result = self
            .client
            .get(self.ping_url(target))
            .bearer_auth(&self.credential)
            .timeout(self.timeout)
            .send()
            .await;
        let latency = started.elapsed();

        let outcome = match result {
            Ok(response) => {
                let status = response.status();
                if status == StatusCode::OK {
                    Outcome::Success
                } else {
                    Outcome::Failure(status.as_u16().to_string())
                }
            }
            Err(err) if err.is_timeout() => Outcome::Timeout,
            Err(err) => Outcome::Failure(classify_transport_error(&err)),
        };

        tracing::debug!(
            relay = %target.id,
            ms = latency.as_millis() as u64,
            outcome = ?outcome,
            "probe resolved"
        );

        ProbeReport { latency, outcome }
    }
}

/// Short tag for a non-timeout transport error.
fn classify_transport_error(err: &reqwest::Error) -> String {
    if err.is_connect() {
        "connect".to_string()
    } else if err.is_builder() || err.is_request() {
        "request".to_string()
    } else if err.is_body() || err.is_decode() {
        "body".to_string()
    } else {
        "transport".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Tier;

    #[test]
    fn ping_url_joins_base_and_id() {
        let settings = Settings {
            base_url: "https://relay.pulseboard.dev/".to_string(),
            ..Settings::default()
        };
        let prober = HttpProber::new(&settings, "key").unwrap();
        let target = Target::new("use1", "US East (N. Virginia)", Tier::Core);
        assert_eq!(
            prober.ping_url(&target),
            "https://relay.pulseboard.dev/v1/relays/use1/ping"
        );
    }

    #[test]
    fn report_latency_in_whole_milliseconds() {
        let report = ProbeReport {
            latency: Duration::from_micros(102_700),
            outcome: Outcome::Success,
        };
        assert_eq!(report.latency_ms(), 102);
    }
}
