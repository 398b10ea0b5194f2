//! Bounded-latency submission to the analysis service.

use common::DetectorResult;
use networking::{AnalysisTransport, ClientError, HealthStatus, HttpClientBuilder};
use std::sync::Arc;
use std::time::Duration;

use crate::config::DetectorConfig;
use crate::signals::{AlertReport, AnalysisVerdict, PrivacySignalSnapshot};

/// Sends snapshots to the analysis service. Never fails: every error path
/// resolves to [`AnalysisVerdict::unavailable`].
pub struct AnalysisBridge {
    transport: Arc<dyn AnalysisTransport>,
    timeout: Duration,
}

impl AnalysisBridge {
    pub fn new(transport: Arc<dyn AnalysisTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Bridge over HTTP to the configured endpoint.
    pub fn from_config(config: &DetectorConfig) -> DetectorResult<Self> {
        let client = HttpClientBuilder::new()
            .endpoint(config.endpoint.as_str())
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| common::DetectorError::config(e.to_string()))?;
        Ok(Self::new(Arc::new(client), config.request_timeout()))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Submit one snapshot. A single attempt; on timeout the in-flight
    /// request is dropped.
    pub async fn submit(&self, url: &str, snapshot: &PrivacySignalSnapshot) -> AnalysisVerdict {
        let request = snapshot.to_request(url);

        match tokio::time::timeout(self.timeout, self.transport.analyze(&request)).await {
            Ok(Ok(response)) => {
                let verdict = AnalysisVerdict::from_response(response);
                tracing::info!(url, risk = %verdict.risk_level, "Analysis complete");
                verdict
            }
            Ok(Err(err)) => {
                tracing::warn!(url, "Analysis request failed: {}", err);
                AnalysisVerdict::unavailable()
            }
            Err(_) => {
                tracing::warn!(url, "Analysis request timed out after {:?}", self.timeout);
                AnalysisVerdict::unavailable()
            }
        }
    }

    /// Submit and merge the verdict over the snapshot.
    pub async fn analyze(&self, url: &str, snapshot: &PrivacySignalSnapshot) -> AlertReport {
        let verdict = self.submit(url, snapshot).await;
        AlertReport::merge(url, snapshot, &verdict)
    }

    /// Query the service health under the same timeout.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        tokio::time::timeout(self.timeout, self.transport.health())
            .await
            .map_err(|_| ClientError::Timeout)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::SERVER_UNAVAILABLE;
    use crate::testing::FakeTransport;
    use serde_json::json;

    fn snapshot() -> PrivacySignalSnapshot {
        PrivacySignalSnapshot {
            cookie_count: 2,
            cookie_preview: vec!["a=1".into(), "b=2".into()],
            tracker_urls: vec![],
            third_party_script_count: 0,
        }
    }

    #[tokio::test]
    async fn test_server_verdict() {
        let transport = Arc::new(FakeTransport::respond(json!({
            "privacy_risk": "low",
            "cookies_detected": 99
        })));
        let bridge = AnalysisBridge::new(transport.clone(), Duration::from_secs(3));

        let report = bridge.analyze("https://a.test/", &snapshot()).await;
        assert_eq!(report.risk_level, "Low");
        assert!(report.server_reachable);
        assert_eq!(report.cookie_count, 2);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://a.test/");
        assert_eq!(requests[0].cookie_preview, vec!["a=1", "b=2"]);
    }

    #[tokio::test]
    async fn test_transport_error_falls_back() {
        let transport = Arc::new(FakeTransport::fail());
        let bridge = AnalysisBridge::new(transport.clone(), Duration::from_secs(3));

        let verdict = bridge.submit("https://a.test/", &snapshot()).await;
        assert_eq!(verdict, AnalysisVerdict::unavailable());
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back() {
        let transport = Arc::new(FakeTransport::hang());
        let bridge = AnalysisBridge::new(transport.clone(), Duration::from_millis(3000));

        let started = tokio::time::Instant::now();
        let verdict = bridge.submit("https://a.test/", &snapshot()).await;

        assert_eq!(verdict.risk_level, SERVER_UNAVAILABLE);
        assert!(!verdict.server_reachable);
        assert!(started.elapsed() >= Duration::from_millis(3000));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_http_endpoint_falls_back() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = DetectorConfig::default()
            .with_endpoint(&format!("http://{}/analyze_url", addr))
            .with_request_timeout(Duration::from_millis(500));
        let bridge = AnalysisBridge::from_config(&config).unwrap();

        let report = bridge.analyze("https://a.test/", &snapshot()).await;
        assert!(!report.server_reachable);
        assert_eq!(report.risk_level, SERVER_UNAVAILABLE);
        assert_eq!(report.cookie_count, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_health_timeout() {
        let bridge = AnalysisBridge::new(Arc::new(FakeTransport::hang()), Duration::from_millis(100));
        assert!(matches!(bridge.health().await, Err(ClientError::Timeout)));
    }
}
