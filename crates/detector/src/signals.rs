//! Privacy signals, verdicts and the merged alert report.

use networking::{AnalyzeRequest, AnalyzeResponse};
use serde::Serialize;
use serde_json::{Map, Value};

/// Risk label used when the analysis service could not be reached.
pub const SERVER_UNAVAILABLE: &str = "Server unavailable";

/// Risk label used when the service answered without a risk level.
pub const UNKNOWN_RISK: &str = "Unknown";

/// Point-in-time record of the privacy signals a page exposes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacySignalSnapshot {
    /// Number of non-empty cookie entries.
    pub cookie_count: usize,
    /// Leading cookie entries in page order.
    pub cookie_preview: Vec<String>,
    /// Script URLs matching a tracker pattern.
    pub tracker_urls: Vec<String>,
    /// Scripts served from a host other than the page's.
    pub third_party_script_count: usize,
}

impl PrivacySignalSnapshot {
    pub fn tracker_count(&self) -> usize {
        self.tracker_urls.len()
    }

    /// Wire body for the analysis service.
    pub fn to_request(&self, url: &str) -> AnalyzeRequest {
        AnalyzeRequest::new(url)
            .cookies(self.cookie_count, self.cookie_preview.clone())
            .trackers(self.tracker_urls.clone())
            .third_party_scripts(self.third_party_script_count)
    }
}

/// Risk assessment attached to a snapshot.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisVerdict {
    pub risk_level: String,
    pub server_reachable: bool,
    /// The service response behind a server verdict.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<AnalyzeResponse>,
}

impl AnalysisVerdict {
    /// Verdict from a successful service response.
    pub fn from_response(response: AnalyzeResponse) -> Self {
        let risk_level = response
            .risk()
            .map(display_label)
            .unwrap_or_else(|| UNKNOWN_RISK.to_string());
        Self {
            risk_level,
            server_reachable: true,
            response: Some(response),
        }
    }

    /// Fallback verdict for an unreachable service.
    pub fn unavailable() -> Self {
        Self {
            risk_level: SERVER_UNAVAILABLE.to_string(),
            server_reachable: false,
            response: None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        !self.server_reachable
    }
}

/// `low` -> `Low`, `HIGH` -> `High`.
fn display_label(risk: &str) -> String {
    let lower = risk.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Everything the alert shows: the snapshot with the verdict layered on top.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertReport {
    pub url: String,
    pub cookie_count: usize,
    pub cookie_preview: Vec<String>,
    pub tracker_urls: Vec<String>,
    pub tracker_count: usize,
    pub third_party_script_count: usize,
    pub risk_level: String,
    pub server_reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Remaining service fields.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl AlertReport {
    /// Merge a verdict over a snapshot.
    ///
    /// Counts always come from the local observation. Counts the service
    /// echoes back stay in `extra` untouched.
    pub fn merge(url: &str, snapshot: &PrivacySignalSnapshot, verdict: &AnalysisVerdict) -> Self {
        let response = verdict.response.as_ref();
        let extra: Map<String, Value> = response
            .map(|r| {
                r.extra
                    .iter()
                    .filter(|(key, _)| key.as_str() != "summary")
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            url: url.to_string(),
            cookie_count: snapshot.cookie_count,
            cookie_preview: snapshot.cookie_preview.clone(),
            tracker_urls: snapshot.tracker_urls.clone(),
            tracker_count: snapshot.tracker_count(),
            third_party_script_count: snapshot.third_party_script_count,
            risk_level: verdict.risk_level.clone(),
            server_reachable: verdict.server_reachable,
            summary: response.and_then(AnalyzeResponse::summary).map(str::to_string),
            extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot() -> PrivacySignalSnapshot {
        PrivacySignalSnapshot {
            cookie_count: 3,
            cookie_preview: vec!["a=1".into(), "b=2".into(), "c=3".into()],
            tracker_urls: vec!["https://ads.doubleclick.net/x.js".into()],
            third_party_script_count: 1,
        }
    }

    fn response(value: Value) -> AnalyzeResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_snapshot_to_request() {
        let request = snapshot().to_request("https://shop.example.com/");
        assert_eq!(request.cookie_count, 3);
        assert_eq!(request.trackers.len(), 1);
        assert_eq!(request.third_party_scripts_count, 1);
    }

    #[test]
    fn test_verdict_labels() {
        let verdict = AnalysisVerdict::from_response(response(json!({"privacy_risk": "medium"})));
        assert_eq!(verdict.risk_level, "Medium");
        assert!(verdict.server_reachable);

        let verdict = AnalysisVerdict::from_response(response(json!({"summary": "ok"})));
        assert_eq!(verdict.risk_level, UNKNOWN_RISK);

        let verdict = AnalysisVerdict::unavailable();
        assert_eq!(verdict.risk_level, SERVER_UNAVAILABLE);
        assert!(verdict.is_fallback());
    }

    #[test]
    fn test_local_counts_win_over_echoed_counts() {
        let verdict = AnalysisVerdict::from_response(response(json!({
            "privacy_risk": "high",
            "cookies_detected": 42,
            "cookieCount": 42,
            "tracker_count": 9,
            "summary": "Detected 42 cookies",
            "queued": true
        })));
        let report = AlertReport::merge("https://shop.example.com/", &snapshot(), &verdict);

        assert_eq!(report.cookie_count, 3);
        assert_eq!(report.tracker_count, 1);
        assert_eq!(report.third_party_script_count, 1);
        assert_eq!(report.risk_level, "High");
        assert_eq!(report.summary.as_deref(), Some("Detected 42 cookies"));
        assert_eq!(report.extra.get("queued"), Some(&json!(true)));
        assert_eq!(report.extra.get("tracker_count"), Some(&json!(9)));
        assert_eq!(report.extra.get("cookies_detected"), Some(&json!(42)));
        assert!(!report.extra.contains_key("summary"));
    }

    #[test]
    fn test_zero_echoed_counts_do_not_hide_local_signals() {
        let verdict = AnalysisVerdict::from_response(response(json!({
            "privacy_risk": "low",
            "tracker_count": 0,
            "third_party_script_count": 0
        })));
        let report = AlertReport::merge("https://shop.example.com/", &snapshot(), &verdict);

        assert_eq!(report.tracker_count, report.tracker_urls.len());
        assert_eq!(report.tracker_count, 1);
        assert_eq!(report.third_party_script_count, 1);
    }

    #[test]
    fn test_fallback_report_keeps_local_signals() {
        let report = AlertReport::merge("https://a.test/", &snapshot(), &AnalysisVerdict::unavailable());
        assert_eq!(report.tracker_count, 1);
        assert!(!report.server_reachable);
        assert_eq!(report.summary, None);
    }
}
