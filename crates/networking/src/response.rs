//! Analysis service responses.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response of the analysis endpoint.
///
/// Only `privacy_risk` is interpreted; every other field the service sends is
/// kept in `extra` so it can be merged into the alert.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub privacy_risk: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnalyzeResponse {
    /// Risk label as sent by the service (`low`, `medium`, `high`, ...).
    pub fn risk(&self) -> Option<&str> {
        self.privacy_risk
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }

    /// Human readable summary, when the service provides one.
    pub fn summary(&self) -> Option<&str> {
        self.extra.get("summary").and_then(Value::as_str)
    }
}

/// Health document returned by `GET /health`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy") || self.status.eq_ignore_ascii_case("ok")
    }
}
