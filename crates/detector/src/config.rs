//! Detector configuration.

use common::{DetectorError, DetectorResult, Vocabulary};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::user_agent;

/// Substrings marking a script URL as a tracker.
pub const DEFAULT_TRACKER_PATTERNS: &[&str] = &[
    "analytics",
    "google-analytics",
    "doubleclick",
    "facebook",
    "pixel",
    "tracking",
];

/// Page text that marks a page as privacy sensitive.
pub const DEFAULT_SENSITIVE_KEYWORDS: &[&str] = &[
    "login",
    "sign in",
    "log in",
    "signin",
    "password",
    "username",
    "email",
    "create account",
    "register",
];

/// Labels of clickable elements that start a login flow.
pub const DEFAULT_LOGIN_CLICK_KEYWORDS: &[&str] = &["login", "sign in", "log in"];

/// Auto-dismiss delay used by [`DetectorConfig::auto_dismissing`].
pub const DEFAULT_AUTO_DISMISS_MS: u64 = 10_000;

/// Detector configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Analysis endpoint.
    pub endpoint: String,
    /// Hard limit on one analysis round-trip, in milliseconds.
    pub request_timeout_ms: u64,
    /// Delay between a login click and its dispatch, in milliseconds.
    pub click_debounce_ms: u64,
    /// Remove the alert after this many milliseconds. `None` keeps it until
    /// the user dismisses it.
    pub auto_dismiss_ms: Option<u64>,
    /// Maximum number of cookies listed in the preview.
    pub max_cookie_preview: usize,
    /// Tracker URL substrings.
    pub tracker_patterns: Vec<String>,
    /// Sensitive page keywords.
    pub sensitive_keywords: Vec<String>,
    /// Login click keywords.
    pub login_click_keywords: Vec<String>,
    /// User agent sent to the analysis service.
    pub user_agent: String,
}

impl DetectorConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults plus timed removal of the alert.
    pub fn auto_dismissing() -> Self {
        Self {
            auto_dismiss_ms: Some(DEFAULT_AUTO_DISMISS_MS),
            ..Self::default()
        }
    }

    /// Parse a JSON configuration. Missing fields take their defaults.
    pub fn from_json(json: &str) -> DetectorResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> DetectorResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> DetectorResult<()> {
        let endpoint = Url::parse(&self.endpoint)
            .map_err(|e| DetectorError::config(format!("endpoint {:?}: {}", self.endpoint, e)))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(DetectorError::config(format!(
                "endpoint must be http(s), got {}",
                endpoint.scheme()
            )));
        }
        if self.request_timeout_ms == 0 {
            return Err(DetectorError::config("request_timeout_ms must be positive"));
        }
        if self.auto_dismiss_ms == Some(0) {
            return Err(DetectorError::config("auto_dismiss_ms must be positive when set"));
        }
        Ok(())
    }

    /// Set the analysis endpoint.
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    /// Set the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the click debounce delay.
    pub fn with_click_debounce(mut self, delay: Duration) -> Self {
        self.click_debounce_ms = delay.as_millis() as u64;
        self
    }

    /// Set or clear the auto-dismiss delay.
    pub fn with_auto_dismiss(mut self, delay: Option<Duration>) -> Self {
        self.auto_dismiss_ms = delay.map(|d| d.as_millis() as u64);
        self
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn click_debounce(&self) -> Duration {
        Duration::from_millis(self.click_debounce_ms)
    }

    pub fn auto_dismiss(&self) -> Option<Duration> {
        self.auto_dismiss_ms.map(Duration::from_millis)
    }

    pub fn tracker_vocabulary(&self) -> Vocabulary {
        Vocabulary::new(&self.tracker_patterns)
    }

    pub fn sensitive_vocabulary(&self) -> Vocabulary {
        Vocabulary::new(&self.sensitive_keywords)
    }

    pub fn login_click_vocabulary(&self) -> Vocabulary {
        Vocabulary::new(&self.login_click_keywords)
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            endpoint: networking::client::DEFAULT_ENDPOINT.to_string(),
            request_timeout_ms: 3000,
            click_debounce_ms: 50,
            auto_dismiss_ms: None,
            max_cookie_preview: 10,
            tracker_patterns: to_strings(DEFAULT_TRACKER_PATTERNS),
            sensitive_keywords: to_strings(DEFAULT_SENSITIVE_KEYWORDS),
            login_click_keywords: to_strings(DEFAULT_LOGIN_CLICK_KEYWORDS),
            user_agent: user_agent(),
        }
    }
}

fn to_strings(terms: &[&str]) -> Vec<String> {
    terms.iter().map(|t| t.to_string()).collect()
}
