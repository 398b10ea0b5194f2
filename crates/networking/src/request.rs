//! Analysis request body.

use serde::{Deserialize, Serialize};

/// JSON body posted to the analysis endpoint.
///
/// `trackerCount` and `thirdPartyScriptCount` duplicate information already
/// carried by `trackers` and `thirdPartyScriptsCount`; the analysis service
/// scores risk from those two keys.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// URL of the analyzed page.
    pub url: String,
    /// Number of cookies visible to the page.
    pub cookie_count: usize,
    /// Leading cookie entries, in page order.
    pub cookie_preview: Vec<String>,
    /// Script URLs classified as trackers.
    pub trackers: Vec<String>,
    /// Number of scripts served from another host.
    pub third_party_scripts_count: usize,
    #[serde(default)]
    tracker_count: usize,
    #[serde(default)]
    third_party_script_count: usize,
}

impl AnalyzeRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set cookie count and preview.
    pub fn cookies(mut self, count: usize, preview: Vec<String>) -> Self {
        self.cookie_count = count;
        self.cookie_preview = preview;
        self
    }

    /// Set tracker URLs.
    pub fn trackers(mut self, trackers: Vec<String>) -> Self {
        self.tracker_count = trackers.len();
        self.trackers = trackers;
        self
    }

    /// Set the third-party script count.
    pub fn third_party_scripts(mut self, count: usize) -> Self {
        self.third_party_scripts_count = count;
        self.third_party_script_count = count;
        self
    }

    /// Serialize to the JSON body.
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_wire_keys() {
        let request = AnalyzeRequest::new("https://shop.example.com/login")
            .cookies(2, vec!["a=1".to_string(), "b=2".to_string()])
            .trackers(vec!["https://ads.doubleclick.net/x.js".to_string()])
            .third_party_scripts(1);

        let body: Value = serde_json::from_slice(&request.to_json().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "url": "https://shop.example.com/login",
                "cookieCount": 2,
                "cookiePreview": ["a=1", "b=2"],
                "trackers": ["https://ads.doubleclick.net/x.js"],
                "thirdPartyScriptsCount": 1,
                "trackerCount": 1,
                "thirdPartyScriptCount": 1
            })
        );
    }

    #[test]
    fn test_deserialize_without_aliases() {
        let request: AnalyzeRequest = serde_json::from_value(json!({
            "url": "https://a.test/",
            "cookieCount": 0,
            "cookiePreview": [],
            "trackers": [],
            "thirdPartyScriptsCount": 4
        }))
        .unwrap();
        assert_eq!(request.third_party_scripts_count, 4);
        assert_eq!(request.third_party_script_count, 0);
    }
}
