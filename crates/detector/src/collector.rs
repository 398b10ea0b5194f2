//! Signal collection from the host page.

use common::Vocabulary;
use dom::Document;
use url::Url;

use crate::config::DetectorConfig;
use crate::signals::PrivacySignalSnapshot;

/// Extracts a [`PrivacySignalSnapshot`] from the page as it is right now.
#[derive(Clone, Debug)]
pub struct SignalCollector {
    trackers: Vocabulary,
    max_preview: usize,
}

impl SignalCollector {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            trackers: config.tracker_vocabulary(),
            max_preview: config.max_cookie_preview,
        }
    }

    /// Collect the current signals. Never fails; an empty page yields an
    /// empty snapshot.
    pub fn collect(&self, document: &Document) -> PrivacySignalSnapshot {
        let cookies = split_cookies(&document.cookie);
        let sources = document.script_sources();
        let page_host = document.host();

        let tracker_urls = sources
            .iter()
            .filter(|src| self.trackers.matches(src))
            .cloned()
            .collect();

        let third_party_script_count = sources
            .iter()
            .filter(|src| is_third_party(src, page_host))
            .count();

        PrivacySignalSnapshot {
            cookie_count: cookies.len(),
            cookie_preview: cookies.into_iter().take(self.max_preview).collect(),
            tracker_urls,
            third_party_script_count,
        }
    }
}

/// Split a `document.cookie` string into its non-blank entries.
pub fn split_cookies(cookie: &str) -> Vec<String> {
    cookie
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// A script is third-party when its absolute URL names a host other than the
/// page's. Relative or unparseable sources count as same-origin.
fn is_third_party(src: &str, page_host: Option<&str>) -> bool {
    match Url::parse(src) {
        Ok(url) => match url.host_str() {
            Some(host) => page_host != Some(host),
            None => false,
        },
        Err(err) => {
            tracing::trace!("Ignoring script source {:?}: {}", src, err);
            false
        }
    }
}
