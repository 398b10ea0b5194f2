//! Sensitive page detection.
//!
//! Coarse on purpose: a password field or any credential-related word in the
//! visible text is enough.

use common::Vocabulary;
use dom::Document;

use crate::config::DetectorConfig;

/// Why a page was considered sensitive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SensitivityReason {
    PasswordInput,
    Keyword(String),
}

#[derive(Clone, Debug)]
pub struct SensitivityDetector {
    keywords: Vocabulary,
}

impl SensitivityDetector {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            keywords: config.sensitive_vocabulary(),
        }
    }

    pub fn is_sensitive_page(&self, document: &Document) -> bool {
        self.evaluate(document).is_some()
    }

    /// Return the first reason the page is sensitive, if any.
    pub fn evaluate(&self, document: &Document) -> Option<SensitivityReason> {
        if document.has_password_input() {
            return Some(SensitivityReason::PasswordInput);
        }
        self.keywords
            .first_match(&document.visible_text())
            .map(|keyword| SensitivityReason::Keyword(keyword.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use html_parser::parse_html;
    use url::Url;

    fn detect(html: &str) -> Option<SensitivityReason> {
        let doc = parse_html(html, Url::parse("https://example.com/").unwrap()).unwrap();
        SensitivityDetector::new(&DetectorConfig::default()).evaluate(&doc)
    }

    #[test]
    fn test_password_input_without_keywords() {
        assert_eq!(
            detect(r#"<body><p>Welcome back</p><input type="password"></body>"#),
            Some(SensitivityReason::PasswordInput)
        );
    }

    #[test]
    fn test_keyword_in_text() {
        assert_eq!(
            detect("<body><h1>Create Account</h1></body>"),
            Some(SensitivityReason::Keyword("create account".to_string()))
        );
        assert!(detect("<body>Contact us by EMAIL</body>").is_some());
    }

    #[test]
    fn test_plain_page_is_not_sensitive() {
        assert_eq!(detect("<body><p>Weather forecast for today</p></body>"), None);

        let doc = parse_html(
            "<body><p>Weather forecast for today</p></body>",
            Url::parse("https://example.com/").unwrap(),
        )
        .unwrap();
        assert!(!SensitivityDetector::new(&DetectorConfig::default()).is_sensitive_page(&doc));
    }

    #[test]
    fn test_script_text_is_not_visible() {
        assert_eq!(
            detect(r#"<body><p>News</p><script>var login = 1;</script></body>"#),
            None
        );
    }
}
