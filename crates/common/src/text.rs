//! Case-insensitive substring vocabularies.
//!
//! Tracker detection, sensitive-page detection and login-click detection all
//! reduce to "does the lower-cased haystack contain any of these terms".

use std::fmt;

/// Check whether `haystack` contains any of `needles`, ignoring case.
///
/// Needles are expected to be lower-case already.
pub fn contains_any<S: AsRef<str>>(haystack: &str, needles: &[S]) -> bool {
    let lower = haystack.to_lowercase();
    needles
        .iter()
        .any(|needle| !needle.as_ref().is_empty() && lower.contains(needle.as_ref()))
}

/// A fixed set of lower-case match terms.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Vocabulary {
    terms: Vec<String>,
}

impl Vocabulary {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            terms: terms
                .into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// Check whether `text` mentions any term.
    #[inline]
    pub fn matches(&self, text: &str) -> bool {
        contains_any(text, &self.terms)
    }

    /// Return the first term found in `text`.
    pub fn first_match(&self, text: &str) -> Option<&str> {
        let lower = text.to_lowercase();
        self.terms
            .iter()
            .find(|t| lower.contains(t.as_str()))
            .map(|t| t.as_str())
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl fmt::Debug for Vocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.terms.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_any_ignores_case() {
        assert!(contains_any("https://WWW.Google-Analytics.com/ga.js", &["analytics"]));
        assert!(!contains_any("https://cdn.example.com/app.js", &["analytics", "pixel"]));
    }

    #[test]
    fn test_empty_needle_never_matches() {
        assert!(!contains_any("anything", &[""]));
    }

    #[test]
    fn test_vocabulary_normalizes_terms() {
        let vocab = Vocabulary::new(["  Sign In ", "", "LOGIN"]);
        assert_eq!(vocab.len(), 2);
        assert!(vocab.matches("Please sign in to continue"));
        assert_eq!(vocab.first_match("User Login"), Some("login"));
        assert_eq!(vocab.first_match("nothing here"), None);
    }
}
