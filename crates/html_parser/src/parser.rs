//! HTML Parser implementation.

use crate::convert::DomConverter;
use common::DetectorResult;
use dom::document::Document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::RcDom;
use url::Url;

/// Parser options.
#[derive(Clone, Debug)]
pub struct ParseOptions {
    /// Document URL.
    pub url: Url,
    /// Whether scripting is considered enabled (affects `<noscript>`).
    pub scripting_enabled: bool,
    /// Cookie string the page exposes to scripts.
    pub cookie: String,
}

impl ParseOptions {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            scripting_enabled: true,
            cookie: String::new(),
        }
    }

    pub fn scripting(mut self, enabled: bool) -> Self {
        self.scripting_enabled = enabled;
        self
    }

    pub fn cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = cookie.into();
        self
    }
}

/// HTML Parser.
pub struct HtmlParser {
    options: ParseOptions,
}

impl HtmlParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Parse HTML into a Document.
    ///
    /// The returned document is still in the `loading` state; firing
    /// `DOMContentLoaded` is left to the window that hosts it.
    pub fn parse(&self, html: &str) -> DetectorResult<Document> {
        let opts = ParseOpts {
            tree_builder: TreeBuilderOpts {
                scripting_enabled: self.options.scripting_enabled,
                ..Default::default()
            },
            ..Default::default()
        };

        let dom = parse_document(RcDom::default(), opts)
            .from_utf8()
            .read_from(&mut html.as_bytes())?;

        let mut document = Document::new(self.options.url.clone());
        document.set_cookie(&self.options.cookie);
        DomConverter::new(&mut document).convert(&dom);

        tracing::debug!(
            url = %document.url,
            nodes = document.tree.len(),
            "Parsed document"
        );

        Ok(document)
    }
}

/// Parse HTML string into a Document.
pub fn parse_html(html: &str, url: Url) -> DetectorResult<Document> {
    HtmlParser::new(ParseOptions::new(url)).parse(html)
}
