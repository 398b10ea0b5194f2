//! DOM Document implementation.

use crate::element::{ElementData, TagName};
use crate::node::NodeId;
use crate::tree::DomTree;
use parking_lot::RwLock;
use std::sync::Arc;
use url::Url;

/// Document ready state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadyState::Loading => "loading",
            ReadyState::Interactive => "interactive",
            ReadyState::Complete => "complete",
        }
    }
}

/// DOM Document.
pub struct Document {
    /// The DOM tree.
    pub tree: DomTree,
    /// Document URL.
    pub url: Url,
    /// Document title.
    pub title: String,
    /// Ready state.
    pub ready_state: ReadyState,
    /// Document element (<html>).
    pub document_element: Option<NodeId>,
    /// Head element.
    pub head: Option<NodeId>,
    /// Body element.
    pub body: Option<NodeId>,
    /// Script-visible cookie string (`document.cookie`).
    pub cookie: String,
}

impl Document {
    pub fn new(url: Url) -> Self {
        Self {
            tree: DomTree::new(),
            url,
            title: String::new(),
            ready_state: ReadyState::Loading,
            document_element: None,
            head: None,
            body: None,
            cookie: String::new(),
        }
    }

    /// Create a document with an empty `<html><head></head><body></body></html>`
    /// skeleton.
    pub fn with_skeleton(url: Url) -> Self {
        let mut doc = Self::new(url);
        doc.ensure_skeleton();
        doc
    }

    /// Host of the document URL, if it has one.
    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }

    /// Set the cookie string as a script would observe it.
    pub fn set_cookie(&mut self, cookie: &str) {
        self.cookie = cookie.to_string();
    }

    /// Create the html/head/body elements when they are missing.
    pub fn ensure_skeleton(&mut self) {
        let root = self.tree.root();

        let html = match self.document_element {
            Some(html) => html,
            None => {
                let html = self.create_element("html");
                self.tree.append_child(root, html);
                self.document_element = Some(html);
                html
            }
        };

        if self.head.is_none() {
            let head = self.create_element("head");
            let first = self.tree.first_child(html);
            self.tree.insert_before(html, head, first);
            self.head = Some(head);
        }

        if self.body.is_none() {
            let body = self.create_element("body");
            self.tree.append_child(html, body);
            self.body = Some(body);
        }
    }

    /// Create an element.
    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.tree.create_element(ElementData::new(TagName::new(tag_name)))
    }

    /// Create an element with attributes.
    pub fn create_element_with(&mut self, tag_name: &str, attrs: &[(&str, &str)]) -> NodeId {
        self.tree
            .create_element(ElementData::with_attributes(TagName::new(tag_name), attrs))
    }

    /// Create a text node.
    pub fn create_text_node(&mut self, content: &str) -> NodeId {
        self.tree.create_text(content.to_string())
    }

    /// Get element by ID.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree.find_element_by_id(id)
    }

    /// Get elements by tag name.
    pub fn get_elements_by_tag_name(&self, tag_name: &str) -> Vec<NodeId> {
        self.tree.find_elements_by_tag_name(tag_name)
    }

    /// Append a node to `<body>`, falling back to the document element and
    /// then the document root. Returns the parent used.
    pub fn append_to_body(&mut self, node: NodeId) -> NodeId {
        let parent = self
            .body
            .filter(|&b| self.tree.is_connected(b))
            .or(self.document_element)
            .unwrap_or_else(|| self.tree.root());
        self.tree.append_child(parent, node);
        parent
    }

    /// Source URLs of every `<script src>` in document order.
    ///
    /// Scripts whose `src` is empty or whitespace are skipped.
    pub fn script_sources(&self) -> Vec<String> {
        self.get_elements_by_tag_name("script")
            .into_iter()
            .filter_map(|id| self.tree.get_element(id))
            .filter_map(|elem| elem.get_attribute("src"))
            .map(str::trim)
            .filter(|src| !src.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Check whether the page has a password field.
    pub fn has_password_input(&self) -> bool {
        self.get_elements_by_tag_name("input")
            .into_iter()
            .filter_map(|id| self.tree.get_element(id))
            .any(|elem| elem.input_type().as_deref() == Some("password"))
    }

    /// Text of the page as a user would read it.
    pub fn visible_text(&self) -> String {
        let scope = self
            .body
            .filter(|&b| self.tree.contains_node(b))
            .unwrap_or_else(|| self.tree.root());
        self.tree.get_visible_text(scope)
    }

    /// Visible label of an element: its text, or its `value` attribute when it
    /// has no text (`<input type=submit value=...>`).
    pub fn element_label(&self, node: NodeId) -> String {
        let text = self.tree.get_visible_text(node);
        if !text.trim().is_empty() {
            return text;
        }
        self.tree
            .get_element(node)
            .and_then(|e| e.get_attribute("value"))
            .unwrap_or_default()
            .to_string()
    }

    /// Mark the document as parsed but still loading subresources.
    pub fn mark_interactive(&mut self) {
        self.ready_state = ReadyState::Interactive;
    }

    /// Mark document as completely loaded.
    pub fn finish_loading(&mut self) {
        self.ready_state = ReadyState::Complete;
    }

    /// Check whether parsing is still in progress.
    pub fn is_loading(&self) -> bool {
        self.ready_state == ReadyState::Loading
    }
}

/// Shared document reference.
pub type DocumentRef = Arc<RwLock<Document>>;
