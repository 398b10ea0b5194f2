//! Markup output for documents and overlay subtrees.
//!
//! Text and attribute values are always escaped. Children of raw-text
//! elements (script, style) are written verbatim since the tokenizer never
//! decoded them in the first place.

use dom::document::Document;
use dom::element::ElementData;
use dom::node::{NodeData, NodeId};
use dom::tree::DomTree;

/// Render a whole document, doctype included.
pub fn serialize_html(document: &Document) -> String {
    let mut out = String::from("<!DOCTYPE html>\n");
    let tree = &document.tree;
    for child in tree.children(tree.root()) {
        write_node(tree, child, false, &mut out);
    }
    out
}

/// Outer HTML of `node`.
pub fn serialize_node(tree: &DomTree, node: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, node, false, &mut out);
    out
}

fn write_node(tree: &DomTree, node: NodeId, raw: bool, out: &mut String) {
    let Some(n) = tree.get(node) else { return };
    match &n.data {
        NodeData::Document => {
            for child in tree.children(node) {
                write_node(tree, child, false, out);
            }
        }
        NodeData::Element(elem) => write_element(tree, node, elem, out),
        NodeData::Text { content } if raw => out.push_str(content),
        NodeData::Text { content } => out.push_str(&escape_html_text(content)),
        NodeData::Comment { content } => {
            out.push_str("<!--");
            out.push_str(&content.replace("--", "- -"));
            out.push_str("-->");
        }
    }
}

fn write_element(tree: &DomTree, node: NodeId, elem: &ElementData, out: &mut String) {
    let tag = elem.tag_name.as_str();
    out.push('<');
    out.push_str(tag);
    for (name, value) in elem.attributes.iter() {
        out.push(' ');
        out.push_str(name);
        if !value.is_empty() {
            out.push_str("=\"");
            out.push_str(&escape_html_attribute(value));
            out.push('"');
        }
    }
    out.push('>');

    if elem.is_void() {
        return;
    }

    let raw = elem.is_raw_text();
    for child in tree.children(node) {
        write_node(tree, child, raw, out);
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn escape(value: &str, quotes: bool) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if quotes => escaped.push_str("&quot;"),
            '\'' if quotes => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escape text content.
pub fn escape_html_text(text: &str) -> String {
    escape(text, false)
}

/// Escape an attribute value for use inside double quotes.
pub fn escape_html_attribute(value: &str) -> String {
    escape(value, true)
}
