//! HTML loading and serialization.
//!
//! Pages are parsed with html5ever into an `RcDom` and converted into the
//! detector's own DOM; overlays and pages are rendered back to markup with
//! every text and attribute value escaped.

pub mod parser;
pub mod convert;
pub mod serializer;

pub use parser::{parse_html, HtmlParser, ParseOptions};
pub use serializer::{escape_html_attribute, escape_html_text, serialize_html, serialize_node};
