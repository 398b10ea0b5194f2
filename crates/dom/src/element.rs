//! Element payloads.

use crate::attributes::AttributeMap;
use bitflags::bitflags;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

static TAG_NAMES: Lazy<Mutex<HashSet<Arc<str>>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Lower-case tag name, interned so every `div` shares one allocation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TagName(Arc<str>);

impl TagName {
    pub fn new(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        let mut names = TAG_NAMES.lock();
        if let Some(existing) = names.get(lower.as_str()) {
            return TagName(existing.clone());
        }
        let interned: Arc<str> = Arc::from(lower);
        names.insert(interned.clone());
        TagName(interned)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for TagName {
    fn eq(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl PartialEq<&str> for TagName {
    fn eq(&self, other: &&str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ElementFlags: u8 {
        /// No closing tag.
        const VOID = 1;
        /// Children are written out unescaped (script, style).
        const RAW_TEXT = 1 << 1;
        /// Carries the `hidden` attribute.
        const HIDDEN = 1 << 2;
        /// Content never rendered as page text (template, noscript).
        const INERT = 1 << 3;
    }
}

impl ElementFlags {
    fn for_tag(tag: &str) -> Self {
        match tag {
            "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link"
            | "meta" | "param" | "source" | "track" | "wbr" => ElementFlags::VOID,
            "script" | "style" => ElementFlags::RAW_TEXT,
            "template" | "noscript" => ElementFlags::INERT,
            _ => ElementFlags::empty(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ElementData {
    pub tag_name: TagName,
    pub attributes: AttributeMap,
    pub flags: ElementFlags,
}

impl ElementData {
    pub fn new(tag_name: TagName) -> Self {
        let flags = ElementFlags::for_tag(tag_name.as_str());
        Self {
            tag_name,
            attributes: AttributeMap::new(),
            flags,
        }
    }

    pub fn with_attributes(tag_name: TagName, attrs: &[(&str, &str)]) -> Self {
        let mut elem = Self::new(tag_name);
        for (name, value) in attrs {
            elem.set_attribute(name, value);
        }
        elem
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        if name.eq_ignore_ascii_case("hidden") {
            self.flags.insert(ElementFlags::HIDDEN);
        }
        self.attributes.set(name, value);
    }

    pub fn remove_attribute(&mut self, name: &str) {
        if name.eq_ignore_ascii_case("hidden") {
            self.flags.remove(ElementFlags::HIDDEN);
        }
        self.attributes.remove(name);
    }

    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    pub fn id(&self) -> Option<&str> {
        self.get_attribute("id").filter(|id| !id.is_empty())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get_attribute("class")
            .is_some_and(|list| list.split_whitespace().any(|c| c == class))
    }

    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let list = match self.get_attribute("class").map(str::trim) {
            Some(existing) if !existing.is_empty() => format!("{} {}", existing, class),
            _ => class.to_string(),
        };
        self.attributes.set("class", &list);
    }

    /// The lower-cased `type` of an `<input>`, defaulting to `text`.
    pub fn input_type(&self) -> Option<String> {
        if self.tag_name != "input" {
            return None;
        }
        let kind = self
            .get_attribute("type")
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty());
        Some(kind.unwrap_or_else(|| "text".to_string()))
    }

    pub fn is_void(&self) -> bool {
        self.flags.contains(ElementFlags::VOID)
    }

    pub fn is_raw_text(&self) -> bool {
        self.flags.contains(ElementFlags::RAW_TEXT)
    }

    pub fn is_hidden(&self) -> bool {
        self.flags.contains(ElementFlags::HIDDEN)
    }

    /// Whether the element's content is never shown as page text.
    pub fn is_text_invisible(&self) -> bool {
        self.flags
            .intersects(ElementFlags::RAW_TEXT | ElementFlags::HIDDEN | ElementFlags::INERT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tag: &str, attrs: &[(&str, &str)]) -> ElementData {
        ElementData::with_attributes(TagName::new(tag), attrs)
    }

    #[test]
    fn test_tag_names_are_interned() {
        let a = TagName::new("DIV");
        let b = TagName::new("div");
        assert_eq!(a.as_str(), "div");
        assert!(Arc::ptr_eq(&a.0, &b.0));
        assert!(a == "Div");
    }

    #[test]
    fn test_id_and_classes() {
        let mut elem = element("div", &[("ID", "test"), ("class", " foo  bar ")]);
        assert_eq!(elem.id(), Some("test"));
        assert!(elem.has_class("bar"));
        assert!(!elem.has_class("fo"));

        elem.add_class("baz");
        elem.add_class("foo");
        assert_eq!(elem.get_attribute("class"), Some("foo  bar baz"));

        elem.remove_attribute("id");
        assert_eq!(elem.id(), None);
    }

    #[test]
    fn test_input_type() {
        let password = element("input", &[("type", "PassWord")]);
        assert_eq!(password.input_type().as_deref(), Some("password"));
        assert_eq!(element("input", &[]).input_type().as_deref(), Some("text"));
        assert_eq!(element("div", &[("type", "password")]).input_type(), None);
    }

    #[test]
    fn test_text_visibility_flags() {
        assert!(element("script", &[]).is_text_invisible());
        assert!(element("noscript", &[]).is_text_invisible());
        assert!(!element("p", &[]).is_text_invisible());

        let mut hidden = element("div", &[("hidden", "")]);
        assert!(hidden.is_hidden() && hidden.is_text_invisible());
        hidden.remove_attribute("HIDDEN");
        assert!(!hidden.is_text_invisible());
    }

    #[test]
    fn test_void_elements() {
        assert!(element("input", &[]).is_void());
        assert!(!element("div", &[]).is_void());
    }
}
