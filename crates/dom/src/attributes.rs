//! Element attributes.

use indexmap::IndexMap;

/// Attribute names are stored lower-cased; source order is preserved so
/// markup serializes the way it was written.
#[derive(Clone, Debug, Default)]
pub struct AttributeMap {
    entries: IndexMap<String, String>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.entries.insert(name.to_ascii_lowercase(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        match self.entries.get(name) {
            Some(value) => Some(value),
            None => self
                .entries
                .get(&name.to_ascii_lowercase())
                .map(String::as_str),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.shift_remove(&name.to_ascii_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
