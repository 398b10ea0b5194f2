//! Arena nodes.

use crate::element::ElementData;
use slotmap::new_key_type;
use smallvec::SmallVec;

new_key_type! {
    /// Handle to a node in a [`DomTree`](crate::tree::DomTree).
    ///
    /// Keys are versioned: once a node is removed its id never resolves
    /// again, even if the slot is reused by a newer node.
    pub struct NodeId;
}

/// Payload of a node.
#[derive(Clone, Debug)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text { content: String },
    Comment { content: String },
}

/// A node plus its links into the tree.
#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodeId,
    pub data: NodeData,
    pub parent: Option<NodeId>,
    pub children: SmallVec<[NodeId; 8]>,
}

impl Node {
    /// A detached node with no links.
    fn detached(id: NodeId, data: NodeData) -> Self {
        Self {
            id,
            data,
            parent: None,
            children: SmallVec::new(),
        }
    }

    pub fn new_document(id: NodeId) -> Self {
        Self::detached(id, NodeData::Document)
    }

    pub fn new_element(id: NodeId, data: ElementData) -> Self {
        Self::detached(id, NodeData::Element(data))
    }

    pub fn new_text(id: NodeId, content: String) -> Self {
        Self::detached(id, NodeData::Text { content })
    }

    pub fn new_comment(id: NodeId, content: String) -> Self {
        Self::detached(id, NodeData::Comment { content })
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        if let NodeData::Element(data) = &self.data {
            Some(data)
        } else {
            None
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        if let NodeData::Element(data) = &mut self.data {
            Some(data)
        } else {
            None
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        if let NodeData::Text { content } = &self.data {
            Some(content)
        } else {
            None
        }
    }

    pub fn first_child(&self) -> Option<NodeId> {
        self.children.first().copied()
    }

    pub fn last_child(&self) -> Option<NodeId> {
        self.children.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::TagName;
    use slotmap::SlotMap;

    #[test]
    fn test_payload_accessors() {
        let mut keys: SlotMap<NodeId, ()> = SlotMap::with_key();
        let id = keys.insert(());

        let elem = Node::new_element(id, ElementData::new(TagName::new("BUTTON")));
        assert_eq!(elem.as_element().map(|e| e.tag_name.as_str()), Some("button"));
        assert_eq!(elem.as_text(), None);

        let text = Node::new_text(id, "hello".to_string());
        assert_eq!(text.as_text(), Some("hello"));
        assert!(text.as_element().is_none());
        assert!(text.parent.is_none() && text.first_child().is_none());
    }
}
