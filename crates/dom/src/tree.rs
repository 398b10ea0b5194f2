//! Node arena and tree operations.

use crate::element::ElementData;
use crate::node::{Node, NodeData, NodeId};
use slotmap::SlotMap;
use std::collections::HashMap;

/// Every node of one document, rooted at the document node.
///
/// Order lives in each parent's `children` list; there are no sibling links
/// to keep in sync.
pub struct DomTree {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
    /// `id` attribute to the element that last claimed it.
    id_map: HashMap<String, NodeId>,
}

impl DomTree {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert_with_key(Node::new_document);
        Self {
            nodes,
            root,
            id_map: HashMap::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Live nodes, the document node included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether `id` still names a live node.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get_element(&self, id: NodeId) -> Option<&ElementData> {
        self.nodes.get(id).and_then(Node::as_element)
    }

    pub fn get_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.nodes.get_mut(id).and_then(Node::as_element_mut)
    }

    pub fn create_element(&mut self, data: ElementData) -> NodeId {
        self.nodes.insert_with_key(|id| Node::new_element(id, data))
    }

    pub fn create_text(&mut self, content: String) -> NodeId {
        self.nodes.insert_with_key(|id| Node::new_text(id, content))
    }

    pub fn create_comment(&mut self, content: String) -> NodeId {
        self.nodes.insert_with_key(|id| Node::new_comment(id, content))
    }

    /// Move `child` (with its subtree) to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.attach(parent, child, None);
    }

    /// Insert `child` before `reference`, or append when `reference` is not
    /// a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        self.attach(parent, child, reference);
    }

    fn attach(&mut self, parent: NodeId, child: NodeId, before: Option<NodeId>) {
        if parent == child || !self.contains_node(parent) || !self.contains_node(child) {
            return;
        }
        self.remove_from_parent(child);

        let Some(parent_node) = self.nodes.get_mut(parent) else {
            return;
        };
        let position = before.and_then(|r| parent_node.children.iter().position(|&c| c == r));
        match position {
            Some(index) => parent_node.children.insert(index, child),
            None => parent_node.children.push(child),
        }
        if let Some(child_node) = self.nodes.get_mut(child) {
            child_node.parent = Some(parent);
        }

        self.index_subtree(child);
    }

    /// Unlink `node` from its parent. The node and its subtree stay alive.
    pub fn remove_from_parent(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get_mut(node).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.retain(|c| *c != node);
        }
    }

    /// Destroy `node` and its subtree, returning every destroyed id.
    pub fn remove(&mut self, node: NodeId) -> Vec<NodeId> {
        if node == self.root || !self.contains_node(node) {
            return Vec::new();
        }
        self.remove_from_parent(node);

        let removed: Vec<NodeId> = std::iter::once(node).chain(self.descendants(node)).collect();
        for &id in &removed {
            if let Some(Node { data: NodeData::Element(elem), .. }) = self.nodes.remove(id) {
                // A newer element may have claimed the same id since.
                if let Some(key) = elem.id() {
                    if self.id_map.get(key) == Some(&id) {
                        self.id_map.remove(key);
                    }
                }
            }
        }
        removed
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|n| n.parent)
    }

    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(Node::first_child)
    }

    pub fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(Node::last_child)
    }

    pub fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .get(node)
            .into_iter()
            .flat_map(|n| n.children.iter().copied())
    }

    /// Ancestors of `node`, nearest first.
    pub fn ancestors(&self, node: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(node),
        }
    }

    /// Pre-order walk below `node`, not including `node`.
    pub fn descendants(&self, node: NodeId) -> Descendants<'_> {
        let stack = self
            .nodes
            .get(node)
            .map(|n| n.children.iter().rev().copied().collect())
            .unwrap_or_default();
        Descendants { tree: self, stack }
    }

    /// Whether `node` hangs off the document root.
    pub fn is_connected(&self, node: NodeId) -> bool {
        node == self.root || self.ancestors(node).any(|a| a == self.root)
    }

    /// Connected element carrying `id`.
    pub fn find_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.id_map
            .get(id)
            .copied()
            .filter(|&node| self.is_connected(node))
    }

    /// Element carrying `id` within the subtree at `root`, connected or not.
    pub fn find_descendant_by_id(&self, root: NodeId, id: &str) -> Option<NodeId> {
        std::iter::once(root)
            .chain(self.descendants(root))
            .find(|&n| self.get_element(n).and_then(ElementData::id) == Some(id))
    }

    /// Connected elements named `tag_name` in document order; `*` matches all.
    pub fn find_elements_by_tag_name(&self, tag_name: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .filter(|&n| {
                self.get_element(n)
                    .is_some_and(|e| tag_name == "*" || e.tag_name == tag_name)
            })
            .collect()
    }

    pub fn find_child_by_tag(&self, parent: NodeId, tag_name: &str) -> Option<NodeId> {
        self.children(parent)
            .find(|&n| self.get_element(n).is_some_and(|e| e.tag_name == tag_name))
    }

    /// Replace the children of `node` with one text node. Text and comment
    /// nodes have their content replaced instead.
    pub fn set_text_content(&mut self, node: NodeId, text: &str) {
        match self.nodes.get_mut(node).map(|n| &mut n.data) {
            None => return,
            Some(NodeData::Text { content }) | Some(NodeData::Comment { content }) => {
                *content = text.to_string();
                return;
            }
            Some(_) => {}
        }

        let children: Vec<NodeId> = self.children(node).collect();
        for child in children {
            self.remove(child);
        }
        if !text.is_empty() {
            let text_node = self.create_text(text.to_string());
            self.append_child(node, text_node);
        }
    }

    /// Concatenated text of every descendant text node.
    pub fn get_text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, false, &mut out);
        out
    }

    /// The text a user would see: script, style, template, noscript and
    /// `hidden` subtrees are skipped and element boundaries read as spaces.
    pub fn get_visible_text(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, true, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, visible_only: bool, out: &mut String) {
        let Some(n) = self.nodes.get(node) else { return };
        match &n.data {
            NodeData::Text { content } => out.push_str(content),
            NodeData::Comment { .. } => {}
            NodeData::Document => {
                for &child in &n.children {
                    self.collect_text(child, visible_only, out);
                }
            }
            NodeData::Element(elem) => {
                if visible_only && elem.is_text_invisible() {
                    return;
                }
                for &child in &n.children {
                    self.collect_text(child, visible_only, out);
                }
                if visible_only && !elem.is_void() && !out.is_empty() && !out.ends_with(char::is_whitespace) {
                    out.push(' ');
                }
            }
        }
    }

    /// Record the `id`s of a freshly attached subtree.
    fn index_subtree(&mut self, node: NodeId) {
        let found: Vec<(String, NodeId)> = std::iter::once(node)
            .chain(self.descendants(node))
            .filter_map(|n| Some((self.get_element(n)?.id()?.to_string(), n)))
            .collect();
        self.id_map.extend(found);
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Ancestors<'a> {
    tree: &'a DomTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

pub struct Descendants<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        if let Some(node) = self.tree.nodes.get(current) {
            self.stack.extend(node.children.iter().rev().copied());
        }
        Some(current)
    }
}
