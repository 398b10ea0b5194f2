//! Conversion from html5ever's `RcDom` into the detector DOM.

use dom::document::Document;
use dom::element::{ElementData, TagName};
use dom::node::NodeId;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

/// Copies an `RcDom` tree into a [`Document`].
pub struct DomConverter<'a> {
    document: &'a mut Document,
}

impl<'a> DomConverter<'a> {
    pub fn new(document: &'a mut Document) -> Self {
        Self { document }
    }

    /// Convert the whole parsed document under the document root.
    pub fn convert(mut self, dom: &RcDom) {
        let root = self.document.tree.root();
        for child in dom.document.children.borrow().iter() {
            self.convert_node(child, root);
        }
        self.locate_special_elements();
    }

    fn convert_node(&mut self, handle: &Handle, parent: NodeId) {
        match &handle.data {
            RcNodeData::Text { contents } => {
                let text = contents.borrow().to_string();
                self.append_text(parent, text);
            }
            RcNodeData::Comment { contents } => {
                let id = self.document.tree.create_comment(contents.to_string());
                self.document.tree.append_child(parent, id);
            }
            RcNodeData::Element {
                name,
                attrs,
                template_contents,
                ..
            } => {
                let mut data = ElementData::new(TagName::new(&name.local));
                for attr in attrs.borrow().iter() {
                    data.set_attribute(&attr.name.local, &attr.value);
                }

                let id = self.document.tree.create_element(data);
                self.document.tree.append_child(parent, id);

                if let Some(contents) = template_contents.borrow().as_ref() {
                    for child in contents.children.borrow().iter() {
                        self.convert_node(child, id);
                    }
                }
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, id);
                }
            }
            RcNodeData::Document => {
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, parent);
                }
            }
            // Doctype and processing instructions carry nothing we observe.
            _ => {}
        }
    }

    /// Adjacent text from the tokenizer is merged into one node.
    fn append_text(&mut self, parent: NodeId, text: String) {
        let tree = &mut self.document.tree;
        if let Some(last) = tree.last_child(parent) {
            if let Some(existing) = tree.get(last).and_then(|n| n.as_text()) {
                let merged = format!("{}{}", existing, text);
                tree.set_text_content(last, &merged);
                return;
            }
        }
        let id = tree.create_text(text);
        tree.append_child(parent, id);
    }

    fn locate_special_elements(&mut self) {
        let doc = &mut *self.document;
        let root = doc.tree.root();

        doc.document_element = doc.tree.find_child_by_tag(root, "html");
        let Some(html) = doc.document_element else {
            return;
        };

        doc.head = doc.tree.find_child_by_tag(html, "head");
        doc.body = doc.tree.find_child_by_tag(html, "body");

        if let Some(head) = doc.head {
            if let Some(title) = doc.tree.find_child_by_tag(head, "title") {
                doc.title = doc.tree.get_text_content(title).trim().to_string();
            }
        }
    }
}
