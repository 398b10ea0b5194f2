//! DOM Window object implementation.

use crate::document::{Document, DocumentRef, ReadyState};
use crate::events::{self, Event, EventCallback, EventListenerOptions, EventManager, EventType, ListenerId};
use crate::node::NodeId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// A function published on the window object, callable by name.
pub type GlobalFunction = Arc<dyn Fn(Option<String>) + Send + Sync>;

/// Browsing context owning a document, its event listeners and the
/// script-visible globals.
pub struct Window {
    document: DocumentRef,
    events: RwLock<EventManager>,
    globals: RwLock<HashMap<String, GlobalFunction>>,
}

impl Window {
    pub fn new(document: Document) -> Self {
        Self::from_ref(Arc::new(RwLock::new(document)))
    }

    pub fn from_ref(document: DocumentRef) -> Self {
        Self {
            document,
            events: RwLock::new(EventManager::new()),
            globals: RwLock::new(HashMap::new()),
        }
    }

    /// Shared handle to the document.
    pub fn document(&self) -> DocumentRef {
        self.document.clone()
    }

    /// The document node itself, the target of document-level listeners.
    pub fn document_node(&self) -> NodeId {
        self.document.read().tree.root()
    }

    pub fn ready_state(&self) -> ReadyState {
        self.document.read().ready_state
    }

    /// Register a listener on a node.
    pub fn add_event_listener(
        &self,
        node: NodeId,
        event_type: &str,
        callback: EventCallback,
        options: EventListenerOptions,
    ) -> ListenerId {
        self.events
            .write()
            .add_listener(node, event_type, callback, options)
    }

    /// Drop every listener registered on the given nodes.
    pub fn remove_listeners(&self, nodes: &[NodeId]) {
        let mut events = self.events.write();
        for &node in nodes {
            events.remove_all(node);
        }
    }

    pub fn listener_count(&self, node: NodeId, event_type: &str) -> usize {
        self.events.read().listener_count(node, event_type)
    }

    /// Dispatch an event at `target`, propagating through its ancestors.
    ///
    /// The document lock is released before any listener runs.
    pub fn dispatch_event(&self, target: NodeId, event: &mut Event) -> bool {
        let path: Vec<NodeId> = {
            let doc = self.document.read();
            if !doc.tree.contains_node(target) {
                tracing::debug!("Dropping {} event for detached node", event.event_type.as_str());
                return true;
            }
            std::iter::once(target).chain(doc.tree.ancestors(target)).collect()
        };
        events::dispatch(&self.events, event, &path)
    }

    /// Simulate a user click on `target`.
    pub fn click(&self, target: NodeId) -> bool {
        let mut event = Event::new(EventType::Click);
        self.dispatch_event(target, &mut event)
    }

    /// Finish parsing: the document becomes interactive and
    /// `DOMContentLoaded` fires on the document node.
    pub fn content_loaded(&self) {
        let root = {
            let mut doc = self.document.write();
            doc.mark_interactive();
            doc.tree.root()
        };
        let mut event = Event::new(EventType::DOMContentLoaded);
        self.dispatch_event(root, &mut event);
    }

    /// Finish loading entirely. Fires `DOMContentLoaded` first if it has not
    /// fired yet.
    pub fn load_complete(&self) {
        if self.ready_state() == ReadyState::Loading {
            self.content_loaded();
        }
        let root = {
            let mut doc = self.document.write();
            doc.finish_loading();
            doc.tree.root()
        };
        let mut event = Event::new(EventType::Load);
        self.dispatch_event(root, &mut event);
    }

    /// Publish a function under `name` (like assigning `window.name = fn`).
    pub fn set_global(&self, name: &str, function: GlobalFunction) {
        self.globals.write().insert(name.to_string(), function);
    }

    pub fn has_global(&self, name: &str) -> bool {
        self.globals.read().contains_key(name)
    }

    /// Call a published function. Returns false when nothing is published
    /// under `name`.
    pub fn call_global(&self, name: &str, argument: Option<String>) -> bool {
        let function = self.globals.read().get(name).cloned();
        match function {
            Some(f) => {
                f(argument);
                true
            }
            None => {
                tracing::warn!("window.{} is not defined", name);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;

    fn window() -> Window {
        Window::new(Document::with_skeleton(
            Url::parse("https://example.com/").unwrap(),
        ))
    }

    #[test]
    fn test_click_reaches_document_listener() {
        let window = window();
        let button = {
            let doc = window.document();
            let mut doc = doc.write();
            let button = doc.create_element("button");
            doc.append_to_body(button);
            button
        };

        let targets = Arc::new(Mutex::new(Vec::new()));
        let seen = targets.clone();
        window.add_event_listener(
            window.document_node(),
            "click",
            Arc::new(move |event: &mut Event| seen.lock().push(event.target)),
            EventListenerOptions::default(),
        );

        window.click(button);
        assert_eq!(*targets.lock(), vec![Some(button)]);
    }

    #[test]
    fn test_listener_can_mutate_document() {
        let window = Arc::new(window());
        let button = {
            let doc = window.document();
            let mut doc = doc.write();
            let button = doc.create_element("button");
            doc.append_to_body(button);
            button
        };

        let doc = window.document();
        window.add_event_listener(
            button,
            "click",
            Arc::new(move |event: &mut Event| {
                if let Some(target) = event.target {
                    doc.write().tree.remove(target);
                }
            }),
            EventListenerOptions::default(),
        );

        window.click(button);
        assert!(!window.document().read().tree.contains_node(button));
    }

    #[test]
    fn test_load_sequence() {
        let window = window();
        let fired = Arc::new(AtomicUsize::new(0));
        let seen = fired.clone();
        window.add_event_listener(
            window.document_node(),
            "DOMContentLoaded",
            Arc::new(move |_: &mut Event| {
                seen.fetch_add(1, Ordering::SeqCst);
            }),
            EventListenerOptions::once(),
        );

        window.load_complete();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(window.ready_state(), ReadyState::Complete);
    }

    #[test]
    fn test_globals() {
        let window = window();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let seen = calls.clone();
        window.set_global("probe", Arc::new(move |arg| seen.lock().push(arg)));

        assert!(window.has_global("probe"));
        assert!(window.call_global("probe", Some("https://a.test/".to_string())));
        assert!(window.call_global("probe", None));
        assert!(!window.call_global("missing", None));
        assert_eq!(
            *calls.lock(),
            vec![Some("https://a.test/".to_string()), None]
        );
    }
}
