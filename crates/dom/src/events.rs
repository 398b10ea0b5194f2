//! Listener registry and event propagation.

use crate::node::NodeId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Event types the page raises. Anything else travels as `Custom`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    Load,
    DOMContentLoaded,
    Custom(String),
}

impl EventType {
    pub fn from_str(s: &str) -> Self {
        if s.eq_ignore_ascii_case("click") {
            EventType::Click
        } else if s.eq_ignore_ascii_case("load") {
            EventType::Load
        } else if s.eq_ignore_ascii_case("domcontentloaded") {
            EventType::DOMContentLoaded
        } else {
            EventType::Custom(s.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventType::Click => "click",
            EventType::Load => "load",
            EventType::DOMContentLoaded => "DOMContentLoaded",
            EventType::Custom(name) => name,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventPhase {
    None,
    Capturing,
    AtTarget,
    Bubbling,
}

/// An event in flight. Listeners receive it mutably so they can stop
/// propagation or cancel the default action.
#[derive(Clone, Debug)]
pub struct Event {
    pub event_type: EventType,
    pub target: Option<NodeId>,
    pub phase: EventPhase,
    pub bubbles: bool,
    pub cancelable: bool,
    pub default_prevented: bool,
    pub propagation_stopped: bool,
}

impl Event {
    pub fn new(event_type: EventType) -> Self {
        // `load` stays on its target; the document lifecycle events cannot
        // be cancelled.
        let bubbles = event_type != EventType::Load;
        let cancelable = !matches!(event_type, EventType::Load | EventType::DOMContentLoaded);
        Self {
            event_type,
            target: None,
            phase: EventPhase::None,
            bubbles,
            cancelable,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented |= self.cancelable;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }
}

/// Event listener callback type.
pub type EventCallback = Arc<dyn Fn(&mut Event) + Send + Sync>;

/// Handle returned when registering a listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Event listener options.
#[derive(Clone, Debug, Default)]
pub struct EventListenerOptions {
    pub capture: bool,
    pub once: bool,
}

impl EventListenerOptions {
    pub fn once() -> Self {
        Self {
            once: true,
            ..Default::default()
        }
    }
}

/// Event listener.
#[derive(Clone)]
pub struct EventListener {
    pub id: ListenerId,
    pub callback: EventCallback,
    pub options: EventListenerOptions,
}

/// Listener registry keyed by node and event type.
#[derive(Default)]
pub struct EventManager {
    listeners: HashMap<NodeId, HashMap<String, Vec<EventListener>>>,
    next_id: u64,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add event listener for a node.
    pub fn add_listener(
        &mut self,
        node: NodeId,
        event_type: &str,
        callback: EventCallback,
        options: EventListenerOptions,
    ) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners
            .entry(node)
            .or_default()
            .entry(event_type.to_string())
            .or_default()
            .push(EventListener {
                id,
                callback,
                options,
            });
        id
    }

    /// Remove one listener. Returns whether it was registered.
    pub fn remove_listener(&mut self, node: NodeId, event_type: &str, id: ListenerId) -> bool {
        let Some(type_listeners) = self
            .listeners
            .get_mut(&node)
            .and_then(|n| n.get_mut(event_type))
        else {
            return false;
        };
        let before = type_listeners.len();
        type_listeners.retain(|l| l.id != id);
        before != type_listeners.len()
    }

    /// Number of listeners registered on a node for an event type.
    pub fn listener_count(&self, node: NodeId, event_type: &str) -> usize {
        self.listeners
            .get(&node)
            .and_then(|n| n.get(event_type))
            .map(|l| l.len())
            .unwrap_or(0)
    }

    /// Snapshot the listeners that fire on `node` during `phase`.
    fn matching(&self, node: NodeId, event_type: &str, phase: EventPhase) -> Vec<EventListener> {
        self.listeners
            .get(&node)
            .and_then(|n| n.get(event_type))
            .map(|list| {
                list.iter()
                    .filter(|l| match phase {
                        EventPhase::Capturing => l.options.capture,
                        EventPhase::Bubbling => !l.options.capture,
                        _ => true,
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Remove all listeners for a node.
    pub fn remove_all(&mut self, node: NodeId) {
        self.listeners.remove(&node);
    }
}

/// Dispatch `event` along `path` (`path[0]` is the target, followed by its
/// ancestors nearest first).
///
/// Listener callbacks run with the manager unlocked, so a callback may add or
/// remove listeners or dispatch further events.
pub fn dispatch(manager: &RwLock<EventManager>, event: &mut Event, path: &[NodeId]) -> bool {
    let Some(&target) = path.first() else {
        return true;
    };
    event.target = Some(target);

    event.phase = EventPhase::Capturing;
    for &node in path.iter().skip(1).rev() {
        if invoke(manager, node, event) {
            return !event.default_prevented;
        }
    }

    event.phase = EventPhase::AtTarget;
    if invoke(manager, target, event) {
        return !event.default_prevented;
    }

    if event.bubbles {
        event.phase = EventPhase::Bubbling;
        for &node in path.iter().skip(1) {
            if invoke(manager, node, event) {
                return !event.default_prevented;
            }
        }
    }

    event.phase = EventPhase::None;
    !event.default_prevented
}

/// Run the listeners of one node. Returns true when propagation stopped.
fn invoke(manager: &RwLock<EventManager>, node: NodeId, event: &mut Event) -> bool {
    let event_type = event.event_type.as_str().to_string();
    let listeners = manager.read().matching(node, &event_type, event.phase);

    for listener in listeners {
        if listener.options.once {
            manager.write().remove_listener(node, &event_type, listener.id);
        }
        (listener.callback)(event);
    }

    event.propagation_stopped
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ids(n: usize) -> Vec<NodeId> {
        let mut map: SlotMap<NodeId, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    #[test]
    fn test_event_creation() {
        let event = Event::new(EventType::Click);
        assert!(event.bubbles);
        assert!(event.cancelable);
        assert!(!event.default_prevented);
    }

    #[test]
    fn test_prevent_default() {
        let mut event = Event::new(EventType::Click);
        event.prevent_default();
        assert!(event.default_prevented);

        let mut uncancelable = Event::new(EventType::Load);
        uncancelable.prevent_default();
        assert!(!uncancelable.default_prevented);
    }

    #[test]
    fn test_event_type_from_str() {
        assert_eq!(EventType::from_str("click"), EventType::Click);
        assert_eq!(EventType::from_str("DOMContentLoaded"), EventType::DOMContentLoaded);
        assert_eq!(
            EventType::from_str("custom-event"),
            EventType::Custom("custom-event".to_string())
        );
    }

    #[test]
    fn test_click_bubbles_to_ancestor() {
        let path = ids(3);
        let manager = RwLock::new(EventManager::new());
        let hits = Arc::new(AtomicUsize::new(0));

        let seen = hits.clone();
        let root = path[2];
        manager.write().add_listener(
            root,
            "click",
            Arc::new(move |event: &mut Event| {
                assert_eq!(event.phase, EventPhase::Bubbling);
                seen.fetch_add(1, Ordering::SeqCst);
            }),
            EventListenerOptions::default(),
        );

        let mut event = Event::new(EventType::Click);
        assert!(dispatch(&manager, &mut event, &path));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(event.target, Some(path[0]));
    }

    #[test]
    fn test_once_listener_fires_once() {
        let path = ids(1);
        let manager = RwLock::new(EventManager::new());
        let hits = Arc::new(AtomicUsize::new(0));

        let seen = hits.clone();
        manager.write().add_listener(
            path[0],
            "DOMContentLoaded",
            Arc::new(move |_: &mut Event| {
                seen.fetch_add(1, Ordering::SeqCst);
            }),
            EventListenerOptions::once(),
        );

        for _ in 0..3 {
            dispatch(&manager, &mut Event::new(EventType::DOMContentLoaded), &path);
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(manager.read().listener_count(path[0], "DOMContentLoaded"), 0);
    }

    #[test]
    fn test_stop_propagation_at_target() {
        let path = ids(2);
        let manager = RwLock::new(EventManager::new());
        let hits = Arc::new(AtomicUsize::new(0));

        manager.write().add_listener(
            path[0],
            "click",
            Arc::new(|event: &mut Event| event.stop_propagation()),
            EventListenerOptions::default(),
        );
        let seen = hits.clone();
        manager.write().add_listener(
            path[1],
            "click",
            Arc::new(move |_: &mut Event| {
                seen.fetch_add(1, Ordering::SeqCst);
            }),
            EventListenerOptions::default(),
        );

        dispatch(&manager, &mut Event::new(EventType::Click), &path);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_listener_may_register_listeners() {
        let path = ids(1);
        let manager = Arc::new(RwLock::new(EventManager::new()));

        let inner = manager.clone();
        let node = path[0];
        manager.write().add_listener(
            node,
            "click",
            Arc::new(move |_: &mut Event| {
                inner.write().add_listener(
                    node,
                    "submit",
                    Arc::new(|_: &mut Event| {}),
                    EventListenerOptions::default(),
                );
            }),
            EventListenerOptions::default(),
        );

        dispatch(&manager, &mut Event::new(EventType::Click), &path);
        assert_eq!(manager.read().listener_count(node, "submit"), 1);
    }
}
