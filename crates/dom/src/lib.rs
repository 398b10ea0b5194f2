//! DOM (Document Object Model) for the host page.
//!
//! This crate models the page the detector runs inside: the node tree, the
//! document-level state a content script can observe (URL, cookie string,
//! ready state), event dispatch, and the window that owns listeners and
//! globally reachable functions.

pub mod node;
pub mod document;
pub mod element;
pub mod tree;
pub mod events;
pub mod attributes;
pub mod window;

pub use node::{Node, NodeData, NodeId};
pub use document::{Document, DocumentRef, ReadyState};
pub use element::{ElementData, TagName};
pub use tree::DomTree;
pub use events::{Event, EventType, EventPhase, EventCallback, EventListenerOptions, ListenerId};
pub use attributes::AttributeMap;
pub use window::{GlobalFunction, Window};
