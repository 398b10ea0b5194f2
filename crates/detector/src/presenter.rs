//! Alert overlay rendering and teardown.
//!
//! The overlay is built from DOM nodes rather than markup strings: the page
//! URL and every service-supplied field end up in text nodes, which the
//! serializer escapes, so none of them can be interpreted as markup.

use dom::{Document, Event, EventListenerOptions, NodeId, Window};
use std::sync::{Arc, Weak};
use std::time::Duration;

use crate::signals::AlertReport;

/// Id of the overlay root.
pub const OVERLAY_ID: &str = "privacy-guard-overlay";
/// Id of the card inside the overlay.
pub const POPUP_ID: &str = "privacy-guard-popup";
/// Id of the dismiss control.
pub const CLOSE_ID: &str = "privacy-guard-close";
/// Class marking an alert rendered without a server verdict.
pub const OFFLINE_CLASS: &str = "privacy-guard-offline";

const OVERLAY_STYLE: &str = "all: initial; position: fixed; top: 16px; right: 16px; \
     z-index: 2147483647; font-family: system-ui, sans-serif; font-size: 14px;";
const POPUP_STYLE: &str = "all: initial; display: block; min-width: 260px; max-width: 360px; \
     padding: 14px 16px; border-radius: 8px; background: #ffffff; color: #1f2328; \
     border-left: 6px solid #0969da; box-shadow: 0 4px 16px rgba(0, 0, 0, 0.25); \
     font-family: inherit; font-size: inherit;";
const OFFLINE_POPUP_STYLE: &str = "all: initial; display: block; min-width: 260px; max-width: 360px; \
     padding: 14px 16px; border-radius: 8px; background: #fff8c5; color: #1f2328; \
     border-left: 6px solid #9a6700; box-shadow: 0 4px 16px rgba(0, 0, 0, 0.25); \
     font-family: inherit; font-size: inherit;";
const CLOSE_STYLE: &str = "all: initial; cursor: pointer; margin-top: 10px; padding: 4px 10px; \
     border: 1px solid #d0d7de; border-radius: 6px; font-family: inherit;";

const OFFLINE_NOTE: &str = "Analysis server unreachable. Showing locally observed signals only.";

/// One rendered overlay instance.
///
/// Holds the versioned id of the overlay root, so it can only ever remove the
/// instance it was created for.
#[derive(Clone, Debug)]
pub struct OverlayHandle {
    root: NodeId,
    window: Weak<Window>,
}

impl OverlayHandle {
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Whether this instance is still attached to the page.
    pub fn is_displayed(&self) -> bool {
        self.window
            .upgrade()
            .map(|window| window.document().read().tree.is_connected(self.root))
            .unwrap_or(false)
    }

    /// Remove this instance. Returns false when it is already gone.
    pub fn dismiss(&self) -> bool {
        let Some(window) = self.window.upgrade() else {
            return false;
        };
        let removed = {
            let document = window.document();
            let mut doc = document.write();
            if !doc.tree.contains_node(self.root) {
                return false;
            }
            doc.tree.remove(self.root)
        };
        window.remove_listeners(&removed);
        tracing::debug!("Privacy alert dismissed");
        true
    }

    /// Markup of this instance, if it still exists.
    pub fn markup(&self) -> Option<String> {
        let window = self.window.upgrade()?;
        let document = window.document();
        let doc = document.read();
        doc.tree
            .contains_node(self.root)
            .then(|| html_parser::serialize_node(&doc.tree, self.root))
    }
}

/// Renders alert reports into the host page.
pub struct AlertPresenter {
    window: Arc<Window>,
    auto_dismiss: Option<Duration>,
}

impl AlertPresenter {
    pub fn new(window: Arc<Window>, auto_dismiss: Option<Duration>) -> Self {
        Self {
            window,
            auto_dismiss,
        }
    }

    /// Replace any existing overlay with one showing `report`.
    pub fn present(&self, report: &AlertReport) -> OverlayHandle {
        let root = {
            let document = self.window.document();
            let mut doc = document.write();
            let stale = remove_stale(&mut doc);
            drop(doc);
            self.window.remove_listeners(&stale);

            let mut doc = document.write();
            let root = build_overlay(&mut doc, report);
            doc.append_to_body(root);
            root
        };

        let handle = OverlayHandle {
            root,
            window: Arc::downgrade(&self.window),
        };
        self.wire_dismiss(&handle);

        if let Some(delay) = self.auto_dismiss {
            self.schedule_dismiss(&handle, delay);
        }

        tracing::info!(
            url = %report.url,
            risk = %report.risk_level,
            server_reachable = report.server_reachable,
            "Privacy alert shown"
        );
        handle
    }

    /// Attach the dismiss control of `handle`'s instance to that instance.
    fn wire_dismiss(&self, handle: &OverlayHandle) {
        let close = {
            let document = self.window.document();
            let doc = document.read();
            doc.tree.find_descendant_by_id(handle.root, CLOSE_ID)
        };
        let Some(close) = close else {
            tracing::warn!("Dismiss control #{} not found; alert stays visible", CLOSE_ID);
            return;
        };

        let target = handle.clone();
        self.window.add_event_listener(
            close,
            "click",
            Arc::new(move |event: &mut Event| {
                event.stop_propagation();
                target.dismiss();
            }),
            EventListenerOptions::once(),
        );
    }

    fn schedule_dismiss(&self, handle: &OverlayHandle, delay: Duration) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No async runtime; alert will not auto-dismiss");
            return;
        };
        let handle = handle.clone();
        runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if handle.dismiss() {
                tracing::debug!("Privacy alert expired after {:?}", delay);
            }
        });
    }
}

/// Remove leftovers from earlier renders. Returns every removed node.
fn remove_stale(doc: &mut Document) -> Vec<NodeId> {
    let mut removed = Vec::new();
    for id in [OVERLAY_ID, POPUP_ID, CLOSE_ID] {
        while let Some(node) = doc.get_element_by_id(id) {
            removed.extend(doc.tree.remove(node));
        }
    }
    if !removed.is_empty() {
        tracing::debug!("Removed {} stale overlay nodes", removed.len());
    }
    removed
}

fn build_overlay(doc: &mut Document, report: &AlertReport) -> NodeId {
    let offline = !report.server_reachable;

    let root = doc.create_element_with(
        "div",
        &[
            ("id", OVERLAY_ID),
            ("class", if offline { "privacy-guard privacy-guard-offline" } else { "privacy-guard" }),
            ("role", "alertdialog"),
            ("aria-live", "polite"),
            ("style", OVERLAY_STYLE),
        ],
    );
    let popup = doc.create_element_with(
        "div",
        &[
            ("id", POPUP_ID),
            ("style", if offline { OFFLINE_POPUP_STYLE } else { POPUP_STYLE }),
        ],
    );
    doc.tree.append_child(root, popup);

    let title = text_element(doc, "strong", "Privacy check");
    doc.tree.append_child(popup, title);
    let url = text_element(doc, "p", &report.url);
    add_class(doc, url, "privacy-guard-url");
    doc.tree.append_child(popup, url);

    let list = doc.create_element("ul");
    for line in [
        format!("Cookies: {}", report.cookie_count),
        format!("Trackers: {}", report.tracker_count),
        format!("Third-party scripts: {}", report.third_party_script_count),
        format!("Risk: {}", report.risk_level),
    ] {
        let item = text_element(doc, "li", &line);
        doc.tree.append_child(list, item);
    }
    doc.tree.append_child(popup, list);

    if let Some(summary) = report.summary.as_deref() {
        let p = text_element(doc, "p", summary);
        add_class(doc, p, "privacy-guard-summary");
        doc.tree.append_child(popup, p);
    }

    if offline {
        let note = text_element(doc, "p", OFFLINE_NOTE);
        add_class(doc, note, "privacy-guard-note");
        doc.tree.append_child(popup, note);
    }

    let close = doc.create_element_with(
        "button",
        &[("id", CLOSE_ID), ("type", "button"), ("style", CLOSE_STYLE)],
    );
    let label = doc.create_text_node("Dismiss");
    doc.tree.append_child(close, label);
    doc.tree.append_child(popup, close);

    root
}

fn text_element(doc: &mut Document, tag: &str, text: &str) -> NodeId {
    let element = doc.create_element(tag);
    let content = doc.create_text_node(text);
    doc.tree.append_child(element, content);
    element
}

fn add_class(doc: &mut Document, node: NodeId, class: &str) {
    if let Some(element) = doc.tree.get_element_mut(node) {
        element.add_class(class);
    }
}
