//! The detector pipeline attached to one page load.

use common::{DetectorError, DetectorResult};
use dom::{Event, EventListenerOptions, NodeId, ReadyState, Window};
use networking::AnalysisTransport;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::bridge::AnalysisBridge;
use crate::collector::SignalCollector;
use crate::config::DetectorConfig;
use crate::presenter::{AlertPresenter, OverlayHandle, OVERLAY_ID};
use crate::sensitivity::SensitivityDetector;
use crate::signals::AlertReport;
use crate::trigger::{TriggerCoordinator, TriggerSource, TriggerState};

/// Name of the global diagnostic entry point.
pub const MANUAL_TRIGGER_GLOBAL: &str = "runPrivacyCheck";

/// Result of one pipeline run.
#[derive(Clone, Debug)]
pub struct Alert {
    pub source: TriggerSource,
    pub report: AlertReport,
    pub overlay: OverlayHandle,
}

/// Privacy detector for one page load.
///
/// Owns the trigger state of that load; navigating means building a new
/// guard for the new window.
pub struct PrivacyGuard {
    window: Arc<Window>,
    runtime: Handle,
    collector: SignalCollector,
    sensitivity: SensitivityDetector,
    trigger: TriggerCoordinator,
    bridge: AnalysisBridge,
    presenter: AlertPresenter,
    installed: AtomicBool,
    last_alert: Mutex<Option<Alert>>,
    in_flight: watch::Sender<usize>,
}

impl PrivacyGuard {
    /// Build a guard submitting through `transport`.
    ///
    /// Must be called from within a tokio runtime; that runtime executes every
    /// dispatch, including the ones started from event listeners.
    pub fn new(
        window: Arc<Window>,
        config: &DetectorConfig,
        transport: Arc<dyn AnalysisTransport>,
    ) -> DetectorResult<Arc<Self>> {
        let runtime = Handle::try_current()
            .map_err(|e| DetectorError::internal(format!("no tokio runtime: {}", e)))?;
        let (in_flight, _) = watch::channel(0);

        Ok(Arc::new(Self {
            presenter: AlertPresenter::new(window.clone(), config.auto_dismiss()),
            window,
            runtime,
            collector: SignalCollector::new(config),
            sensitivity: SensitivityDetector::new(config),
            trigger: TriggerCoordinator::new(config),
            bridge: AnalysisBridge::new(transport, config.request_timeout()),
            installed: AtomicBool::new(false),
            last_alert: Mutex::new(None),
            in_flight,
        }))
    }

    /// Build a guard talking HTTP to the configured endpoint.
    pub fn with_http(window: Arc<Window>, config: &DetectorConfig) -> DetectorResult<Arc<Self>> {
        config.validate()?;
        let client = networking::HttpClientBuilder::new()
            .endpoint(config.endpoint.as_str())
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| DetectorError::config(e.to_string()))?;
        Self::new(window, config, Arc::new(client))
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn bridge(&self) -> &AnalysisBridge {
        &self.bridge
    }

    pub fn trigger_state(&self) -> TriggerState {
        self.trigger.state()
    }

    /// Most recent alert shown by this guard.
    pub fn last_alert(&self) -> Option<Alert> {
        self.last_alert.lock().clone()
    }

    /// Hook the guard into its window.
    ///
    /// Registers the document click listener, the page-ready evaluation and
    /// the `runPrivacyCheck` global. When the page has already finished
    /// parsing, page-ready runs right away and its dispatch is returned.
    pub fn install(self: &Arc<Self>) -> Option<JoinHandle<Alert>> {
        if self.installed.swap(true, Ordering::SeqCst) {
            tracing::warn!("Privacy guard already installed");
            return None;
        }

        let document_node = self.window.document_node();

        let guard = Arc::downgrade(self);
        self.window.add_event_listener(
            document_node,
            "click",
            Arc::new(move |event: &mut Event| {
                if let (Some(guard), Some(target)) = (guard.upgrade(), event.target) {
                    guard.on_click(target);
                }
            }),
            EventListenerOptions::default(),
        );

        let guard = Arc::downgrade(self);
        self.window.set_global(
            MANUAL_TRIGGER_GLOBAL,
            Arc::new(move |url: Option<String>| {
                if let Some(guard) = guard.upgrade() {
                    guard.manual_trigger(url);
                }
            }),
        );

        if self.window.ready_state() == ReadyState::Loading {
            let guard = Arc::downgrade(self);
            self.window.add_event_listener(
                document_node,
                "DOMContentLoaded",
                Arc::new(move |_: &mut Event| {
                    if let Some(guard) = guard.upgrade() {
                        guard.on_page_ready();
                    }
                }),
                EventListenerOptions::once(),
            );
            tracing::debug!("Privacy guard installed; waiting for DOMContentLoaded");
            None
        } else {
            tracing::debug!("Privacy guard installed on a loaded page");
            self.on_page_ready()
        }
    }

    /// Page-ready event: dispatch when the page is sensitive and nothing has
    /// been dispatched yet.
    pub fn on_page_ready(self: &Arc<Self>) -> Option<JoinHandle<Alert>> {
        let reason = {
            let document = self.window.document();
            let doc = document.read();
            self.sensitivity.evaluate(&doc)
        };
        let Some(reason) = reason else {
            tracing::debug!("Page not sensitive; no alert");
            return None;
        };
        tracing::debug!("Page is sensitive: {:?}", reason);

        if !self.trigger.try_dispatch(TriggerSource::PageReady) {
            return None;
        }
        Some(self.spawn_run(TriggerSource::PageReady, None))
    }

    /// Click anywhere in the page. Login-looking controls dispatch after the
    /// debounce delay unless something dispatched meanwhile.
    pub fn on_click(self: &Arc<Self>, target: NodeId) -> Option<JoinHandle<Option<Alert>>> {
        if self.trigger.is_dispatched() {
            return None;
        }

        let label = {
            let document = self.window.document();
            let doc = document.read();
            let inside_overlay = std::iter::once(target)
                .chain(doc.tree.ancestors(target))
                .any(|n| doc.tree.get_element(n).and_then(|e| e.id()) == Some(OVERLAY_ID));
            if inside_overlay {
                return None;
            }
            doc.element_label(target)
        };
        if !self.trigger.is_login_click(&label) {
            return None;
        }
        tracing::debug!("Login click on {:?}", label.trim());

        let guard = self.clone();
        let delay = self.trigger.debounce();
        let tracker = self.track();
        Some(self.runtime.spawn(async move {
            let _tracker = tracker;
            tokio::time::sleep(delay).await;
            if !guard.trigger.try_dispatch(TriggerSource::Click) {
                return None;
            }
            Some(guard.run(TriggerSource::Click, None).await)
        }))
    }

    /// Diagnostic trigger. Bypasses and leaves untouched the trigger state.
    pub fn manual_trigger(self: &Arc<Self>, url: Option<String>) -> JoinHandle<Alert> {
        tracing::info!("Manual privacy check requested");
        self.spawn_run(TriggerSource::Manual, url)
    }

    /// Wait until no dispatch is pending or running.
    pub async fn settle(&self) {
        let mut in_flight = self.in_flight.subscribe();
        // Only fails when the sender is gone, which cannot happen while
        // `self` is borrowed.
        let _ = in_flight.wait_for(|count| *count == 0).await;
    }

    fn spawn_run(self: &Arc<Self>, source: TriggerSource, url: Option<String>) -> JoinHandle<Alert> {
        let guard = self.clone();
        let tracker = self.track();
        self.runtime.spawn(async move {
            let _tracker = tracker;
            guard.run(source, url).await
        })
    }

    /// Collect, submit, present.
    async fn run(&self, source: TriggerSource, url: Option<String>) -> Alert {
        let (url, snapshot) = {
            let document = self.window.document();
            let doc = document.read();
            let url = url.unwrap_or_else(|| doc.url.to_string());
            (url, self.collector.collect(&doc))
        };
        tracing::info!(
            source = source.as_str(),
            url = %url,
            cookies = snapshot.cookie_count,
            trackers = snapshot.tracker_count(),
            third_party = snapshot.third_party_script_count,
            "Dispatching privacy analysis"
        );

        let report = self.bridge.analyze(&url, &snapshot).await;
        let overlay = self.presenter.present(&report);

        let alert = Alert {
            source,
            report,
            overlay,
        };
        *self.last_alert.lock() = Some(alert.clone());
        alert
    }

    fn track(&self) -> InFlight {
        self.in_flight.send_modify(|count| *count += 1);
        InFlight(self.in_flight.clone())
    }
}

/// Counts one pending dispatch until dropped.
struct InFlight(watch::Sender<usize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.send_modify(|count| *count = count.saturating_sub(1));
    }
}
