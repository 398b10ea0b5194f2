//! Privacy Guard - a privacy-signal detector embedded in a web page.
//!
//! This crate ties the detector together:
//! - Signal collection (cookies, tracker scripts, third-party scripts)
//! - Sensitive page detection
//! - A per-page dispatch gate fed by page-ready and click events
//! - Bounded-latency analysis with an offline fallback
//! - The alert overlay and its teardown

pub mod bridge;
pub mod collector;
pub mod config;
pub mod guard;
pub mod presenter;
pub mod sensitivity;
pub mod signals;
pub mod trigger;

#[cfg(test)]
pub(crate) mod testing;

pub use bridge::AnalysisBridge;
pub use collector::SignalCollector;
pub use config::DetectorConfig;
pub use guard::{Alert, PrivacyGuard, MANUAL_TRIGGER_GLOBAL};
pub use presenter::{AlertPresenter, OverlayHandle};
pub use sensitivity::{SensitivityDetector, SensitivityReason};
pub use signals::{AlertReport, AnalysisVerdict, PrivacySignalSnapshot};
pub use trigger::{TriggerCoordinator, TriggerSource, TriggerState};

/// Detector version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// User agent sent to the analysis service.
pub fn user_agent() -> String {
    format!("PrivacyGuard/{} ({})", VERSION, std::env::consts::OS)
}
