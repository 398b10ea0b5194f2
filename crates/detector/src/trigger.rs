//! Per-page dispatch gate.

use common::Vocabulary;
use parking_lot::Mutex;
use std::time::Duration;

use crate::config::DetectorConfig;

/// Dispatch state of one page load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TriggerState {
    #[default]
    Idle,
    Dispatched,
}

/// What caused a dispatch attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerSource {
    PageReady,
    Click,
    Manual,
}

impl TriggerSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerSource::PageReady => "page-ready",
            TriggerSource::Click => "click",
            TriggerSource::Manual => "manual",
        }
    }
}

/// Ensures at most one detector-originated dispatch per page load.
///
/// `Idle -> Dispatched` happens once; nothing leads back to `Idle`. A fresh
/// coordinator is created for every page load.
#[derive(Debug)]
pub struct TriggerCoordinator {
    state: Mutex<TriggerState>,
    login_keywords: Vocabulary,
    debounce: Duration,
}

impl TriggerCoordinator {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            state: Mutex::new(TriggerState::Idle),
            login_keywords: config.login_click_vocabulary(),
            debounce: config.click_debounce(),
        }
    }

    pub fn state(&self) -> TriggerState {
        *self.state.lock()
    }

    pub fn is_dispatched(&self) -> bool {
        self.state() == TriggerState::Dispatched
    }

    /// Claim the single dispatch of this page load.
    ///
    /// Returns true for exactly one caller; check and transition happen under
    /// one lock.
    pub fn try_dispatch(&self, source: TriggerSource) -> bool {
        let mut state = self.state.lock();
        match *state {
            TriggerState::Idle => {
                *state = TriggerState::Dispatched;
                tracing::debug!("Dispatch claimed by {} event", source.as_str());
                true
            }
            TriggerState::Dispatched => {
                tracing::debug!("Suppressed {} event: already dispatched", source.as_str());
                false
            }
        }
    }

    /// Whether a clicked element's label looks like a login control.
    pub fn is_login_click(&self, label: &str) -> bool {
        self.login_keywords.matches(label)
    }

    /// Delay between a login click and its dispatch.
    pub fn debounce(&self) -> Duration {
        self.debounce
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn coordinator() -> TriggerCoordinator {
        TriggerCoordinator::new(&DetectorConfig::default())
    }

    #[test]
    fn test_single_transition() {
        let trigger = coordinator();
        assert_eq!(trigger.state(), TriggerState::Idle);

        assert!(trigger.try_dispatch(TriggerSource::PageReady));
        assert!(trigger.is_dispatched());
        assert!(!trigger.try_dispatch(TriggerSource::PageReady));
        assert!(!trigger.try_dispatch(TriggerSource::Click));
        assert_eq!(trigger.state(), TriggerState::Dispatched);
    }

    #[test]
    fn test_concurrent_claims() {
        let trigger = Arc::new(coordinator());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let trigger = trigger.clone();
                std::thread::spawn(move || trigger.try_dispatch(TriggerSource::Click))
            })
            .collect();

        let claimed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&won| won)
            .count();
        assert_eq!(claimed, 1);
    }

    #[test]
    fn test_login_click_labels() {
        let trigger = coordinator();
        assert!(trigger.is_login_click("Sign In"));
        assert!(trigger.is_login_click("  LOG IN now"));
        assert!(trigger.is_login_click("Login"));
        assert!(!trigger.is_login_click("Sign up"));
        assert!(!trigger.is_login_click(""));
    }
}
