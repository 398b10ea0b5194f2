//! Test doubles for the analysis transport.

use async_trait::async_trait;
use networking::{AnalysisTransport, AnalyzeRequest, AnalyzeResponse, ClientError, HealthStatus};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};

enum Behavior {
    Respond(Value),
    Fail,
    Hang,
}

/// Records every request and answers according to a fixed behavior.
pub struct FakeTransport {
    behavior: Behavior,
    calls: AtomicUsize,
    requests: Mutex<Vec<AnalyzeRequest>>,
}

impl FakeTransport {
    fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer every request with `body`.
    pub fn respond(body: Value) -> Self {
        Self::new(Behavior::Respond(body))
    }

    /// Fail every request as an unreachable server would.
    pub fn fail() -> Self {
        Self::new(Behavior::Fail)
    }

    /// Never answer.
    pub fn hang() -> Self {
        Self::new(Behavior::Hang)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<AnalyzeRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl AnalysisTransport for FakeTransport {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());
        match &self.behavior {
            Behavior::Respond(body) => Ok(serde_json::from_value(body.clone())?),
            Behavior::Fail => Err(ClientError::Connection("connection refused".to_string())),
            Behavior::Hang => std::future::pending().await,
        }
    }

    async fn health(&self) -> Result<HealthStatus, ClientError> {
        match &self.behavior {
            Behavior::Respond(_) => Ok(HealthStatus {
                status: "healthy".to_string(),
                ..Default::default()
            }),
            Behavior::Fail => Err(ClientError::Connection("connection refused".to_string())),
            Behavior::Hang => std::future::pending().await,
        }
    }
}
