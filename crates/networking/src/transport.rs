//! Transport abstraction between the detector and the analysis service.

use crate::client::ClientError;
use crate::request::AnalyzeRequest;
use crate::response::{AnalyzeResponse, HealthStatus};
use async_trait::async_trait;

/// Something that can score a privacy snapshot.
#[async_trait]
pub trait AnalysisTransport: Send + Sync {
    /// Submit one analysis request. A single attempt, no retries.
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse, ClientError>;

    /// Query the service health.
    async fn health(&self) -> Result<HealthStatus, ClientError>;
}
