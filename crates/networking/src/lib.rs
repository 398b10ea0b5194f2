//! Transport to the privacy analysis service.
//!
//! This crate handles:
//! - The JSON wire format of analysis requests and responses
//! - The `AnalysisTransport` seam used by the detector pipeline
//! - A reqwest-backed HTTP client with bounded request latency
//! - Health checks against the analysis service

pub mod client;
pub mod request;
pub mod response;
pub mod transport;

pub use client::{ClientConfig, ClientError, HttpClient, HttpClientBuilder};
pub use request::AnalyzeRequest;
pub use response::{AnalyzeResponse, HealthStatus};
pub use transport::AnalysisTransport;
