use async_trait::async_trait;
use thiserror::Error;

use crate::entities::AnomalyRecord;

/// Produces a plain-English explanation for one flagged transaction, built
/// strictly from that record's own fields. A failure here is recoverable:
/// callers degrade the affected row to a sentinel and continue the batch.
#[async_trait]
pub trait NarrativeProvider: Send + Sync {
    async fn narrate(&self, record: &AnomalyRecord) -> Result<String, NarrativeError>;
}

#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("API error: {status} - {body}")]
    Api { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    Parse(String),
    #[error("provider not configured: {0}")]
    NotConfigured(String),
}
