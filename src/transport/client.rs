use anyhow::Result;
use async_trait::async_trait;

use super::{TransportRequest, TransportResponse};

/// Executes one HTTP round-trip.
///
/// Non-2xx statuses are responses, not errors. `Err` is reserved for
/// transport-level failures (connection refused, timeout, TLS, ...).
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, req: TransportRequest) -> Result<TransportResponse>;
}
