//! Single-shot, non-streaming model calls with an optional deadline.

use std::time::Duration;

use crate::ports::{AIError, AIProvider, CompletionRequest};

/// Runs one `complete` call, failing with [`AIError::Timeout`] once `limit`
/// elapses. No retries.
pub async fn complete_within(
    provider: &dyn AIProvider,
    request: CompletionRequest,
    limit: Option<Duration>,
) -> Result<String, AIError> {
    let call = provider.complete(request);
    let response = match limit {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| AIError::timeout(whole_secs(limit)))??,
        None => call.await?,
    };
    Ok(response.content)
}

/// Seconds for error reporting, rounded up so sub-second limits never read as 0.
fn whole_secs(limit: Duration) -> u64 {
    let secs = limit.as_secs();
    if limit.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}
