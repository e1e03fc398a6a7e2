//! Timeout helpers.

use std::future::Future;
use std::time::Duration;

use crate::error::StudioError;

/// Await `future`, failing with [`StudioError::Timeout`] if it takes longer than `duration`.
///
/// `None` waits indefinitely.
pub async fn with_idle_timeout<T>(
    duration: Option<Duration>,
    future: impl Future<Output = T>,
) -> Result<T, StudioError> {
    let Some(duration) = duration else {
        return Ok(future.await);
    };
    tokio::time::timeout(duration, future)
        .await
        .map_err(|_| StudioError::Timeout(duration.as_millis() as u64))
}
