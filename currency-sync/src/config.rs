//! Controller configuration.

use std::time::Duration;

/// Tunables for [`RateSyncController`](crate::RateSyncController).
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Upper bound on one remote fetch; elapsing counts as a fetch failure.
    pub fetch_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(10),
        }
    }
}
