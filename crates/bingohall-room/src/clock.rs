//! Time source for cooldowns.
//!
//! The room never calls `Instant::now()` directly. It asks its [`Clock`],
//! so tests can run against Tokio's paused clock and an embedding service
//! can supply its own notion of "now".

use std::time::Instant;

/// Supplies monotonic timestamps.
pub trait Clock: Send + Sync + 'static {
    /// The current instant. Successive calls never go backwards.
    fn now(&self) -> Instant;
}

/// Reads Tokio's clock. Under `#[tokio::test(start_paused = true)]` this
/// follows `tokio::time::advance`; otherwise it is the system's
/// monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}
