//! Wait Mechanisms
//!
//! Blocking poll loops with an explicit timeout and poll interval.
//!
//! - Every poll checks its condition at least once, even with a zero timeout
//! - A poll that runs out of time yields `PollOutcome::TimedOut`; only a backend
//!   error or cancellation is an `Err`
//! - A `CancellationToken` aborts any poll at its next tick

use crate::result::{PortalError, PortalResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for each wait (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (500ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Shortest sleep between attempts; a zero interval is raised to this
pub const MIN_POLL_INTERVAL_MS: u64 = 1;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration, never below `MIN_POLL_INTERVAL_MS`
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
    }
}

// =============================================================================
// CANCELLATION
// =============================================================================

/// Shared flag that aborts in-flight polls
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create an untriggered token
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger cancellation for every clone of this token
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether `cancel` has been called
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

// =============================================================================
// POLL OUTCOME
// =============================================================================

/// Outcome of a single bounded poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// Condition produced a value
    Found(T),
    /// Timeout elapsed without the condition producing a value
    TimedOut {
        /// Time spent polling
        elapsed: Duration,
    },
}

impl<T> PollOutcome<T> {
    /// Whether the poll found a value
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Convert to `Option`, dropping the elapsed time
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::TimedOut { .. } => None,
        }
    }
}

// =============================================================================
// POLLER
// =============================================================================

/// Runs bounded poll loops
#[derive(Debug, Clone, Default)]
pub struct Poller {
    options: WaitOptions,
    cancel: Option<CancellationToken>,
}

impl Poller {
    /// Create a poller with the given options
    #[must_use]
    pub const fn new(options: WaitOptions) -> Self {
        Self {
            options,
            cancel: None,
        }
    }

    /// Attach a cancellation token
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Options in effect
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Poll `check` until it yields a value or the timeout elapses
    ///
    /// Errors from `check` end the poll immediately.
    pub fn poll<T, F>(&self, waited_for: &str, mut check: F) -> PortalResult<PollOutcome<T>>
    where
        F: FnMut() -> PortalResult<Option<T>>,
    {
        let start = Instant::now();
        let timeout = self.options.timeout();
        let poll_interval = self.options.poll_interval();

        loop {
            if self.is_cancelled() {
                return Err(PortalError::Cancelled {
                    waited_for: waited_for.to_string(),
                });
            }
            if let Some(value) = check()? {
                return Ok(PollOutcome::Found(value));
            }
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return Ok(PollOutcome::TimedOut { elapsed });
            }
            std::thread::sleep(poll_interval.min(timeout - elapsed));
        }
    }

    /// Poll like `poll`, but treat a timeout as `PortalError::Timeout`
    pub fn wait_for<T, F>(&self, waited_for: &str, check: F) -> PortalResult<T>
    where
        F: FnMut() -> PortalResult<Option<T>>,
    {
        match self.poll(waited_for, check)? {
            PollOutcome::Found(value) => Ok(value),
            PollOutcome::TimedOut { .. } => Err(PortalError::Timeout {
                ms: self.options.timeout_ms,
                waited_for: waited_for.to_string(),
            }),
        }
    }

    /// Poll a boolean predicate until it holds
    pub fn wait_until<F>(&self, waited_for: &str, mut predicate: F) -> PortalResult<()>
    where
        F: FnMut() -> PortalResult<bool>,
    {
        self.wait_for(waited_for, || Ok(predicate()?.then_some(())))
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }
}

// =============================================================================
// TESTS
// =============================================================================
