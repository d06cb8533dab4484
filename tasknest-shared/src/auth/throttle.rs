/// Login throttle
///
/// Bounds authentication attempts per (route, client address, claimed
/// username) with a fixed window: the first attempt for a key opens a window,
/// at most `max_attempts` are admitted inside it, and the count resets only
/// when the window has fully elapsed. This is deliberately not a token bucket;
/// a client that burns its attempts waits out the remainder of the window.
///
/// Counters are in-memory and process-local. Two API instances behind a load
/// balancer each admit `max_attempts` per key.
///
/// # Example
///
/// ```
/// use tasknest_shared::auth::throttle::{LoginThrottle, ThrottleDecision, ThrottleKey};
///
/// let throttle = LoginThrottle::default();
/// let key = ThrottleKey::new("login", "203.0.113.9", Some("alice"));
///
/// for _ in 0..5 {
///     assert_eq!(throttle.check(&key), ThrottleDecision::Allowed);
/// }
/// assert!(matches!(throttle.check(&key), ThrottleDecision::Limited { .. }));
/// ```

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Default attempts admitted per window
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default window length
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Identity an attempt is counted against
///
/// The username is whatever the client claimed in the request body, not a
/// verified identity; attempts without a parseable username fall back to a
/// per-address key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThrottleKey {
    scope: &'static str,
    addr: String,
    username: Option<String>,
}

impl ThrottleKey {
    pub fn new(scope: &'static str, addr: impl Into<String>, username: Option<&str>) -> Self {
        Self {
            scope,
            addr: addr.into(),
            username: username.filter(|u| !u.is_empty()).map(str::to_string),
        }
    }
}

impl std::fmt::Display for ThrottleKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.username {
            Some(username) => write!(f, "{}:{}:{}", self.scope, self.addr, username),
            None => write!(f, "{}:{}", self.scope, self.addr),
        }
    }
}

/// Outcome of [`LoginThrottle::check`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    /// Attempt counted and admitted
    Allowed,

    /// Limit reached; the window reopens in `retry_after`
    Limited { retry_after: Duration },
}

#[derive(Debug, Clone, Copy)]
struct Window {
    opened_at: Instant,
    attempts: u32,
}

/// Fixed-window attempt counter shared by all request handlers
#[derive(Debug)]
pub struct LoginThrottle {
    max_attempts: u32,
    window: Duration,
    windows: Mutex<HashMap<ThrottleKey, Window>>,
}

impl Default for LoginThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW)
    }
}

impl LoginThrottle {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Counts an attempt for `key` and decides whether it may proceed
    ///
    /// Check and increment happen under one lock, so a concurrent burst can
    /// never admit more than `max_attempts` per window. Rejected attempts are
    /// not counted.
    pub fn check(&self, key: &ThrottleKey) -> ThrottleDecision {
        let now = Instant::now();
        let mut windows = self.windows.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let window = windows.entry(key.clone()).or_insert(Window {
            opened_at: now,
            attempts: 0,
        });

        if now.duration_since(window.opened_at) >= self.window {
            *window = Window {
                opened_at: now,
                attempts: 0,
            };
        }

        if window.attempts >= self.max_attempts {
            let retry_after = self.window.saturating_sub(now.duration_since(window.opened_at));
            return ThrottleDecision::Limited { retry_after };
        }

        window.attempts += 1;
        ThrottleDecision::Allowed
    }

    /// Drops windows that have fully elapsed, returning how many were removed
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut windows = self.windows.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let before = windows.len();
        windows.retain(|_, w| now.duration_since(w.opened_at) < self.window);
        before - windows.len()
    }

    /// Number of keys currently tracked
    pub fn tracked_keys(&self) -> usize {
        self.windows.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }
}
