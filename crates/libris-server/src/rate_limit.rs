//! Per-client request limiting and failed-login lockout
//!
//! Fixed windows per client key. A client that fails to log in
//! `max_failed_attempts` times in a row is locked out of login for
//! `lockout_secs`; a successful login clears the count.
//!
//! Entries whose window has passed and that carry no active lockout are
//! swept at most once per window, from the request path. Failed-login
//! counts of a client idle for a whole window are forgotten with them.

use dashmap::DashMap;
use libris_infrastructure::config::RateLimitConfig;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct ClientEntry {
    request_count: u32,
    window_start: Instant,
    failed_attempts: u32,
    lockout_until: Option<Instant>,
}

impl ClientEntry {
    fn new(now: Instant) -> Self {
        Self {
            request_count: 0,
            failed_attempts: 0,
            window_start: now,
            lockout_until: None,
        }
    }

    fn lockout_remaining(&self, now: Instant) -> Option<Duration> {
        self.lockout_until
            .filter(|until| now < *until)
            .map(|until| until - now)
    }

    fn is_stale(&self, now: Instant, window: Duration) -> bool {
        now.duration_since(self.window_start) >= window && self.lockout_remaining(now).is_none()
    }
}

/// Rate limiter shared by every route under `/api`
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    entries: DashMap<String, ClientEntry>,
    last_sweep: Mutex<Instant>,
}

impl RateLimiter {
    /// Create a limiter
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            entries: DashMap::new(),
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    /// Number of clients currently tracked
    pub fn tracked_clients(&self) -> usize {
        self.entries.len()
    }

    /// Drop every stale client entry as of `now`
    pub fn cleanup_at(&self, now: Instant) {
        let window = self.config.window();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_stale(now, window));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(removed, "Rate limiter swept stale clients");
        }
    }

    /// Sweep if a full window has passed since the last sweep
    fn maybe_sweep(&self, now: Instant) {
        let due = {
            let Ok(mut last) = self.last_sweep.lock() else {
                warn!("Rate limiter sweep lock poisoned, skipping cleanup");
                return;
            };
            if now.saturating_duration_since(*last) < self.config.window() {
                false
            } else {
                *last = now;
                true
            }
        };
        if due {
            self.cleanup_at(now);
        }
    }

    /// Whether limiting is applied at all
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Count one request; `Err` carries the time until the window resets
    pub fn check_request(&self, client: &str) -> Result<(), Duration> {
        self.check_request_at(client, Instant::now())
    }

    /// [`Self::check_request`] as of `now`
    pub fn check_request_at(&self, client: &str, now: Instant) -> Result<(), Duration> {
        if !self.config.enabled {
            return Ok(());
        }
        // Before taking an entry guard: retain locks every shard
        self.maybe_sweep(now);
        let window = self.config.window();
        let mut entry = self
            .entries
            .entry(client.to_string())
            .or_insert_with(|| ClientEntry::new(now));

        if now.duration_since(entry.window_start) >= window {
            entry.request_count = 0;
            entry.window_start = now;
        }

        if entry.request_count >= self.config.max_requests {
            return Err(window.saturating_sub(now.duration_since(entry.window_start)));
        }
        entry.request_count += 1;
        Ok(())
    }

    /// Time left on a login lockout, if one is active
    pub fn login_lockout(&self, client: &str) -> Option<Duration> {
        self.login_lockout_at(client, Instant::now())
    }

    /// [`Self::login_lockout`] as of `now`
    pub fn login_lockout_at(&self, client: &str, now: Instant) -> Option<Duration> {
        if !self.config.enabled {
            return None;
        }
        self.entries
            .get(client)
            .and_then(|entry| entry.lockout_remaining(now))
    }

    /// Record a failed login; returns the lockout if this one triggered it
    pub fn record_failed_login(&self, client: &str) -> Option<Duration> {
        self.record_failed_login_at(client, Instant::now())
    }

    /// [`Self::record_failed_login`] as of `now`
    pub fn record_failed_login_at(&self, client: &str, now: Instant) -> Option<Duration> {
        if !self.config.enabled {
            return None;
        }
        self.maybe_sweep(now);
        let mut entry = self
            .entries
            .entry(client.to_string())
            .or_insert_with(|| ClientEntry::new(now));
        entry.failed_attempts += 1;

        if entry.failed_attempts < self.config.max_failed_attempts {
            return None;
        }
        let lockout = self.config.lockout();
        entry.lockout_until = Some(now + lockout);
        entry.failed_attempts = 0;
        warn!(client, lockout_secs = lockout.as_secs(), "Client locked out of login");
        Some(lockout)
    }

    /// Clear the failure count after a successful login
    pub fn record_successful_login(&self, client: &str) {
        if let Some(mut entry) = self.entries.get_mut(client) {
            entry.failed_attempts = 0;
            entry.lockout_until = None;
        }
    }
}
