//! In-memory rate limiters
//!
//! Two sliding-window limiters backed by timestamp lists:
//! - `LoginRateLimiter` throttles console logins per username (5 failures
//!   per 15 minutes) and per IP (10 requests per minute).
//! - `EmailRateLimiter` caps outbound mail per recipient address, so a
//!   misfiring bulk job cannot flood a single inbox.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Login rate limiter
pub struct LoginRateLimiter {
    /// Failed login attempts by username
    username_attempts: Arc<RwLock<HashMap<String, Vec<DateTime<Utc>>>>>,
    /// Request attempts by IP address
    ip_attempts: Arc<RwLock<HashMap<IpAddr, Vec<DateTime<Utc>>>>>,
}

impl LoginRateLimiter {
    /// Create a new rate limiter
    pub fn new() -> Self {
        Self {
            username_attempts: Arc::new(RwLock::new(HashMap::new())),
            ip_attempts: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Check if username is rate limited (5 failures per 15 minutes)
    pub async fn is_username_limited(&self, username: &str) -> bool {
        let mut attempts = self.username_attempts.write().await;
        let cutoff = Utc::now() - Duration::minutes(15);

        let username_attempts = attempts.entry(username.to_lowercase()).or_default();
        username_attempts.retain(|time| *time > cutoff);

        username_attempts.len() >= 5
    }

    /// Record a failed login attempt for username
    pub async fn record_failed_attempt(&self, username: &str) {
        let mut attempts = self.username_attempts.write().await;
        attempts
            .entry(username.to_lowercase())
            .or_default()
            .push(Utc::now());
    }

    /// Clear failed attempts for username (on successful login)
    pub async fn clear_username_attempts(&self, username: &str) {
        let mut attempts = self.username_attempts.write().await;
        attempts.remove(&username.to_lowercase());
    }

    /// Check if IP is rate limited (10 requests per minute)
    pub async fn is_ip_limited(&self, ip: IpAddr) -> bool {
        let mut attempts = self.ip_attempts.write().await;
        let cutoff = Utc::now() - Duration::minutes(1);

        let ip_attempts = attempts.entry(ip).or_default();
        ip_attempts.retain(|time| *time > cutoff);

        ip_attempts.len() >= 10
    }

    /// Record a request from IP
    pub async fn record_ip_request(&self, ip: IpAddr) {
        let mut attempts = self.ip_attempts.write().await;
        attempts.entry(ip).or_default().push(Utc::now());
    }

    /// Clean up old entries (called periodically)
    pub async fn cleanup(&self) {
        let now = Utc::now();
        let username_cutoff = now - Duration::minutes(15);
        let ip_cutoff = now - Duration::minutes(1);

        {
            let mut attempts = self.username_attempts.write().await;
            attempts.retain(|_, times| {
                times.retain(|time| *time > username_cutoff);
                !times.is_empty()
            });
        }

        {
            let mut attempts = self.ip_attempts.write().await;
            attempts.retain(|_, times| {
                times.retain(|time| *time > ip_cutoff);
                !times.is_empty()
            });
        }
    }
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-recipient outbound email limiter
pub struct EmailRateLimiter {
    sends: Arc<RwLock<HashMap<String, Vec<DateTime<Utc>>>>>,
    max_per_minute: usize,
}

impl EmailRateLimiter {
    /// Create a limiter allowing `max_per_minute` sends per recipient
    pub fn new(max_per_minute: usize) -> Self {
        Self {
            sends: Arc::new(RwLock::new(HashMap::new())),
            max_per_minute,
        }
    }

    /// Try to reserve a send slot for the recipient.
    ///
    /// Returns false when the recipient is over the limit; the caller
    /// should skip the send rather than queue it.
    pub async fn try_acquire(&self, recipient: &str) -> bool {
        let mut sends = self.sends.write().await;
        let cutoff = Utc::now() - Duration::minutes(1);

        let recipient_sends = sends.entry(recipient.to_lowercase()).or_default();
        recipient_sends.retain(|time| *time > cutoff);

        if recipient_sends.len() >= self.max_per_minute {
            return false;
        }

        recipient_sends.push(Utc::now());
        true
    }

    /// Drop recipients with no sends in the window
    pub async fn cleanup(&self) {
        let cutoff = Utc::now() - Duration::minutes(1);
        let mut sends = self.sends.write().await;
        sends.retain(|_, times| {
            times.retain(|time| *time > cutoff);
            !times.is_empty()
        });
    }
}
