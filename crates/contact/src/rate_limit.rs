use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use tokio::sync::Mutex;

/// Past this many tracked clients, expired windows are dropped on the next check.
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Too many requests. Please try again later.")]
pub struct RateLimited {
    pub retry_after: Duration,
}

impl RateLimited {
    /// Whole seconds, rounded up, never zero.
    pub fn retry_after_secs(&self) -> u64 {
        self.retry_after.as_millis().div_ceil(1000).max(1) as u64
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window request counter keyed by client address.
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    entries: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub async fn check(&self, key: &str) -> Result<(), RateLimited> {
        self.check_at(key, Instant::now()).await
    }

    pub async fn check_at(&self, key: &str, now: Instant) -> Result<(), RateLimited> {
        let mut entries = self.entries.lock().await;

        if entries.len() > PRUNE_THRESHOLD {
            entries.retain(|_, window| window.reset_at > now);
        }

        match entries.get_mut(key) {
            Some(window) if now < window.reset_at => {
                if window.count >= self.max_requests {
                    return Err(RateLimited {
                        retry_after: window.reset_at - now,
                    });
                }

                window.count += 1;
            }
            _ => {
                entries.insert(
                    key.to_owned(),
                    Window {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
            }
        }

        Ok(())
    }

    pub async fn tracked(&self) -> usize {
        self.entries.lock().await.len()
    }
}
