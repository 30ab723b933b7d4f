//! Form tokens handed out with the contact form.
//!
//! A token is a ULID: its first 48 bits are the issue time, the rest is random,
//! so it can be checked for freshness without any server-side storage.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use ulid::Ulid;

pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(60 * 60);

pub fn issue() -> String {
    Ulid::new().to_string()
}

pub fn verify(token: Option<&str>, max_age: Duration) -> bool {
    verify_at(token, max_age, SystemTime::now())
}

pub fn verify_at(token: Option<&str>, max_age: Duration, now: SystemTime) -> bool {
    let Some(Ok(ulid)) = token.map(Ulid::from_string) else {
        return false;
    };

    let Ok(now) = now.duration_since(UNIX_EPOCH) else {
        return false;
    };

    let now_ms = now.as_millis() as u64;
    let issued_ms = ulid.timestamp_ms();

    issued_ms <= now_ms && now_ms - issued_ms < max_age.as_millis() as u64
}
