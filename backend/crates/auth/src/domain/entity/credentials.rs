//! Credentials Entity
//!
//! Password hash and sign-in failure tracking, kept apart from the profile.

use chrono::{DateTime, Duration, Utc};
use kernel::id::UserId;
use platform::password::HashedPassword;

#[derive(Debug, Clone)]
pub struct Credentials {
    pub user_id: UserId,
    pub password_hash: HashedPassword,
    pub failed_attempts: u16,
    pub last_failed_at: Option<DateTime<Utc>>,
    pub locked_until: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Credentials {
    /// Failures before a temporary lockout
    pub const MAX_FAILED_ATTEMPTS: u16 = 5;
    pub const LOCKOUT_MINUTES: i64 = 15;

    pub fn new(user_id: UserId, password_hash: HashedPassword) -> Self {
        Self {
            user_id,
            password_hash,
            failed_attempts: 0,
            last_failed_at: None,
            locked_until: None,
            updated_at: Utc::now(),
        }
    }

    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }

    pub fn record_failure_at(&mut self, now: DateTime<Utc>) {
        // A lock that has run out starts a fresh count.
        if self.locked_until.is_some_and(|until| now >= until) {
            self.failed_attempts = 0;
            self.locked_until = None;
        }

        self.failed_attempts = self.failed_attempts.saturating_add(1);
        self.last_failed_at = Some(now);
        self.updated_at = now;

        if self.failed_attempts >= Self::MAX_FAILED_ATTEMPTS {
            self.locked_until = Some(now + Duration::minutes(Self::LOCKOUT_MINUTES));
        }
    }

    pub fn reset_failures(&mut self) {
        self.failed_attempts = 0;
        self.last_failed_at = None;
        self.locked_until = None;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::password::ClearTextPassword;

    fn credentials() -> Credentials {
        let hash = ClearTextPassword::for_verification("irrelevant".into())
            .hash(None)
            .unwrap();
        Credentials::new(UserId::new(), hash)
    }

    #[test]
    fn test_locks_after_five_failures() {
        let mut c = credentials();
        let now = Utc::now();
        for _ in 0..4 {
            c.record_failure_at(now);
        }
        assert!(!c.is_locked_at(now));

        c.record_failure_at(now);
        assert!(c.is_locked_at(now));
        assert!(c.is_locked_at(now + Duration::minutes(14)));
        assert!(!c.is_locked_at(now + Duration::minutes(15)));
    }

    #[test]
    fn test_expired_lock_restarts_count() {
        let mut c = credentials();
        let now = Utc::now();
        for _ in 0..5 {
            c.record_failure_at(now);
        }
        let later = now + Duration::minutes(16);
        c.record_failure_at(later);
        assert_eq!(c.failed_attempts, 1);
        assert!(!c.is_locked_at(later));
    }
}
