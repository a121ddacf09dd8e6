//! Lockout guard for repeated failed logins.
//!
//! [`LoginAttempts`] is the persisted per-account state; [`LockoutPolicy`]
//! decides when that state turns into a temporary suspension.

use chrono::{DateTime, Duration, Utc};

/// Default number of consecutive failures before an account locks.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 15;
/// Default suspension length in minutes.
pub const DEFAULT_LOCKOUT_MINUTES: i64 = 15;

/// Persisted failed-login bookkeeping for one account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginAttempts {
    failed: u32,
    last_attempt_at: Option<DateTime<Utc>>,
    locked_until: Option<DateTime<Utc>>,
}

impl LoginAttempts {
    /// Rehydrate state read from storage.
    pub fn from_parts(
        failed: u32,
        last_attempt_at: Option<DateTime<Utc>>,
        locked_until: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            failed,
            last_attempt_at,
            locked_until,
        }
    }

    /// Consecutive failures since the last success or expired suspension.
    pub fn failed(&self) -> u32 {
        self.failed
    }

    /// When the account last tried to sign in, successful or not.
    pub fn last_attempt_at(&self) -> Option<DateTime<Utc>> {
        self.last_attempt_at
    }

    /// Stored suspension expiry; it may already lie in the past.
    pub fn locked_until(&self) -> Option<DateTime<Utc>> {
        self.locked_until
    }

    /// Clear the counter and any suspension after a successful login.
    pub fn reset(&mut self) {
        self.failed = 0;
        self.locked_until = None;
    }
}

/// Result of recording a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// The account may still try again this many times.
    Remaining(u32),
    /// The threshold was reached; logins are refused until the instant given.
    Locked { until: DateTime<Utc> },
}

/// Threshold and suspension window applied to every account.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use clinic::domain::{FailureOutcome, LockoutPolicy, LoginAttempts};
///
/// let policy = LockoutPolicy::new(2, chrono::Duration::minutes(15));
/// let mut attempts = LoginAttempts::default();
/// let now = Utc::now();
/// assert_eq!(policy.record_failure(&mut attempts, now), FailureOutcome::Remaining(1));
/// assert!(matches!(
///     policy.record_failure(&mut attempts, now),
///     FailureOutcome::Locked { .. }
/// ));
/// assert!(policy.locked_until(&attempts, now).is_some());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    max_attempts: u32,
    duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_ATTEMPTS,
            Duration::minutes(DEFAULT_LOCKOUT_MINUTES),
        )
    }
}

impl LockoutPolicy {
    /// Build a policy; a zero threshold is raised to one.
    pub fn new(max_attempts: u32, duration: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            duration,
        }
    }

    /// Failures that trigger a suspension.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Length of a suspension.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Expiry of an active suspension, if the account is locked at `now`.
    pub fn locked_until(&self, attempts: &LoginAttempts, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        attempts.locked_until.filter(|until| *until > now)
    }

    /// Count a failure, locking the account once the threshold is reached.
    ///
    /// An expired suspension starts a fresh window before counting; an active
    /// one keeps its expiry.
    pub fn record_failure(&self, attempts: &mut LoginAttempts, now: DateTime<Utc>) -> FailureOutcome {
        if attempts.locked_until.is_some_and(|until| until <= now) {
            attempts.reset();
        }

        attempts.failed = attempts.failed.saturating_add(1);
        attempts.last_attempt_at = Some(now);

        if attempts.failed >= self.max_attempts && self.locked_until(attempts, now).is_none() {
            attempts.locked_until = Some(now + self.duration);
        }
        self.assess(attempts, now)
    }

    /// Classify state that already includes the latest failure.
    pub fn assess(&self, attempts: &LoginAttempts, now: DateTime<Utc>) -> FailureOutcome {
        match self.locked_until(attempts, now) {
            Some(until) => FailureOutcome::Locked { until },
            None => FailureOutcome::Remaining(self.max_attempts.saturating_sub(attempts.failed)),
        }
    }
}
