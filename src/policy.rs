use std::{fmt, sync::Arc, time::Duration};

use crate::ResponseEnvelope;

/// Default attempt budget of a logical call.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

type RetryPredicate = dyn Fn(&ResponseEnvelope) -> bool + Send + Sync;

/// What the send loop does after a 2xx response.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryDecision {
    /// The response is usable; hand it to the caller.
    Accept,
    /// Re-issue the same descriptor.
    Retry,
    /// The predicate still fires but the budget is spent; return as degraded.
    GiveUp,
}

/// Decides when a transport-successful response is re-issued.
///
/// Only 2xx responses are ever offered to the predicate; transport and HTTP
/// errors are never retried. The predicate must be pure.
#[derive(Clone)]
pub struct RetryPolicy {
    max_attempts: usize,
    predicate: Arc<RetryPredicate>,
    backoff: Duration,
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("predicate", &"<fn>")
            .field("backoff", &self.backoff)
            .finish()
    }
}

impl Default for RetryPolicy {
    /// Up to five attempts while the body's `results` field is `null`.
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, ResponseEnvelope::has_null_results)
    }
}

impl RetryPolicy {
    /// Creates a policy. The first attempt is always made, so `0` and `1`
    /// both mean "never re-issue".
    pub fn new<F>(max_attempts: usize, should_retry: F) -> Self
    where
        F: Fn(&ResponseEnvelope) -> bool + Send + Sync + 'static,
    {
        Self {
            max_attempts,
            predicate: Arc::new(should_retry),
            backoff: Duration::ZERO,
        }
    }

    /// Policy for mutating calls: never re-issues.
    pub fn never() -> Self {
        Self::new(1, |_| false)
    }

    /// Default predicate with a custom attempt budget.
    pub fn null_results(max_attempts: usize) -> Self {
        Self::new(max_attempts, ResponseEnvelope::has_null_results)
    }

    /// Base delay before a retry, doubled on each further attempt.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn should_retry(&self, envelope: &ResponseEnvelope) -> bool {
        (self.predicate)(envelope)
    }

    /// Classifies a 2xx response produced by `attempt` (1-based).
    pub fn decide(&self, envelope: &ResponseEnvelope, attempt: usize) -> RetryDecision {
        if !self.should_retry(envelope) {
            RetryDecision::Accept
        } else if attempt < self.max_attempts {
            RetryDecision::Retry
        } else {
            RetryDecision::GiveUp
        }
    }

    /// Delay before issuing attempt `attempt + 1`.
    pub fn delay_after(&self, attempt: usize) -> Duration {
        let exp = attempt.saturating_sub(1).min(16) as u32;
        self.backoff.saturating_mul(1u32 << exp)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::{ResponseEnvelope, RetryDecision, RetryPolicy};

    fn null_body() -> ResponseEnvelope {
        ResponseEnvelope::new(200, r#"{"results":null}"#)
    }

    #[test]
    fn default_retries_null_results_until_budget() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 5);
        for attempt in 1..5 {
            assert_eq!(policy.decide(&null_body(), attempt), RetryDecision::Retry);
        }
        assert_eq!(policy.decide(&null_body(), 5), RetryDecision::GiveUp);
    }

    #[test]
    fn default_accepts_populated_and_missing_results() {
        let policy = RetryPolicy::default();
        let populated = ResponseEnvelope::new(200, r#"{"results":[1,2,3]}"#);
        let missing = ResponseEnvelope::new(200, r#"{"id":7}"#);
        assert_eq!(policy.decide(&populated, 1), RetryDecision::Accept);
        assert_eq!(policy.decide(&missing, 1), RetryDecision::Accept);
    }

    #[test]
    fn zero_or_one_attempt_budget_never_retries() {
        assert_eq!(
            RetryPolicy::null_results(0).decide(&null_body(), 1),
            RetryDecision::GiveUp
        );
        assert_eq!(
            RetryPolicy::null_results(1).decide(&null_body(), 1),
            RetryDecision::GiveUp
        );
    }

    #[test]
    fn never_accepts_everything() {
        assert_eq!(
            RetryPolicy::never().decide(&null_body(), 1),
            RetryDecision::Accept
        );
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let policy = RetryPolicy::default().with_backoff(Duration::from_millis(10));
        assert_eq!(policy.delay_after(1), Duration::from_millis(10));
        assert_eq!(policy.delay_after(2), Duration::from_millis(20));
        assert_eq!(policy.delay_after(4), Duration::from_millis(80));
        assert_eq!(RetryPolicy::default().delay_after(3), Duration::ZERO);
    }
}
