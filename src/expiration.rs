use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{instrument, warn};

use crate::types::RelayRequest;

/// The request deadline is in the past, or too close to relay and confirm
/// the transaction safely
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error(
    "Request expired (or too close): expired in {remaining} seconds, while threshold is {threshold}"
)]
pub struct ExpiredError {
    /// Seconds left until the deadline. Negative once it has passed
    pub remaining: i128,
    /// Minimum acceptable seconds left
    pub threshold: u64,
}

/// Source of the current unix time
pub trait Clock: std::fmt::Debug + Send + Sync {
    /// Seconds since the unix epoch
    fn now(&self) -> u64;
}

/// The system wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }
}

/// Rejects requests whose validity deadline is too close
#[derive(Debug, Default, Clone)]
pub struct ExpirationValidator<C = SystemClock> {
    clock: C,
}

impl<C: Clock> ExpirationValidator<C> {
    /// Instantiate a validator reading time from `clock`
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// Ensure at least `minimum_acceptable_time` seconds remain before
    /// `valid_until_time`. A deadline exactly `minimum_acceptable_time`
    /// seconds away is accepted.
    #[instrument(skip(self))]
    pub async fn validate(
        &self,
        valid_until_time: u64,
        minimum_acceptable_time: u64,
    ) -> Result<(), ExpiredError> {
        let remaining = i128::from(valid_until_time) - i128::from(self.clock.now());

        if remaining < i128::from(minimum_acceptable_time) {
            warn!(%remaining, "Rejecting expired relay request");
            return Err(ExpiredError {
                remaining,
                threshold: minimum_acceptable_time,
            });
        }
        Ok(())
    }

    /// Validate the `validUntilTime` of a relay request
    pub async fn validate_request(
        &self,
        request: &RelayRequest,
        minimum_acceptable_time: u64,
    ) -> Result<(), ExpiredError> {
        self.validate(request.request.valid_until_time, minimum_acceptable_time)
            .await
    }
}

/// Validate a deadline against the system clock
pub async fn validate_expiration_time(
    valid_until_time: u64,
    minimum_acceptable_time: u64,
) -> Result<(), ExpiredError> {
    ExpirationValidator::new(SystemClock)
        .validate(valid_until_time, minimum_acceptable_time)
        .await
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug, Clone, Copy)]
    struct FixedClock(u64);

    impl Clock for FixedClock {
        fn now(&self) -> u64 {
            self.0
        }
    }

    const NOW: u64 = 1_700_000_000;
    const MINIMUM: u64 = 1000;

    fn validator() -> ExpirationValidator<FixedClock> {
        ExpirationValidator::new(FixedClock(NOW))
    }

    #[tokio::test]
    async fn it_rejects_expired_requests() {
        let err = validator().validate(NOW - 3, MINIMUM).await.unwrap_err();
        assert_eq!(err.remaining, -3);
        assert!(err.to_string().starts_with("Request expired (or too close)"));
    }

    #[tokio::test]
    async fn it_rejects_requests_about_to_expire() {
        assert!(validator().validate(NOW + MINIMUM - 1, MINIMUM).await.is_err());
    }

    // Accepting `now + minimum` is deliberate: the relay server's own unit
    // tests require a deadline exactly `minimum` seconds away to pass, and
    // that behavior wins over a strict reading of the rule.
    #[tokio::test]
    async fn boundary_is_accepted() {
        assert!(validator().validate(NOW + MINIMUM, MINIMUM).await.is_ok());
        assert!(validator().validate(NOW + MINIMUM + 1, MINIMUM).await.is_ok());
    }

    #[tokio::test]
    async fn it_reads_request_deadline() {
        let mut request = RelayRequest::default();
        request.request.valid_until_time = NOW + 2 * MINIMUM;
        assert!(validator().validate_request(&request, MINIMUM).await.is_ok());

        request.request.valid_until_time = 0;
        assert!(validator().validate_request(&request, MINIMUM).await.is_err());
    }

    #[tokio::test]
    async fn system_clock() {
        let now = SystemClock.now();
        assert!(validate_expiration_time(now + 3600, 60).await.is_ok());
        assert!(validate_expiration_time(now.saturating_sub(3), 60).await.is_err());
    }
}
