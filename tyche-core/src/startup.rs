//! Startup configuration policy
//!
//! One-shot operations performed before the control loop starts. The
//! motor driver configuration is the only operation with a retry budget;
//! per-tick operations never retry.

use core::future::Future;

/// Every attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RetryExhausted<E> {
    /// Attempts made
    pub attempts: u8,
    /// Error returned by the final attempt
    pub last_error: E,
}

/// Run `op` until it succeeds, at most `max_attempts` times
///
/// `op` receives the 1-based attempt number. Returns the number of
/// attempts used on success. A budget of zero still makes one attempt.
pub async fn apply_with_retry<F, Fut, E>(max_attempts: u8, mut op: F) -> Result<u8, RetryExhausted<E>>
where
    F: FnMut(u8) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    let budget = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(()) => return Ok(attempt),
            Err(last_error) if attempt >= budget => {
                return Err(RetryExhausted {
                    attempts: attempt,
                    last_error,
                })
            }
            Err(_) => attempt += 1,
        }
    }
}
