//! Bounded fixed-delay retries around fallible asynchronous steps.

use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Retry policy: a bounded number of attempts with a fixed delay between
/// them. No backoff; the delay is constant by design.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Total attempts, the initial one included.
	pub max_attempts: u32,
	/// Pause between consecutive attempts.
	pub delay: Duration,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			max_attempts: 3,
			delay: Duration::from_secs(3),
		}
	}
}

impl RetryPolicy {
	/// A policy that runs the operation once, with no retries.
	pub const fn once() -> Self {
		Self {
			max_attempts: 1,
			delay: Duration::ZERO,
		}
	}

	/// Run `operation` until it succeeds or the attempts are exhausted.
	///
	/// The operation is invoked at most [`max_attempts`](Self::max_attempts)
	/// times; the last failure is returned unchanged.
	///
	/// # Errors
	///
	/// Whatever error the final attempt produced.
	pub async fn run<T, E, F, Fut>(&self, mut operation: F) -> Result<T, E>
	where
		F: FnMut() -> Fut,
		Fut: Future<Output = Result<T, E>>,
		E: Debug,
	{
		let mut attempt = 1u32;
		loop {
			match operation().await {
				Ok(value) => return Ok(value),
				Err(err) if attempt < self.max_attempts => {
					warn!(
						attempt,
						max_attempts = self.max_attempts,
						error = ?err,
						"attempt failed, retrying after delay"
					);
					tokio::time::sleep(self.delay).await;
					attempt += 1;
				}
				Err(err) => return Err(err),
			}
		}
	}
}
