//! Clock used for the `Date` header

use std::fmt;
use std::time::SystemTime;

/// Source of the current time.
pub trait Clock: Send + Sync + fmt::Debug {
	/// Returns the current time.
	fn now(&self) -> SystemTime;
}

/// The system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> SystemTime {
		SystemTime::now()
	}
}

/// A clock stopped at a fixed instant.
///
/// # Example
///
/// ```rust
/// use fileserve_http::{Clock, FixedClock};
/// use std::time::{Duration, UNIX_EPOCH};
///
/// let at = UNIX_EPOCH + Duration::from_secs(1_000_000);
/// assert_eq!(FixedClock::new(at).now(), at);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(SystemTime);

impl FixedClock {
	/// Creates a clock that always reports `at`.
	pub fn new(at: SystemTime) -> Self {
		Self(at)
	}
}

impl Clock for FixedClock {
	fn now(&self) -> SystemTime {
		self.0
	}
}
