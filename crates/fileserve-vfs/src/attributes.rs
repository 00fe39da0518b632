//! File attributes reported by a byte source

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Size and modification time of a file.
///
/// Two snapshots are compared with `==` to decide whether a cached copy of a
/// file is still fresh. No other semantics are attached; in particular clock
/// skew between snapshots is not corrected.
///
/// # Example
///
/// ```rust
/// use fileserve_vfs::FileAttributes;
///
/// let a = FileAttributes::new(3, 1_600_000_000_000);
/// let b = FileAttributes::new(3, 1_600_000_000_000);
/// assert_eq!(a, b);
/// assert_ne!(a, FileAttributes::new(4, 1_600_000_000_000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileAttributes {
	length: u64,
	last_modified_millis: i64,
}

impl FileAttributes {
	/// Creates attributes from a length in bytes and a modification time in
	/// milliseconds since the Unix epoch.
	pub fn new(length: u64, last_modified_millis: i64) -> Self {
		Self {
			length,
			last_modified_millis,
		}
	}

	/// Creates attributes from a length and a [`SystemTime`].
	///
	/// Times before the epoch are represented as negative milliseconds.
	pub fn from_system_time(length: u64, modified: SystemTime) -> Self {
		let millis = match modified.duration_since(UNIX_EPOCH) {
			Ok(d) => i64::try_from(d.as_millis()).unwrap_or(i64::MAX),
			Err(e) => -i64::try_from(e.duration().as_millis()).unwrap_or(i64::MAX),
		};
		Self::new(length, millis)
	}

	/// File size in bytes.
	pub fn length(&self) -> u64 {
		self.length
	}

	/// Modification time in milliseconds since the Unix epoch.
	pub fn last_modified_millis(&self) -> i64 {
		self.last_modified_millis
	}

	/// Modification time as a [`SystemTime`].
	pub fn last_modified(&self) -> SystemTime {
		if self.last_modified_millis >= 0 {
			UNIX_EPOCH + Duration::from_millis(self.last_modified_millis as u64)
		} else {
			UNIX_EPOCH - Duration::from_millis(self.last_modified_millis.unsigned_abs())
		}
	}
}
