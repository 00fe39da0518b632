//! Textual cache configuration
//!
//! A cache spec is a comma-separated list of `key=value` options:
//!
//! | Option | Value |
//! |---|---|
//! | `maximumSize` | maximum number of entries |
//! | `maximumWeight` | maximum total content bytes |
//! | `expireAfterAccess` | duration, e.g. `10m` |
//! | `expireAfterWrite` | duration, e.g. `1h` |
//!
//! Durations are an integer followed by `s`, `m`, `h` or `d`. The literal
//! `off` disables caching, as does a maximum of `0`.

use crate::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default maximum number of cached files.
pub const DEFAULT_MAXIMUM_SIZE: u64 = 1024;

/// Bounds and expiry of the aggregation cache.
///
/// # Examples
///
/// ```
/// use fileserve_service::CacheSpec;
/// use std::time::Duration;
///
/// let spec: CacheSpec = "maximumSize=256,expireAfterAccess=10m".parse().unwrap();
/// assert_eq!(spec.maximum_size(), Some(256));
/// assert_eq!(spec.expire_after_access(), Some(Duration::from_secs(600)));
/// assert!(!spec.is_disabled());
///
/// assert!("off".parse::<CacheSpec>().unwrap().is_disabled());
/// assert!("maximumSize=ten".parse::<CacheSpec>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub struct CacheSpec {
	maximum_size: Option<u64>,
	maximum_weight: Option<u64>,
	expire_after_access: Option<Duration>,
	expire_after_write: Option<Duration>,
}

impl CacheSpec {
	/// A spec bounded to `maximum_size` entries.
	pub fn with_maximum_size(maximum_size: u64) -> Self {
		Self {
			maximum_size: Some(maximum_size),
			..Self::default()
		}
	}

	/// A spec that disables caching.
	pub fn disabled() -> Self {
		Self::with_maximum_size(0)
	}

	/// Maximum number of entries.
	pub fn maximum_size(&self) -> Option<u64> {
		self.maximum_size
	}

	/// Maximum total weight, in content bytes.
	pub fn maximum_weight(&self) -> Option<u64> {
		self.maximum_weight
	}

	/// Time after the last access at which an entry expires.
	pub fn expire_after_access(&self) -> Option<Duration> {
		self.expire_after_access
	}

	/// Time after insertion at which an entry expires.
	pub fn expire_after_write(&self) -> Option<Duration> {
		self.expire_after_write
	}

	/// Returns whether this spec admits no entries at all.
	pub fn is_disabled(&self) -> bool {
		self.maximum_size == Some(0) || self.maximum_weight == Some(0)
	}
}

impl FromStr for CacheSpec {
	type Err = ConfigError;

	fn from_str(spec: &str) -> Result<Self, Self::Err> {
		let spec = spec.trim();
		if spec == "off" {
			return Ok(Self::disabled());
		}

		let mut parsed = Self::default();
		for option in spec.split(',').map(str::trim).filter(|o| !o.is_empty()) {
			let (key, value) = option.split_once('=').ok_or_else(|| ConfigError::InvalidValue {
				key: option.to_string(),
				value: String::new(),
			})?;
			let (key, value) = (key.trim(), value.trim());
			match key {
				"maximumSize" => set(&mut parsed.maximum_size, key, parse_number(key, value)?)?,
				"maximumWeight" => set(&mut parsed.maximum_weight, key, parse_number(key, value)?)?,
				"expireAfterAccess" => set(
					&mut parsed.expire_after_access,
					key,
					parse_duration(key, value)?,
				)?,
				"expireAfterWrite" => set(
					&mut parsed.expire_after_write,
					key,
					parse_duration(key, value)?,
				)?,
				_ => {
					return Err(ConfigError::UnknownOption {
						key: key.to_string(),
					});
				}
			}
		}

		if parsed.maximum_size.is_some() && parsed.maximum_weight.is_some() {
			return Err(ConfigError::InvalidSpec {
				spec: spec.to_string(),
				reason: "maximumSize and maximumWeight cannot be combined",
			});
		}
		if parsed == Self::default() {
			return Err(ConfigError::InvalidSpec {
				spec: spec.to_string(),
				reason: "no options given",
			});
		}
		Ok(parsed)
	}
}

impl TryFrom<String> for CacheSpec {
	type Error = ConfigError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

impl fmt::Display for CacheSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_disabled() {
			return f.write_str("off");
		}
		let mut options = Vec::new();
		if let Some(size) = self.maximum_size {
			options.push(format!("maximumSize={size}"));
		}
		if let Some(weight) = self.maximum_weight {
			options.push(format!("maximumWeight={weight}"));
		}
		if let Some(ttl) = self.expire_after_access {
			options.push(format!("expireAfterAccess={}s", ttl.as_secs()));
		}
		if let Some(ttl) = self.expire_after_write {
			options.push(format!("expireAfterWrite={}s", ttl.as_secs()));
		}
		f.write_str(&options.join(","))
	}
}

fn set<T>(slot: &mut Option<T>, key: &str, value: T) -> Result<(), ConfigError> {
	if slot.is_some() {
		return Err(ConfigError::DuplicateOption {
			key: key.to_string(),
		});
	}
	*slot = Some(value);
	Ok(())
}

fn parse_number(key: &str, value: &str) -> Result<u64, ConfigError> {
	value.parse().map_err(|_| ConfigError::InvalidValue {
		key: key.to_string(),
		value: value.to_string(),
	})
}

fn parse_duration(key: &str, value: &str) -> Result<Duration, ConfigError> {
	let invalid = || ConfigError::InvalidValue {
		key: key.to_string(),
		value: value.to_string(),
	};
	let split = value.len().checked_sub(1).ok_or_else(invalid)?;
	if !value.is_char_boundary(split) {
		return Err(invalid());
	}
	let (amount, unit) = value.split_at(split);
	let amount: u64 = amount.parse().map_err(|_| invalid())?;
	let seconds = match unit {
		"s" => Some(amount),
		"m" => amount.checked_mul(60),
		"h" => amount.checked_mul(60 * 60),
		"d" => amount.checked_mul(24 * 60 * 60),
		_ => None,
	}
	.ok_or_else(invalid)?;
	Ok(Duration::from_secs(seconds))
}
