//! Configuration errors

/// Errors raised while configuring a file service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
	/// A cache spec names an option that does not exist.
	#[error("Unknown cache spec option '{key}'")]
	UnknownOption {
		/// The offending option
		key: String,
	},

	/// A cache spec sets the same option twice.
	#[error("Cache spec option '{key}' was already set")]
	DuplicateOption {
		/// The offending option
		key: String,
	},

	/// A cache spec option has a value that cannot be parsed.
	#[error("Invalid value '{value}' for cache spec option '{key}'")]
	InvalidValue {
		/// The option
		key: String,
		/// The rejected value
		value: String,
	},

	/// The cache spec as a whole is inconsistent.
	#[error("Invalid cache spec '{spec}': {reason}")]
	InvalidSpec {
		/// The rejected spec
		spec: String,
		/// What is wrong with it
		reason: &'static str,
	},
}
